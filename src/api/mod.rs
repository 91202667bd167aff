mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;

use crate::auth::TokenVerifier;
use crate::db::Database;
use crate::generate::CompletionClient;

/// Shared state for the API handlers.
///
/// The verifier and completion client are trait objects so tests (and future
/// deployments) can swap implementations without touching the handlers. No
/// completion client means every skill tree takes the heuristic path.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub verifier: Arc<dyn TokenVerifier>,
    pub completion: Option<Arc<dyn CompletionClient>>,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/growth-maps", post(handlers::create_growth_map))
        .route("/goal-detail", get(handlers::get_goal_detail))
        .route("/goals", get(handlers::list_goals))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
