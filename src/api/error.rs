use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::AuthError;

/// Errors surfaced by the HTTP handlers.
///
/// Every variant maps to exactly one status code and a structured JSON body
/// at the handler boundary; nothing reaches the caller unmapped. Store
/// failures keep their step tag so a 500 names the entity that failed, while
/// the underlying error detail stays in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Failed to {step}")]
    Persistence {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn persistence(step: &'static str, source: anyhow::Error) -> Self {
        Self::Persistence { step, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Persistence { step, source } => {
                tracing::error!("persistence failure at '{step}': {source:#}");
            }
            other => tracing::warn!("request rejected: {other}"),
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
