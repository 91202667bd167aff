use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use growth_map::api::{self, AppState};
use growth_map::auth::{IdentityClient, TokenVerifier};
use growth_map::config::Config;
use growth_map::db::Database;
use growth_map::generate::{ChatCompletionClient, CompletionClient};

#[derive(Parser)]
#[command(name = "growth-map")]
#[command(about = "Growth map server: goals into skill trees and sprint plans")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the growth map server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "growth_map=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let port = match cli.command {
        Some(Commands::Serve { port }) => port,
        None => 3000,
    };

    serve(port).await
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let db = match &config.db_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let verifier: Arc<dyn TokenVerifier> = Arc::new(IdentityClient::new(
        config.identity_url.clone(),
        config.service_key.clone(),
    ));

    let completion: Option<Arc<dyn CompletionClient>> = config
        .openai_api_key
        .as_ref()
        .map(|key| Arc::new(ChatCompletionClient::new(key.clone())) as Arc<dyn CompletionClient>);
    if completion.is_none() {
        tracing::info!("OPENAI_API_KEY not set, skill trees will use the heuristic generator");
    }

    let app = api::create_router(AppState {
        db,
        verifier,
        completion,
    });

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    tracing::info!("growth-map server listening on http://127.0.0.1:{port}");

    axum::serve(listener, app).await?;

    Ok(())
}
