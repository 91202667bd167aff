//! Environment configuration for the server binary.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration, loaded once at startup.
///
/// The identity service endpoint and service credential are required —
/// neither handler can run without the auth gate. The completion key is
/// optional; without it every skill tree takes the heuristic path.
#[derive(Clone, Debug)]
pub struct Config {
    /// Database file path (from GROWTH_MAP_DB). Platform data dir when unset.
    pub db_path: Option<PathBuf>,
    /// Identity service base URL (from GROWTH_MAP_IDENTITY_URL).
    pub identity_url: String,
    /// Service credential sent with identity exchanges (from GROWTH_MAP_SERVICE_KEY).
    pub service_key: String,
    /// Completion-service key (from OPENAI_API_KEY), optional.
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let identity_url = std::env::var("GROWTH_MAP_IDENTITY_URL")
            .context("GROWTH_MAP_IDENTITY_URL must be set")?;
        let service_key = std::env::var("GROWTH_MAP_SERVICE_KEY")
            .context("GROWTH_MAP_SERVICE_KEY must be set")?;
        let db_path = std::env::var("GROWTH_MAP_DB").ok().map(PathBuf::from);
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            db_path,
            identity_url,
            service_key,
            openai_api_key,
        })
    }
}
