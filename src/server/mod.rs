//! HTTP server module
//!
//! REST API over the registry, the training orchestrator and the two
//! read-only engines. Transport-level concerns only; authorization policy
//! lives behind the [`auth::Authorizer`] seam.

mod api;
mod error;
mod handlers;
mod state;

pub mod auth;

pub use api::create_router;
pub use error::ApiError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

/// Server configuration, environment-driven with code defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: String,
    /// Bound on concurrently running background fits
    pub train_workers: usize,
    /// Static API key; `None` means every caller is authorized
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "./models".to_string()),
            train_workers: std::env::var("TRAIN_WORKERS")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(2),
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

/// Start the server and block until shutdown
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, models_dir = %config.models_dir, "starting foresight server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
