//! Command-line interface

use clap::{Parser, Subcommand};

use crate::server::{run_server, ServerConfig};

#[derive(Parser)]
#[command(name = "foresight", about = "Time-series forecasting service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,
        /// Bind port
        #[arg(long, env = "API_PORT", default_value_t = 8080)]
        port: u16,
        /// Directory holding the model registry
        #[arg(long, env = "MODELS_DIR", default_value = "./models")]
        models_dir: String,
        /// Background training worker count
        #[arg(long, env = "TRAIN_WORKERS", default_value_t = 2)]
        workers: usize,
        /// Static API key; omit to disable authorization
        #[arg(long, env = "API_KEY")]
        api_key: Option<String>,
    },
}

pub async fn cmd_serve(
    host: String,
    port: u16,
    models_dir: String,
    workers: usize,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    run_server(ServerConfig {
        host,
        port,
        models_dir,
        train_workers: workers,
        api_key,
    })
    .await
}
