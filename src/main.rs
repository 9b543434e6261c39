//! Foresight - main entry point

use clap::Parser;
use foresight::cli::{cmd_serve, Cli, Commands};
use foresight::server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foresight=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            models_dir,
            workers,
            api_key,
        }) => {
            cmd_serve(host, port, models_dir, workers, api_key).await?;
        }
        None => {
            // Default: serve with environment-driven configuration
            run_server(ServerConfig::default()).await?;
        }
    }

    Ok(())
}
