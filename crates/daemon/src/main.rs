use anyhow::Result;
use clap::Parser;
use newsdesk_core::tracing::{config::InstrumentationConfig, init::init_tracing};
use newsdesk_daemon::{Server, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Newsdesk daemon - dashboard proxy and page server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", env = "NEWSDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the static pages directory
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        settings.server.bind_addr = bind;
    }
    if let Some(static_dir) = cli.static_dir {
        settings.static_dir = Some(static_dir);
    }

    // Initialize instrumentation
    let env_config = InstrumentationConfig::from_env();
    let instrumentation_config = InstrumentationConfig {
        service_name: "newsdesk-daemon".to_string(),
        log_level: settings.logging.level.clone(),
        json: settings.logging.json || env_config.json,
        ..env_config
    };
    init_tracing(&instrumentation_config)?;

    if let Some(config_path) = &cli.config {
        info!("Loaded configuration from: {}", config_path.display());
    }

    let server = Server::new(settings)?;
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
