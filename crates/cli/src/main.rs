//! Newsdesk CLI - dashboard operations from the terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use config::ClientConfig;
use logging::LogLevel;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "Moderate the newsdesk backend from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory holding the stored session
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Dashboard API base URL (the newsdesk daemon)
    #[arg(
        short = 'u',
        long,
        global = true,
        env = "NEWSDESK_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    url: String,

    /// Key sent as `x-api-key`
    #[arg(long, global = true, env = "NEWSDESK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Timeout for operations in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level)?;

    let data_dir = config::data_dir(cli.data_dir);
    debug!(data_dir = %data_dir.display(), "Using data directory");
    let session = config::open_session(&data_dir)?;

    let client_config = ClientConfig {
        base_url: cli.url,
        api_key: cli.api_key,
        timeout: Duration::from_secs(if cli.timeout == 0 { 300 } else { cli.timeout }),
    };
    let client = client_config.build(session)?;

    // Execute command with optional timeout
    let result = if cli.timeout == 0 {
        cli.command.execute(&client).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&client)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
