use anyhow::Result;
use clap::ValueEnum;
use newsdesk_core::tracing::{config::InstrumentationConfig, init::init_tracing};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Initialize logging for the CLI. Output goes to stderr so stdout stays parseable.
pub fn init_logging(log_level: LogLevel) -> Result<()> {
    let log_level = format!(
        "newsdesk={level},newsdesk_http={level}",
        level = log_level.as_filter()
    );
    init_tracing(&InstrumentationConfig::for_service("newsdesk-cli", log_level))
}
