//! Configuration for tracing and instrumentation

use serde::{Deserialize, Serialize};

/// Main instrumentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Service name attached to the root span
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "newsdesk_http=debug")
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            service_name: "newsdesk".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl InstrumentationConfig {
    /// Create configuration from environment variables
    ///
    /// Supports the following environment variables:
    /// - `SERVICE_NAME`: Service name
    /// - `RUST_LOG`: Log level filter
    /// - `NEWSDESK_LOG_JSON`: `1` or `true` switches to JSON output
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service_name: std::env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            json: std::env::var("NEWSDESK_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Configuration for a named service at the given level
    pub fn for_service(service_name: impl Into<String>, log_level: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_level: log_level.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_service_keeps_version() {
        let config = InstrumentationConfig::for_service("newsdesk-daemon", "debug");
        assert_eq!(config.service_name, "newsdesk-daemon");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
        assert!(!config.json);
    }
}
