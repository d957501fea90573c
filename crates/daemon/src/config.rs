//! Configuration management for the newsdesk daemon

use crate::Result;
use newsdesk_http::{ForwardingConfig, RouterOptions};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment prefix, e.g. `NEWSDESK__BACKEND__BASE_URL`
pub const ENV_PREFIX: &str = "NEWSDESK";

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Backend the `/api` routes forward to
    pub backend: BackendConfig,

    /// Built dashboard pages, served for unmatched paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Index file inside `static_dir`
    #[serde(default)]
    pub static_index: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind HTTP server
    pub bind_addr: SocketAddr,

    /// Enable CORS for browser clients on other origins
    pub cors_enabled: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the news backend
    pub base_url: String,

    /// Value sent as `x-api-key` on every forwarded request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            static_dir: None,
            static_index: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_enabled: false,
            timeout_secs: 30,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "newsdesk=info,tower_http=info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// Environment variables take precedence over the file, e.g.
    /// `NEWSDESK__SERVER__BIND_ADDR=0.0.0.0:3000`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value does not parse
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr.to_string())?
            .set_default("server.cors_enabled", defaults.server.cors_enabled)?
            .set_default("server.timeout_secs", defaults.server.timeout_secs)?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Forwarding configuration for the proxy routes
    pub fn forwarding(&self) -> ForwardingConfig {
        let mut forwarding = ForwardingConfig::new(&self.backend.base_url);
        forwarding.timeout_seconds = self.backend.timeout_secs;
        match &self.backend.api_key {
            Some(key) => forwarding.with_api_key(key),
            None => forwarding,
        }
    }

    /// Router options for static page serving
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            static_dir: self.static_dir.clone(),
            static_index: self.static_index.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.server.timeout_secs, 30);
        assert_eq!(settings.backend.timeout_secs, 30);
        assert!(settings.static_dir.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
static_dir = "/srv/newsdesk"

[server]
bind_addr = "0.0.0.0:4000"
cors_enabled = true

[backend]
base_url = "https://news.example.com"
api_key = "dash-key"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.bind_addr.port(), 4000);
        assert!(settings.server.cors_enabled);
        // unset keys keep their defaults
        assert_eq!(settings.server.timeout_secs, 30);
        assert_eq!(settings.static_dir, Some(PathBuf::from("/srv/newsdesk")));

        let forwarding = settings.forwarding();
        assert_eq!(forwarding.base_url, "https://news.example.com");
        assert_eq!(forwarding.api_key.as_deref(), Some("dash-key"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/newsdesk.toml")));
        assert!(result.is_err());
    }
}
