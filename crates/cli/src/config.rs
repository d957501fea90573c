//! CLI configuration utilities

use anyhow::{Context, Result};
use directories::ProjectDirs;
use newsdesk_http::client::{CookieJar, FileStorage, SessionStore};
use newsdesk_http::DashboardClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SESSION_FILE: &str = "session.json";
const COOKIE_FILE: &str = "cookies.json";

/// Where the CLI keeps its session between invocations
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("NEWSDESK_STATE_DIR").map(PathBuf::from))
        .or_else(|| ProjectDirs::from("", "", "newsdesk").map(|dirs| dirs.data_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from(".newsdesk"))
}

/// Session persisted under `dir`, local store and cookie jar in separate files
pub fn open_session(dir: &Path) -> Result<SessionStore> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

    let local = FileStorage::open(dir.join(SESSION_FILE))
        .with_context(|| format!("Failed to open session in {}", dir.display()))?;
    let cookies = FileStorage::open(dir.join(COOKIE_FILE))
        .with_context(|| format!("Failed to open cookies in {}", dir.display()))?;

    Ok(SessionStore::new(
        Arc::new(local),
        CookieJar::new(Arc::new(cookies)),
    ))
}

/// Connection settings for the dashboard API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn build(&self, session: SessionStore) -> Result<DashboardClient> {
        let mut builder = DashboardClient::builder()
            .base_url(&self.base_url)
            .timeout(self.timeout)
            .user_agent(concat!("newsdesk-cli/", env!("CARGO_PKG_VERSION")))
            .session(session)
            .on_logout(|event| {
                tracing::warn!(reason = ?event.reason, "Session ended, run `newsdesk login` again");
            });

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }

        Ok(builder.build()?)
    }
}
