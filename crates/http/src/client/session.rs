//! Session persistence for the dashboard client
//!
//! The local store is the source of truth. The cookie jar mirrors the token
//! pair so the edge middleware can see it; when the two disagree the local
//! store wins and the cookies are rewritten from it.
//!
//! The time of the last login or refresh is persisted next to the token pair
//! so the refresh cooldown survives a restart.

use super::storage::{CookieJar, MemoryStorage, StorageBackend, StorageError};
use chrono::{DateTime, Utc};
use newsdesk_core::{DashboardRole, Session, TokenPair, User};
use std::sync::Arc;
use tracing::{debug, warn};

pub use crate::types::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY};

pub const USER_KEY: &str = "user";
pub const USER_ROLE_KEY: &str = "userRole";
/// RFC 3339 time of the last login or refresh
pub const LAST_REFRESH_KEY: &str = "lastRefresh";

/// Every local key that belongs to a session
pub const SESSION_KEYS: [&str; 5] = [
    AUTH_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USER_KEY,
    USER_ROLE_KEY,
    LAST_REFRESH_KEY,
];

/// Cookies mirrored from the local store
pub const SESSION_COOKIES: [&str; 2] = [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY];

/// Injectable session store shared by one client
#[derive(Clone)]
pub struct SessionStore {
    local: Arc<dyn StorageBackend>,
    cookies: CookieJar,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.access_token().is_some())
            .field("cookies", &self.cookies)
            .finish()
    }
}

impl SessionStore {
    pub fn new(local: Arc<dyn StorageBackend>, cookies: CookieJar) -> Self {
        Self { local, cookies }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), CookieJar::in_memory())
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn access_token(&self) -> Option<String> {
        self.local.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.local.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.local.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user is unreadable");
                None
            }
        }
    }

    pub fn role(&self) -> Option<DashboardRole> {
        self.local.get(USER_ROLE_KEY)?.parse().ok()
    }

    /// When the token pair was last issued
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        let raw = self.local.get(LAST_REFRESH_KEY)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!(error = %e, "Stored refresh time is unreadable");
                None
            }
        }
    }

    /// Whether the token pair was issued less than `cooldown` ago
    pub fn refreshed_within(&self, cooldown: std::time::Duration) -> bool {
        let Some(at) = self.last_refresh() else {
            return false;
        };
        let cooldown = chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::MAX);
        Utc::now() - at < cooldown
    }

    /// Assemble the full session, if one is stored
    pub fn snapshot(&self) -> Option<Session> {
        Some(Session {
            tokens: TokenPair {
                access_token: self.access_token()?,
                refresh_token: self.refresh_token()?,
            },
            user: self.user()?,
            role: self.role()?,
            last_refresh: self.last_refresh(),
        })
    }

    /// Persist a fresh login
    pub fn store_login(
        &self,
        tokens: &TokenPair,
        user: &User,
        role: DashboardRole,
    ) -> Result<(), StorageError> {
        self.local.set(USER_KEY, &serde_json::to_string(user)?)?;
        self.local.set(USER_ROLE_KEY, role.as_str())?;
        self.store_tokens(tokens)
    }

    /// Replace the token pair in both stores and stamp the refresh time
    pub fn store_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.local.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        self.local.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
        self.local.set(LAST_REFRESH_KEY, &Utc::now().to_rfc3339())?;
        self.cookies.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        self.cookies.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
        Ok(())
    }

    /// Rewrite the cookies from the local store.
    ///
    /// Cookies without a local counterpart are dropped: a session is never
    /// rebuilt from cookies alone since they carry no user.
    pub fn sync_cookies(&self) -> Result<(), StorageError> {
        match (self.access_token(), self.refresh_token()) {
            (Some(access_token), Some(refresh_token)) => {
                let tokens = TokenPair {
                    access_token,
                    refresh_token,
                };
                if self.cookies.get_at(AUTH_TOKEN_KEY, "/").as_deref()
                    != Some(tokens.access_token.as_str())
                {
                    debug!("Cookies out of date, rewriting from local store");
                }
                self.cookies.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
                self.cookies.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
            }
            _ => {
                for name in SESSION_COOKIES {
                    self.cookies.remove(name)?;
                }
            }
        }
        Ok(())
    }

    /// Remove every trace of the session. Never fails; storage errors are logged.
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.local.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
            }
        }
        for name in SESSION_COOKIES {
            if let Err(e) = self.cookies.remove(name) {
                warn!(cookie = name, error = %e, "Failed to remove session cookie");
            }
        }
    }
}
