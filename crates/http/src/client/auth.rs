//! Session lifecycle: login, logout and explicit refreshes

use super::{
    ClientError, DashboardClient, LogoutReason, RefreshOutcome, RefreshTrigger, RequestOptions,
};
use crate::types::{LoginData, LoginRequest};
use chrono::Utc;
use newsdesk_core::{ApiResponse, DashboardRole, Session, TokenPair, jwt};
use tracing::{debug, info, instrument, warn};

pub(crate) const LOGIN_ENDPOINT: &str = "/auth/login";

/// Message returned when a valid account has no dashboard role
pub const ACCESS_DENIED_MESSAGE: &str =
    "Access denied. Only admins and employees can use the dashboard.";

impl DashboardClient {
    /// Log in and persist the session.
    ///
    /// Accounts without an `ADMIN` or `EMPLOYEE` role get a 403 failure and
    /// nothing is stored. A 401 here is a bad password, never a refresh.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<Session> {
        let options = match RequestOptions::json(
            reqwest::Method::POST,
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        ) {
            Ok(options) => options,
            Err(e) => return ApiResponse::failure(400, e.to_string()),
        };

        let envelope = self.inner.send(LOGIN_ENDPOINT, &options, None).await;
        let (status, message, data) = match ApiResponse::<LoginData>::from_envelope(envelope) {
            ApiResponse::Success {
                status,
                message,
                data,
            } => (status, message, data),
            ApiResponse::Failure { status, message } => {
                debug!(status, "Login refused by backend");
                return ApiResponse::Failure { status, message };
            }
        };

        let Some(role) = data.user.dashboard_role() else {
            warn!(roles = ?data.user.roles, "Login refused: no dashboard role");
            return ApiResponse::failure(403, ACCESS_DENIED_MESSAGE);
        };

        let tokens = TokenPair {
            access_token: data.jwt,
            refresh_token: data.refresh_token,
        };
        if let Err(e) = self.inner.session.store_login(&tokens, &data.user, role) {
            warn!(error = %e, "Failed to persist session");
            self.inner.session.clear();
            return ApiResponse::failure(500, format!("Failed to store session: {e}"));
        }
        info!(user = %data.user.display_name(), %role, "Logged in");

        ApiResponse::Success {
            status,
            message,
            data: Session {
                tokens,
                user: data.user,
                role,
                last_refresh: self.inner.session.last_refresh(),
            },
        }
    }

    /// Drop the session locally. The backend keeps no server-side session.
    pub fn logout(&self) {
        self.inner.session.clear();
        info!("Logged out");
        self.inner.notify_logout(LogoutReason::UserInitiated);
    }

    /// Refresh the token pair. Speculative refreshes inside the cooldown are skipped.
    pub async fn refresh_session(
        &self,
        trigger: RefreshTrigger,
    ) -> Result<RefreshOutcome, ClientError> {
        Ok(self.inner.refresh(trigger).await?)
    }

    /// Speculatively refresh when the access token expires within the margin.
    ///
    /// Tokens without a readable `exp` are left to the reactive 401 path.
    pub async fn ensure_fresh_token(&self) -> Result<RefreshOutcome, ClientError> {
        let Some(token) = self.inner.session.access_token() else {
            return self.refresh_session(RefreshTrigger::Speculative).await;
        };

        let expires_at = match jwt::expires_at(&token) {
            Ok(Some(expires_at)) => expires_at,
            Ok(None) => return Ok(RefreshOutcome::Skipped),
            Err(e) => {
                debug!(error = %e, "Access token is opaque, not checking expiry");
                return Ok(RefreshOutcome::Skipped);
            }
        };

        let margin = chrono::Duration::from_std(self.inner.expiry_margin)
            .unwrap_or_else(|_| chrono::Duration::zero());
        if expires_at - Utc::now() > margin {
            return Ok(RefreshOutcome::Skipped);
        }

        debug!(%expires_at, "Access token about to expire");
        self.refresh_session(RefreshTrigger::Speculative).await
    }

    /// The stored session, if complete
    pub fn current_session(&self) -> Option<Session> {
        self.inner.session.snapshot()
    }

    pub fn role(&self) -> Option<DashboardRole> {
        self.inner.session.role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.access_token().is_some()
    }
}
