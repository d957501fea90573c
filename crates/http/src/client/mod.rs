//! Dashboard API client
//!
//! [`DashboardClient`] attaches the bearer token and the static API key to
//! every call, and on a 401/403 refreshes the session once and replays the
//! request. Concurrent rejected requests share a single refresh; see
//! [`refresh`] for the coordination rules.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod refresh;
pub mod session;
pub mod storage;

pub use error::ClientError;
pub use refresh::{RefreshError, RefreshOutcome, RefreshTrigger};
pub use session::SessionStore;
pub use storage::{CookieJar, FileStorage, MemoryStorage, StorageBackend, StorageError};

pub use crate::types::{API_KEY_HEADER, LOGIN_PATH};

use newsdesk_core::{ApiResponse, Envelope};
use refresh::RefreshState;
use reqwest::{Client, ClientBuilder, Method, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Minimum gap between two speculative refreshes
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

/// A token this close to its `exp` is refreshed by [`DashboardClient::ensure_fresh_token`]
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserInitiated,
    RefreshFailed,
    MissingRefreshToken,
}

/// Raised whenever the session is cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutEvent {
    pub reason: LogoutReason,
    /// Entry point the user should be sent to
    pub redirect_to: &'static str,
}

/// Callback invoked on logout, typically to navigate to [`LOGIN_PATH`]
pub type LogoutHandler = Arc<dyn Fn(&LogoutEvent) + Send + Sync>;

/// Parameters of one API call, kept so the call can be replayed after a refresh
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post(body: JsonValue) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    /// Serialize `body` as the JSON payload
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self, ClientError> {
        Ok(Self::new(method).with_body(serde_json::to_value(body)?))
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}

/// Dashboard API client
#[derive(Clone)]
pub struct DashboardClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    session: SessionStore,
    refresh: RefreshState,
    refresh_cooldown: Duration,
    expiry_margin: Duration,
    on_logout: Option<LogoutHandler>,
}

impl DashboardClient {
    /// Create a new client with default configuration and in-memory storage
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> DashboardClientBuilder {
        DashboardClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The session store this client reads and writes
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Send an authenticated request, refreshing and replaying once on 401/403.
    ///
    /// Never errors: transport and decoding problems come back as a synthetic
    /// 500 failure.
    #[instrument(
        name = "dashboard.request",
        skip(self, options),
        fields(method = %options.method, endpoint = %endpoint)
    )]
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResponse<T> {
        let token = self.inner.session.access_token();
        let first = self.inner.send(endpoint, &options, token.as_deref()).await;

        if !is_auth_rejection(&first) || is_auth_endpoint(endpoint) {
            return ApiResponse::from_envelope(first);
        }

        debug!(status = first.status, "Request rejected, refreshing session");
        match self.inner.refresh_after_rejection(token).await {
            Ok((new_token, ticket)) => {
                // one replay only; a second rejection is returned as is
                let retried = self.inner.send(endpoint, &options, Some(&new_token)).await;
                drop(ticket);
                ApiResponse::from_envelope(retried)
            }
            Err(e) => {
                debug!(error = %e, "Dropping request after failed refresh");
                ApiResponse::failure(401, "Session expired. Please log in again.")
            }
        }
    }

    /// Serialize `body` and send it, turning a serialization error into a failure
    pub(crate) async fn request_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match RequestOptions::json(method, body) {
            Ok(options) => self.request(endpoint, options).await,
            Err(e) => ApiResponse::failure(400, e.to_string()),
        }
    }
}

impl ClientInner {
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// One round trip, normalised to an envelope
    pub(crate) async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Envelope {
        let url = self.url(endpoint);
        let mut request = self.http.request(options.method.clone(), &url);

        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(cookie) = Url::parse(&url)
            .ok()
            .and_then(|u| self.session.cookies().header_for(u.path()))
        {
            request = request.header(header::COOKIE, cookie);
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed before a response arrived");
                return Envelope::network_failure(format!("Network error: {e}"));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => Envelope::from_upstream(status, &body),
            Err(e) => {
                warn!(status, error = %e, "Failed to read response body");
                Envelope::network_failure(format!("Failed to read response: {e}"))
            }
        }
    }

    pub(crate) fn notify_logout(&self, reason: LogoutReason) {
        let event = LogoutEvent {
            reason,
            redirect_to: LOGIN_PATH,
        };
        if let Some(handler) = &self.on_logout {
            handler(&event);
        }
    }
}

fn is_auth_rejection(envelope: &Envelope) -> bool {
    !envelope.success && matches!(envelope.status, 401 | 403)
}

/// Login and refresh answer 401 for bad credentials; refreshing there would loop
fn is_auth_endpoint(endpoint: &str) -> bool {
    endpoint.trim_start_matches('/').starts_with("auth/")
}

/// Builder for DashboardClient
#[derive(Default)]
pub struct DashboardClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<SessionStore>,
    refresh_cooldown: Option<Duration>,
    expiry_margin: Option<Duration>,
    on_logout: Option<LogoutHandler>,
}

impl DashboardClientBuilder {
    /// Set the base URL (e.g. `https://dashboard.example.com/api`)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the static API key sent as `x-api-key`
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use an existing session store instead of a fresh in-memory one
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Minimum gap between speculative refreshes
    pub fn refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = Some(cooldown);
        self
    }

    /// How close to expiry a token must be before a speculative refresh
    pub fn expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = Some(margin);
        self
    }

    /// Called whenever the session is cleared
    pub fn on_logout(mut self, handler: impl Fn(&LogoutEvent) + Send + Sync + 'static) -> Self {
        self.on_logout = Some(Arc::new(handler));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<DashboardClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("newsdesk-client/", env!("CARGO_PKG_VERSION")).into()),
        );

        let session = self.session.unwrap_or_else(SessionStore::in_memory);
        session.sync_cookies()?;

        Ok(DashboardClient {
            inner: Arc::new(ClientInner {
                http: client_builder.build()?,
                base_url,
                api_key: self.api_key,
                session,
                refresh: RefreshState::default(),
                refresh_cooldown: self.refresh_cooldown.unwrap_or(DEFAULT_REFRESH_COOLDOWN),
                expiry_margin: self.expiry_margin.unwrap_or(DEFAULT_EXPIRY_MARGIN),
                on_logout: self.on_logout,
            }),
        })
    }
}
