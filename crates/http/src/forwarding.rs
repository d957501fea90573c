//! Forwarding of dashboard API calls to the external backend

use crate::error::HttpError;
use crate::types::API_KEY_HEADER;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use newsdesk_core::Envelope;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Instrument;

/// Where and how to reach the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingConfig {
    /// Base URL of the backend API
    pub base_url: String,
    /// Static key sent as `x-api-key` on every forwarded call
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl ForwardingConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Header authenticating the dashboard itself to the backend
    pub fn auth_header(&self) -> Option<(&'static str, &str)> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| (API_KEY_HEADER, key))
    }
}

/// A caller's request, reduced to what gets forwarded
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Backend path, already percent-encoded
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub authorization: Option<HeaderValue>,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            authorization: None,
            body: Bytes::new(),
        }
    }

    /// Carry over the caller's query string and `Authorization` header
    pub fn from_caller(mut self, query: Option<String>, headers: &HeaderMap) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self.authorization = headers.get(header::AUTHORIZATION).cloned();
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Envelope answered to the dashboard, sent with the upstream status
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse(pub Envelope);

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

/// reqwest client bound to one backend
#[derive(Debug, Clone)]
pub struct BackendProxy {
    client: reqwest::Client,
    config: ForwardingConfig,
    base_url: String,
}

impl BackendProxy {
    pub fn new(config: ForwardingConfig) -> Result<Self, HttpError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| HttpError::Configuration(format!("invalid backend url: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("newsdesk-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                HttpError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ForwardingConfig {
        &self.config
    }

    fn url(&self, request: &ProxyRequest) -> String {
        match &request.query {
            Some(query) => format!("{}{}?{}", self.base_url, request.path, query),
            None => format!("{}{}", self.base_url, request.path),
        }
    }

    /// Forward one call. Upstream answers of any status come back as they
    /// are; a backend that cannot be reached becomes a synthetic 500.
    pub async fn forward(&self, request: ProxyRequest) -> ProxyResponse {
        let url = self.url(&request);
        let span = tracing::info_span!(
            "upstream_request",
            http.method = %request.method,
            http.path = %request.path,
            http.status_code = tracing::field::Empty,
        );

        async move {
            let mut req = self.client.request(request.method.clone(), &url);

            if let Some((name, value)) = self.config.auth_header() {
                req = req.header(name, value);
            }
            if let Some(authorization) = request.authorization {
                req = req.header(header::AUTHORIZATION, authorization);
            }
            if !request.body.is_empty() {
                req = req
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(request.body);
            }

            let response = match req.send().await {
                Ok(response) => response,
                Err(e) => {
                    let error = HttpError::Upstream(e.to_string());
                    warn!(%error, "Backend unreachable");
                    return ProxyResponse(Envelope::network_failure(error.to_string()));
                }
            };

            let status = response.status().as_u16();
            tracing::Span::current().record("http.status_code", status);

            match response.bytes().await {
                Ok(body) => ProxyResponse(Envelope::from_upstream(status, &body)),
                Err(e) => {
                    warn!(status, error = %e, "Failed to read backend response");
                    ProxyResponse(Envelope::network_failure(format!(
                        "Failed to read response: {e}"
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }
}
