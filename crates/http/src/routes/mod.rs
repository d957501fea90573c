//! API route definitions
//!
//! Every `/api` route mirrors one backend endpoint and forwards the caller's
//! method, query string, `Authorization` header and JSON body unchanged.

use crate::error::HttpError;
use crate::forwarding::{ProxyRequest, ProxyResponse};
use crate::paths::join_segments;
use crate::state::AppState;
use crate::types::{CreateApiKeyRequest, EnvelopeDoc, LoginRequest, RefreshRequest};
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

pub mod api_keys;
pub mod auth;
pub mod health;
pub mod news;
pub mod notify;
pub mod reports;
pub mod users;

/// Prefix the proxy routes are mounted under
pub const API_PREFIX: &str = "/api";

#[derive(OpenApi)]
#[openapi(
    info(title = "Newsdesk dashboard API"),
    components(
        schemas(EnvelopeDoc, LoginRequest, RefreshRequest, CreateApiKeyRequest)
    ),
    tags(
        (name = "auth", description = "Login and token refresh"),
        (name = "users", description = "User listing"),
        (name = "news", description = "News moderation"),
        (name = "reports", description = "User reports"),
        (name = "notify", description = "Push notifications"),
        (name = "api_keys", description = "API key management endpoints"),
        (name = "health", description = "Service health"),
    ),
)]
struct ApiDoc;

/// All routes with their OpenAPI description
pub fn router() -> OpenApiRouter<AppState> {
    let mut api = OpenApiRouter::new();
    api = auth::add_routes(api);
    api = users::add_routes(api);
    api = news::add_routes(api);
    api = reports::add_routes(api);
    api = notify::add_routes(api);
    api = api_keys::add_routes(api);

    let router = OpenApiRouter::with_openapi(ApiDoc::openapi()).nest(API_PREFIX, api);
    health::add_routes(router)
}

/// Forward a call to the backend resource named by `segments`
pub(crate) async fn forward(
    state: &AppState,
    method: Method,
    segments: &[&str],
    query: Option<String>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    let path = join_segments(segments)
        .ok_or_else(|| HttpError::BadRequest("Invalid resource id".to_string()))?;

    let request = ProxyRequest::new(method, path)
        .from_caller(query, headers)
        .with_body(body);
    Ok(state.proxy.forward(request).await)
}
