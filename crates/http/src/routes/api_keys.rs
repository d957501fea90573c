//! API key management

use super::forward;
use crate::{error::HttpError, forwarding::ProxyResponse, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method},
};
use tracing::instrument;
use utoipa_axum::{router::OpenApiRouter, routes};

/// List API keys
#[utoipa::path(
    get,
    path = "/apiKeys",
    responses(
        (status = 200, description = "API keys", body = EnvelopeDoc),
        (status = 401, description = "Not authenticated", body = EnvelopeDoc)
    ),
    tag = "api_keys"
)]
#[instrument(name = "api_keys.list", skip_all)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["apiKeys"], None, &headers, Bytes::new()).await
}

/// Create an API key
#[utoipa::path(
    post,
    path = "/apiKeys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 200, description = "Created key, including its secret", body = EnvelopeDoc),
        (status = 400, description = "Invalid request", body = EnvelopeDoc)
    ),
    tag = "api_keys"
)]
#[instrument(name = "api_keys.create", skip_all)]
pub async fn create_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::POST, &["apiKeys"], None, &headers, body).await
}

/// Revoke an API key
#[utoipa::path(
    delete,
    path = "/apiKeys/{id}",
    params(("id" = String, Path, description = "API key id")),
    responses(
        (status = 200, description = "Revoked", body = EnvelopeDoc),
        (status = 404, description = "No such key", body = EnvelopeDoc)
    ),
    tag = "api_keys"
)]
#[instrument(name = "api_keys.revoke", skip(state, headers))]
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::DELETE, &["apiKeys", &id], None, &headers, Bytes::new()).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router
        .routes(routes!(list_api_keys, create_api_key))
        .routes(routes!(revoke_api_key))
}
