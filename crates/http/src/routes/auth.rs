//! Login and token refresh

use super::forward;
use crate::{error::HttpError, forwarding::ProxyResponse, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};
use tracing::instrument;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Exchange credentials for a token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair and user", body = EnvelopeDoc),
        (status = 401, description = "Invalid credentials", body = EnvelopeDoc),
        (status = 500, description = "Backend unreachable", body = EnvelopeDoc)
    ),
    tag = "auth"
)]
#[instrument(name = "auth.login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::POST, &["auth", "login"], None, &headers, body).await
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = EnvelopeDoc),
        (status = 401, description = "Refresh token rejected", body = EnvelopeDoc),
        (status = 500, description = "Backend unreachable", body = EnvelopeDoc)
    ),
    tag = "auth"
)]
#[instrument(name = "auth.refresh", skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::POST, &["auth", "refresh"], None, &headers, body).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(login)).routes(routes!(refresh))
}
