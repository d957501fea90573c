//! Push notifications

use super::forward;
use crate::{error::HttpError, forwarding::ProxyResponse, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};
use serde_json::Value as JsonValue;
use tracing::instrument;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Broadcast a notification to app users
#[utoipa::path(
    post,
    path = "/notify",
    request_body = JsonValue,
    responses(
        (status = 200, description = "Notification accepted", body = EnvelopeDoc),
        (status = 400, description = "Invalid notification", body = EnvelopeDoc)
    ),
    tag = "notify"
)]
#[instrument(name = "notify.send", skip_all)]
pub async fn send_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::POST, &["notify"], None, &headers, body).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(send_notification))
}
