//! User listing

use super::forward;
use crate::{error::HttpError, forwarding::ProxyResponse, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method},
};
use tracing::instrument;
use utoipa_axum::{router::OpenApiRouter, routes};

/// List users
#[utoipa::path(
    get,
    path = "/users",
    params(ListQuery),
    responses(
        (status = 200, description = "Users", body = EnvelopeDoc),
        (status = 401, description = "Not authenticated", body = EnvelopeDoc)
    ),
    tag = "users"
)]
#[instrument(name = "users.list", skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["users"], query, &headers, Bytes::new()).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(list_users))
}
