//! User reports

use super::forward;
use crate::{error::HttpError, forwarding::ProxyResponse, state::AppState, types::*};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method},
};
use serde_json::Value as JsonValue;
use tracing::instrument;
use utoipa_axum::{router::OpenApiRouter, routes};

/// List reports
#[utoipa::path(
    get,
    path = "/reports",
    params(ListQuery),
    responses(
        (status = 200, description = "Reports", body = EnvelopeDoc),
        (status = 401, description = "Not authenticated", body = EnvelopeDoc)
    ),
    tag = "reports"
)]
#[instrument(name = "reports.list", skip_all)]
pub async fn list_reports(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["reports"], query, &headers, Bytes::new()).await
}

#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report", body = EnvelopeDoc),
        (status = 404, description = "No such report", body = EnvelopeDoc)
    ),
    tag = "reports"
)]
#[instrument(name = "reports.get", skip(state, headers))]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["reports", &id], None, &headers, Bytes::new()).await
}

/// Move a report to a new status
#[utoipa::path(
    patch,
    path = "/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    request_body = JsonValue,
    responses(
        (status = 200, description = "Updated report", body = EnvelopeDoc),
        (status = 404, description = "No such report", body = EnvelopeDoc)
    ),
    tag = "reports"
)]
#[instrument(name = "reports.update_status", skip(state, headers, body))]
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::PATCH, &["reports", &id], None, &headers, body).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router
        .routes(routes!(list_reports))
        .routes(routes!(get_report, update_report_status))
}
