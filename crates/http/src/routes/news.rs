//! News moderation

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

/// List news articles
#[utoipa::path(
    get,
    path = "/news",
    params(ListQuery),
    responses(
        (status = 200, description = "News articles", body = EnvelopeDoc),
        (status = 401, description = "Not authenticated", body = EnvelopeDoc)
    ),
    tag = "news"
)]
#[instrument(name = "news.list", skip_all)]
pub async fn list_news(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["news"], query, &headers, Bytes::new()).await
}

/// Get one article
#[utoipa::path(
    get,
    path = "/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article", body = EnvelopeDoc),
        (status = 404, description = "No such article", body = EnvelopeDoc)
    ),
    tag = "news"
)]
#[instrument(name = "news.get", skip(state, headers))]
pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::GET, &["news", &id], None, &headers, Bytes::new()).await
}

/// Edit an article
#[utoipa::path(
    put,
    path = "/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = JsonValue,
    responses(
        (status = 200, description = "Updated article", body = EnvelopeDoc),
        (status = 404, description = "No such article", body = EnvelopeDoc)
    ),
    tag = "news"
)]
#[instrument(name = "news.update", skip(state, headers, body))]
pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::PUT, &["news", &id], None, &headers, body).await
}

/// Delete an article
#[utoipa::path(
    delete,
    path = "/news/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Deleted", body = EnvelopeDoc),
        (status = 404, description = "No such article", body = EnvelopeDoc)
    ),
    tag = "news"
)]
#[instrument(name = "news.delete", skip(state, headers))]
pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::DELETE, &["news", &id], None, &headers, Bytes::new()).await
}

/// Approve or reject an article
#[utoipa::path(
    patch,
    path = "/news/{id}/status",
    params(("id" = String, Path, description = "Article id")),
    request_body = JsonValue,
    responses(
        (status = 200, description = "Article with its new status", body = EnvelopeDoc),
        (status = 404, description = "No such article", body = EnvelopeDoc)
    ),
    tag = "news"
)]
#[instrument(name = "news.set_status", skip(state, headers, body))]
pub async fn set_news_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, HttpError> {
    forward(&state, Method::PATCH, &["news", &id, "status"], None, &headers, body).await
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router
        .routes(routes!(list_news))
        .routes(routes!(get_news, update_news, delete_news))
        .routes(routes!(set_news_status))
}
