//! Liveness plus a summary of where `/api` requests are forwarded

use crate::state::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub backend: BackendSummary,
}

/// Forwarding target. The API key itself is never echoed.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendSummary {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_seconds: u64,
}

/// The backend is not probed; an unreachable backend shows up as 500s on `/api`
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Proxy is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.proxy.config();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        backend: BackendSummary {
            base_url: config.base_url.clone(),
            api_key_configured: config.auth_header().is_some(),
            timeout_seconds: config.timeout_seconds,
        },
    })
}

pub fn add_routes(router: OpenApiRouter<AppState>) -> OpenApiRouter<AppState> {
    router.routes(routes!(health_check))
}
