//! Request and response bodies shared by the client and the proxy routes

use newsdesk_core::{NewsStatus, ReportStatus, User};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Header carrying the static dashboard API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Storage key and cookie name of the access token
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Storage key and cookie name of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Page a logged-out user is sent to
pub const LOGIN_PATH: &str = "/login";
/// Landing page of a logged-in user
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `data` of a successful login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(alias = "accessToken", alias = "token")]
    pub jwt: String,
    pub refresh_token: String,
    pub user: User,
}

/// `data` of a successful refresh. The backend may rotate the refresh token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    #[serde(alias = "accessToken", alias = "token")]
    pub jwt: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Pagination and filters accepted by the list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "server",
    derive(utoipa::IntoParams),
    into_params(parameter_in = Query)
)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Status filter, e.g. `PENDING`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Free-text search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query pairs in a stable order, omitting unset fields
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

/// One page of a list endpoint.
///
/// Accepts either a bare JSON array or an object wrapping the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageRepr<T>")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub page: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "data", alias = "results", alias = "content")]
        items: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
    },
}

impl<T> From<PageRepr<T>> for Page<T> {
    fn from(repr: PageRepr<T>) -> Self {
        match repr {
            PageRepr::Bare(items) => Self {
                items,
                total: None,
                page: None,
            },
            PageRepr::Wrapped { items, total, page } => Self { items, total, page },
        }
    }
}

/// Editable fields of a news article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Approve or reject an article
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStatusUpdate {
    pub status: NewsStatus,
    /// Shown to the author when rejecting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Move a report through its workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusUpdate {
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Create API key request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct CreateApiKeyRequest {
    /// Name for the API key
    pub name: String,
}

/// Documentation shape of the `{success, status, message, data}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct EnvelopeDoc {
    pub success: bool,
    /// Upstream HTTP status, or 500 when the backend was unreachable
    pub status: u16,
    pub message: String,
    /// Endpoint payload; absent on failure
    #[cfg_attr(feature = "server", schema(value_type = Option<Object>))]
    pub data: Option<JsonValue>,
}
