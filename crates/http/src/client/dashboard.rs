//! Dashboard endpoints: users, news moderation, reports, notifications and API keys

use super::{DashboardClient, RequestOptions};
use crate::paths::join_segments;
use crate::types::{
    CreateApiKeyRequest, ListQuery, NewsStatusUpdate, NewsUpdate, Page, ReportStatusUpdate,
};
use newsdesk_core::{
    ApiKey, ApiResponse, CreatedApiKey, NewsArticle, NewsStatus, Notification, Report,
    ReportStatus, User,
};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

impl DashboardClient {
    /// List users
    pub async fn list_users(&self, query: &ListQuery) -> ApiResponse<Page<User>> {
        self.request("/users", RequestOptions::get().with_query(query.to_pairs()))
            .await
    }

    /// List news articles, optionally filtered by status
    pub async fn list_news(&self, query: &ListQuery) -> ApiResponse<Page<NewsArticle>> {
        self.request("/news", RequestOptions::get().with_query(query.to_pairs()))
            .await
    }

    pub async fn get_news(&self, id: &str) -> ApiResponse<NewsArticle> {
        self.item(Method::GET, &["news", id]).await
    }

    pub async fn update_news(&self, id: &str, update: &NewsUpdate) -> ApiResponse<NewsArticle> {
        self.item_with_body(Method::PUT, &["news", id], update).await
    }

    /// Approve or reject an article. `reason` is shown to the author on rejection.
    pub async fn set_news_status(
        &self,
        id: &str,
        status: NewsStatus,
        reason: Option<&str>,
    ) -> ApiResponse<NewsArticle> {
        let update = NewsStatusUpdate {
            status,
            reason: reason.map(str::to_string),
        };
        self.item_with_body(Method::PATCH, &["news", id, "status"], &update)
            .await
    }

    pub async fn delete_news(&self, id: &str) -> ApiResponse<JsonValue> {
        self.item(Method::DELETE, &["news", id]).await
    }

    /// List user reports
    pub async fn list_reports(&self, query: &ListQuery) -> ApiResponse<Page<Report>> {
        self.request("/reports", RequestOptions::get().with_query(query.to_pairs()))
            .await
    }

    pub async fn get_report(&self, id: &str) -> ApiResponse<Report> {
        self.item(Method::GET, &["reports", id]).await
    }

    pub async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
        note: Option<&str>,
    ) -> ApiResponse<Report> {
        let update = ReportStatusUpdate {
            status,
            note: note.map(str::to_string),
        };
        self.item_with_body(Method::PATCH, &["reports", id], &update)
            .await
    }

    /// Broadcast a push notification
    pub async fn send_notification(&self, notification: &Notification) -> ApiResponse<JsonValue> {
        self.request_json(Method::POST, "/notify", notification)
            .await
    }

    pub async fn list_api_keys(&self) -> ApiResponse<Page<ApiKey>> {
        self.request("/apiKeys", RequestOptions::get()).await
    }

    /// Create an API key. The secret is only returned by this call.
    pub async fn create_api_key(&self, name: &str) -> ApiResponse<CreatedApiKey> {
        let request = CreateApiKeyRequest {
            name: name.to_string(),
        };
        self.request_json(Method::POST, "/apiKeys", &request).await
    }

    pub async fn revoke_api_key(&self, id: &str) -> ApiResponse<JsonValue> {
        self.item(Method::DELETE, &["apiKeys", id]).await
    }

    async fn item<T: DeserializeOwned>(&self, method: Method, segments: &[&str]) -> ApiResponse<T> {
        match join_segments(segments) {
            Some(path) => self.request(&path, RequestOptions::new(method)).await,
            None => invalid_id(),
        }
    }

    async fn item_with_body<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match join_segments(segments) {
            Some(path) => self.request_json(method, &path, body).await,
            None => invalid_id(),
        }
    }
}

fn invalid_id<T>() -> ApiResponse<T> {
    ApiResponse::failure(400, "Invalid resource id")
}
