//! HTTP error types and implementations

#[cfg(feature = "server")]
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
#[cfg(feature = "server")]
use newsdesk_core::Envelope;
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The backend could not be reached
    #[error("Network error: {0}")]
    Upstream(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

#[cfg(feature = "server")]
impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // unreachable backends are reported as 500, same as the client does
            HttpError::Upstream(_) | HttpError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!(error = %self, "Request failed"),
            _ => debug!(error = %self, "Request rejected"),
        }

        let body: Envelope = Envelope::failure(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_are_internal_errors() {
        assert_eq!(
            HttpError::Upstream("connection refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HttpError::BadRequest("bad id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn error_body_is_an_envelope() {
        let response = HttpError::BadRequest("Invalid resource id".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Envelope = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert_eq!(body.status, 400);
        assert_eq!(body.message, "Bad request: Invalid resource id");
        assert!(body.data.is_none());
    }
}
