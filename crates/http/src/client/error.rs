//! Client error types

use super::refresh::RefreshError;
use super::storage::StorageError;
use thiserror::Error;

/// Client error types
///
/// Endpoint calls never surface these; they answer with an
/// [`ApiResponse`](newsdesk_core::ApiResponse) failure instead. Errors are
/// reserved for construction and explicit session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Token refresh failed; the session has been cleared
    #[error("Token refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Session storage failed
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
