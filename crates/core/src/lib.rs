//! Newsdesk core types and utilities
//!
//! Shared between the dashboard API client and the proxy server: the user and
//! session model, the `{success, status, message, data}` response envelope and
//! the domain objects the dashboard moderates.

pub mod error;
pub mod jwt;
pub mod response;
pub mod types;

#[cfg(feature = "tracing")]
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use response::{ApiResponse, Envelope};
pub use types::{
    ApiKey, CreatedApiKey, DashboardRole, NewsArticle, NewsStatus, Notification, Report,
    ReportStatus, Session, TokenPair, User,
};
