//! Newsdesk HTTP module: dashboard API client and proxy server
//!
//! The `client` feature provides [`client::DashboardClient`], which talks to
//! the `/api` routes with single-flight token refresh. The `server` feature
//! provides those routes: a thin proxy to the backend, the page guard and
//! OpenAPI docs.

#[cfg(feature = "server")]
#[macro_use]
extern crate tracing;

pub mod error;
pub mod paths;
pub mod types;

#[cfg(feature = "server")]
pub mod forwarding;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod state;

#[cfg(feature = "client")]
pub mod client;

pub use error::{HttpError, Result};

#[cfg(feature = "server")]
pub use forwarding::{BackendProxy, ForwardingConfig};
#[cfg(feature = "server")]
pub use server::{RouterOptions, build_router};
#[cfg(feature = "server")]
pub use state::AppState;

#[cfg(feature = "client")]
pub use client::DashboardClient;

// Re-export commonly used types
#[cfg(feature = "server")]
pub use utoipa::OpenApi;
