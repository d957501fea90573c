//! Newsdesk daemon: serves the `/api` proxy routes, docs and dashboard pages

pub mod config;
pub mod error;
pub mod server;

pub use config::Settings;
pub use error::{DaemonError, Result};
pub use server::Server;
