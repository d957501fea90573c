//! Application state management

use crate::error::HttpError;
use crate::forwarding::{BackendProxy, ForwardingConfig};
use std::sync::Arc;

/// Shared application state
///
/// Holds the backend proxy every `/api` handler forwards through.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<BackendProxy>,
}

impl AppState {
    pub fn new(proxy: BackendProxy) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }

    /// Build the state straight from a forwarding configuration
    pub fn from_config(config: ForwardingConfig) -> Result<Self, HttpError> {
        Ok(Self::new(BackendProxy::new(config)?))
    }
}
