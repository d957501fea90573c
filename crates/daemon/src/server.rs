//! HTTP server for the newsdesk daemon

use crate::config::Settings;
use crate::{DaemonError, Result};
use axum::Router;
use axum::http::{HeaderName, Method, header};
use newsdesk_http::types::API_KEY_HEADER;
use newsdesk_http::{AppState, build_router};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::Any, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Proxy server bound to the configured address
pub struct Server {
    settings: Settings,
    app: Router,
}

impl Server {
    /// Build the application from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid
    pub fn new(settings: Settings) -> Result<Self> {
        let state = AppState::from_config(settings.forwarding())?;
        let app = create_app(&settings, state);
        Ok(Self { settings, app })
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Serve until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.settings.server.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| DaemonError::Bind { addr, source })?;
        let local_addr: SocketAddr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            backend = %self.settings.backend.base_url,
            "Server listening"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Wrap the proxy router with tracing, timeout and optional CORS layers
pub fn create_app(settings: &Settings, state: AppState) -> Router {
    let mut app = build_router(state, settings.router_options()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                settings.server.timeout_secs,
            ))),
    );

    if settings.server.cors_enabled {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    HeaderName::from_static(API_KEY_HEADER),
                ]),
        );
    }

    app
}
