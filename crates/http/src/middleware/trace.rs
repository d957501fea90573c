//! Request tracing middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;

/// Wrap each request in an `http_request` span and log its outcome
pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        http.method = %method,
        http.path = %path,
        http.status_code = tracing::field::Empty,
        http.latency_ms = tracing::field::Empty,
    );

    async move {
        let started = Instant::now();
        tracing::debug!("Processing request");
        let response = next.run(req).await;

        let span = tracing::Span::current();
        span.record("http.status_code", response.status().as_u16());
        span.record("http.latency_ms", started.elapsed().as_millis() as u64);
        if response.status().is_server_error() {
            tracing::warn!(status = response.status().as_u16(), "Request failed");
        }

        response
    }
    .instrument(span)
    .await
}
