//! Router assembly: proxy routes, docs, page guard and static pages

use crate::middleware::{page_guard, trace_middleware};
use crate::routes;
use crate::state::AppState;
use axum::Router;
use std::path::{Path, PathBuf};
use tower_http::services::{ServeDir, ServeFile};
use utoipa_scalar::{Scalar, Servable as _};

/// Options for [`build_router`]
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Directory of built dashboard pages, served for every unmatched path
    pub static_dir: Option<PathBuf>,
    /// Index file inside `static_dir`, served when no file matches
    pub static_index: Option<String>,
}

impl RouterOptions {
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}

/// Build the complete axum router with documentation at `/docs/`
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let (router, api) = routes::router().split_for_parts();
    let mut router = router.merge(Scalar::with_url("/docs/", api));

    if let Some(static_dir) = &options.static_dir {
        router = serve_static(router, static_dir, options.static_index.as_deref());
    }

    router
        .with_state(state)
        .layer(axum::middleware::from_fn(page_guard))
        .layer(axum::middleware::from_fn(trace_middleware))
}

fn serve_static(
    router: Router<AppState>,
    static_dir: &Path,
    index: Option<&str>,
) -> Router<AppState> {
    if !static_dir.exists() {
        warn!(
            dir = %static_dir.display(),
            "Static directory does not exist, skipping static file serving"
        );
        return router;
    }

    info!(dir = %static_dir.display(), "Serving static files");
    let index_path = static_dir.join(index.unwrap_or("index.html"));
    if index_path.exists() {
        router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index_path)))
    } else {
        debug!(index = %index_path.display(), "No index file, unmatched pages will 404");
        router.fallback_service(ServeDir::new(static_dir))
    }
}
