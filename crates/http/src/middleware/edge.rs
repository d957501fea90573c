//! Page guard for the dashboard UI
//!
//! Runs in front of every request but only acts on page paths: `/`,
//! `/login`, `/dashboard` and anything below `/dashboard/`. A visitor without
//! an `authToken` cookie is sent to the login page; a visitor with one is
//! sent from the login page (or the root) to the dashboard. The token itself
//! is not validated here, the backend does that on the first API call.

use crate::types::{AUTH_TOKEN_KEY, DASHBOARD_PATH, LOGIN_PATH};
use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Whether `path` is a page the guard protects
pub fn is_guarded(path: &str) -> bool {
    matches!(path, "/" | LOGIN_PATH | DASHBOARD_PATH)
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Value of cookie `name` across all `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Redirect between the login page and the dashboard based on the session cookie
pub async fn page_guard(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(req).await;
    }

    let authenticated = cookie_value(req.headers(), AUTH_TOKEN_KEY).is_some_and(|t| !t.is_empty());

    match (authenticated, path.as_str()) {
        (false, LOGIN_PATH) => next.run(req).await,
        (false, _) => {
            tracing::debug!(%path, "No session cookie, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        (true, "/" | LOGIN_PATH) => Redirect::temporary(DASHBOARD_PATH).into_response(),
        (true, _) => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn guarded_paths() {
        assert!(is_guarded("/"));
        assert!(is_guarded("/login"));
        assert!(is_guarded("/dashboard"));
        assert!(is_guarded("/dashboard/news/42"));
        assert!(!is_guarded("/dashboardx"));
        assert!(!is_guarded("/api/news"));
        assert!(!is_guarded("/health"));
        assert!(!is_guarded("/docs/"));
        assert!(!is_guarded("/assets/app.js"));
    }

    #[test]
    fn cookie_lookup_spans_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("refreshToken=r1; authToken=a1"),
        );

        assert_eq!(cookie_value(&headers, "authToken"), Some("a1"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
