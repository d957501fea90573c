//! Router assembled from daemon settings

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use newsdesk_daemon::{Server, Settings};
use tower::ServiceExt;

fn settings_with_pages(dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.backend.base_url = "http://127.0.0.1:9".to_string();
    settings.static_dir = Some(dir.to_path_buf());
    settings
}

#[tokio::test]
async fn serves_pages_from_configured_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>login</h1>").unwrap();
    let app = Server::new(settings_with_pages(dir.path())).unwrap().router();

    let response = app
        .oneshot(Request::get("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>login</h1>");
}

#[tokio::test]
async fn dashboard_requires_session_cookie() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>app</h1>").unwrap();
    let app = Server::new(settings_with_pages(dir.path())).unwrap().router();

    let response = app
        .clone()
        .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::COOKIE, "authToken=a1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unreachable_backend_yields_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let app = Server::new(settings_with_pages(dir.path())).unwrap().router();

    let response = app
        .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 500);
}
