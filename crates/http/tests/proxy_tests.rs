//! Integration tests for the `/api` proxy routes and the page guard

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use newsdesk_core::Envelope;
use newsdesk_http::{AppState, ForwardingConfig, RouterOptions, build_router};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_is, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(backend: &str, options: RouterOptions) -> axum::Router {
    let state =
        AppState::from_config(ForwardingConfig::new(backend).with_api_key("dash-key")).unwrap();
    build_router(state, options)
}

async fn envelope_of(response: Response) -> Envelope {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_forwards_api_key_authorization_and_query() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("status", "PENDING"))
        .and(header_is("x-api-key", "dash-key"))
        .and(header_is("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Storm", "status": "PENDING"}
        ])))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app(&backend.uri(), RouterOptions::default())
        .oneshot(
            Request::get("/api/news?status=PENDING")
                .header(header::AUTHORIZATION, "Bearer a1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = envelope_of(response).await;
    assert!(body.success);
    assert_eq!(body.status, 200);
    // bare backend bodies are wrapped as data
    assert_eq!(body.data.unwrap()[0]["title"], "Storm");
}

#[tokio::test]
async fn test_forwards_json_body() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "staff@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": 200,
            "message": "Login successful",
            "data": {"jwt": "a1", "refreshToken": "r1"}
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app(&backend.uri(), RouterOptions::default())
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "staff@example.com", "password": "secret"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = envelope_of(response).await;
    assert_eq!(body.message, "Login successful");
    assert_eq!(body.data.unwrap()["jwt"], "a1");
}

#[tokio::test]
async fn test_passes_upstream_status_through() {
    let backend = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/reports/7"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&backend)
        .await;

    let response = app(&backend.uri(), RouterOptions::default())
        .oneshot(
            Request::patch("/api/reports/7")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"RESOLVED"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = envelope_of(response).await;
    assert!(!body.success);
    assert_eq!(body.status, 401);
    assert_eq!(body.message, "jwt expired");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_500_envelope() {
    let backend = MockServer::start().await;
    let uri = backend.uri();
    drop(backend);

    let response = app(&uri, RouterOptions::default())
        .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = envelope_of(response).await;
    assert!(!body.success);
    assert_eq!(body.status, 500);
    assert!(body.message.starts_with("Network error"));
}

#[tokio::test]
async fn test_health_and_docs_are_served() {
    let app = app("http://127.0.0.1:9", RouterOptions::default());

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(health.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["baseUrl"], "http://127.0.0.1:9");
    assert_eq!(body["backend"]["apiKeyConfigured"], true);
    // the key itself stays private
    assert!(!bytes.windows(8).any(|w| w == b"dash-key"));

    let docs = app
        .oneshot(Request::get("/docs/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(docs.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_pages_without_session_redirect_to_login() {
    let app = app("http://127.0.0.1:9", RouterOptions::default());

    for page in ["/", "/dashboard", "/dashboard/news"] {
        let response = app
            .clone()
            .oneshot(Request::get(page).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{page}");
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}

#[tokio::test]
async fn test_login_page_with_session_redirects_to_dashboard() {
    let app = app("http://127.0.0.1:9", RouterOptions::default());

    for page in ["/", "/login"] {
        let response = app
            .clone()
            .oneshot(
                Request::get(page)
                    .header(header::COOKIE, "authToken=a1; refreshToken=r1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{page}");
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }
}

#[tokio::test]
async fn test_static_pages_are_served_behind_the_guard() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>newsdesk</h1>").unwrap();
    let app = app(
        "http://127.0.0.1:9",
        RouterOptions::default().with_static_dir(dir.path()),
    );

    let login = app
        .clone()
        .oneshot(Request::get("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let dashboard = app
        .oneshot(
            Request::get("/dashboard/reports")
                .header(header::COOKIE, "authToken=a1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(dashboard.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>newsdesk</h1>");
}

#[tokio::test]
async fn test_api_routes_are_not_guarded() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apiKeys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backend)
        .await;

    let response = app(&backend.uri(), RouterOptions::default())
        .oneshot(Request::get("/api/apiKeys").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
