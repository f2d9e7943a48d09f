//! Landing page, health, readiness, metrics and docs

use super::{build_test_router, get_json, send, TestAppState};
use crate::api::create_test_config;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use jobboard_api::api::health::HealthResponse;
use serde_json::Value;

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_home_page() {
    let app = build_test_router(TestAppState::new());

    let response = send(&app, get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    assert_eq!(
        body_text(response).await,
        r#"<h1>Jobs API</h1><a href="/api-docs">Documentation</a>"#
    );
}

#[tokio::test]
async fn test_health() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<HealthResponse>) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_ready() {
    let app = build_test_router(TestAppState::new());

    let response = send(&app, get("/ready")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ready");
}

#[tokio::test]
async fn test_not_ready_when_store_is_down() {
    let app = build_test_router(TestAppState::not_ready());

    let response = send(&app, get("/ready")).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(response).await, "not_ready");
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = build_test_router(TestAppState::new());

    let response = send(&app, get("/metrics")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<Value>) =
        get_json(&app, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert!(body["paths"]["/api/v1/jobs"].is_object());
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
}

#[tokio::test]
async fn test_docs_can_be_disabled() {
    let mut config = create_test_config();
    config.docs_enabled = false;
    let app = build_test_router(TestAppState::with_config(config));

    let response = send(&app, get("/api-docs/openapi.json")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
