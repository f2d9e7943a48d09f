//! Auth API HTTP Handler Tests

use super::{build_test_router, post_json, register_user, send, TestAppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use jobboard_api::api::auth::AuthResponse;
use jobboard_api::error::ErrorResponse;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let state = TestAppState::new();
    let app = build_test_router(state.clone());

    let (status, body): (StatusCode, Option<AuthResponse>) = post_json(
        &app,
        "/api/v1/auth/register",
        &json!({ "name": "Alice", "email": "  Alice@Example.com ", "password": "secret123" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let body = body.unwrap();
    assert_eq!(body.user.name, "Alice");
    assert_eq!(body.user.email, "alice@example.com");
    assert!(!body.token.is_empty());

    let claims = state.jwt_manager.verify_token(&body.token).unwrap();
    assert_eq!(claims.sub, body.user.id.to_string());
    assert_eq!(claims.name, "Alice");

    let stored = state.user_repo.all().await;
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash, "secret123");
}

#[tokio::test]
async fn test_register_response_never_contains_password() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/auth/register",
        &json!({ "name": "Alice", "email": "alice@example.com", "password": "secret123" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let body = body.unwrap();
    assert!(!body.to_string().contains("secret123"));
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = build_test_router(TestAppState::new());
    register_user(&app, "Alice", "alice@example.com").await;

    let (status, body): (StatusCode, Option<ErrorResponse>) = post_json(
        &app,
        "/api/v1/auth/register",
        &json!({ "name": "Other", "email": "ALICE@example.com", "password": "secret123" }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.unwrap().status, 409);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = build_test_router(TestAppState::new());

    for payload in [
        json!({ "name": "Al", "email": "al@example.com", "password": "secret123" }),
        json!({ "name": "Alice", "email": "not-an-email", "password": "secret123" }),
        json!({ "name": "Alice", "email": "alice@example.com", "password": "short" }),
        json!({ "name": "Alice", "email": "alice@example.com" }),
    ] {
        let (status, body): (StatusCode, Option<ErrorResponse>) =
            post_json(&app, "/api/v1/auth/register", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} accepted");
        assert_eq!(body.unwrap().status, 400);
    }
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = build_test_router(TestAppState::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = build_test_router(TestAppState::new());
    let registered = register_user(&app, "Alice", "alice@example.com").await;

    let (status, body): (StatusCode, Option<AuthResponse>) = post_json(
        &app,
        "/api/v1/auth/login",
        &json!({ "email": "alice@example.com", "password": "secret123" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body.user, registered.user);
    assert!(!body.token.is_empty());
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<ErrorResponse>) = post_json(
        &app,
        "/api/v1/auth/login",
        &json!({ "email": "alice@example.com", "password": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap().message, "Please provide email and password");
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let app = build_test_router(TestAppState::new());
    register_user(&app, "Alice", "alice@example.com").await;

    let (wrong_status, wrong_body): (StatusCode, Option<ErrorResponse>) = post_json(
        &app,
        "/api/v1/auth/login",
        &json!({ "email": "alice@example.com", "password": "wrong-password" }),
    )
    .await;
    let (unknown_status, unknown_body): (StatusCode, Option<ErrorResponse>) = post_json(
        &app,
        "/api/v1/auth/login",
        &json!({ "email": "nobody@example.com", "password": "secret123" }),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    let wrong_body = wrong_body.unwrap();
    assert_eq!(wrong_body.message, "Invalid credentials");
    assert_eq!(wrong_body, unknown_body.unwrap());
}
