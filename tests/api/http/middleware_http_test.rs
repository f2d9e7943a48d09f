//! Global middleware behaviour observed through the production router

use super::{
    build_test_router, get_json_with_auth, post_json_with_auth, register_user, send, TestAppState,
};
use crate::api::create_test_config;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use jobboard_api::api::job::{JobListResponse, JobResponse};
use jobboard_api::error::ErrorResponse;
use pretty_assertions::assert_eq;
use serde_json::json;

fn request_from(ip: &str, path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

async fn error_body(response: axum::response::Response) -> ErrorResponse {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Security headers
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let mut config = create_test_config();
    config.rate_limit.max_requests = 3;
    let app = build_test_router(TestAppState::with_config(config));

    // The last "/" is over budget, so the 429 is checked as well
    let mut statuses = Vec::new();
    for path in ["/", "/health", "/api/v1/jobs", "/no/such/route", "/"] {
        let response = send(&app, request_from("10.0.0.1", path)).await;
        statuses.push(response.status());
        let headers = response.headers();
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY), "{path}");
        assert_eq!(headers["x-content-type-options"], "nosniff", "{path}");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{path}");
        assert_eq!(headers["x-xss-protection"], "0", "{path}");
        assert_eq!(headers["referrer-policy"], "no-referrer", "{path}");
        assert!(!headers.contains_key("x-powered-by"), "{path}");
    }
    assert_eq!(statuses.last(), Some(&StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = build_test_router(TestAppState::new());
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = build_test_router(TestAppState::new());
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://frontend.example.com")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = build_test_router(TestAppState::new());

    let response = send(&app, request_from("10.0.0.1", "/api/v1/nothing")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = error_body(response).await;
    assert_eq!(body.message, "Route does not exist");
    assert_eq!(body.status, 404);
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let app = build_test_router(TestAppState::new());

    let response = send(&app, request_from("10.0.0.1", "/api/v1/auth/login")).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = error_body(response).await;
    assert_eq!(body.status, 405);
}

#[tokio::test]
async fn test_missing_content_type_is_json_error() {
    let app = build_test_router(TestAppState::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .body(Body::from(r#"{"email":"a@b.c","password":"x"}"#))
        .unwrap();

    let response = send(&app, request).await;

    assert!(response.status().is_client_error());
    let body = error_body(response).await;
    assert!(body.status >= 400);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = create_test_config();
    config.body_limit_bytes = 64;
    let app = build_test_router(TestAppState::with_config(config));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "x".repeat(200), "email": "a@b.c", "password": "secret123" })
                .to_string(),
        ))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_101st_request_is_rejected() {
    let app = build_test_router(TestAppState::new());

    for i in 0..100 {
        let response = send(&app, request_from("10.0.0.1", "/")).await;
        assert_eq!(response.status(), StatusCode::OK, "request {} throttled", i + 1);
        assert_eq!(response.headers()["x-ratelimit-limit"], "100");
    }

    let response = send(&app, request_from("10.0.0.1", "/")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    let body = error_body(response).await;
    assert_eq!(body.status, 429);

    // Another client keeps its own budget
    let response = send(&app, request_from("10.0.0.2", "/")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_keys_on_proxy_appended_hop() {
    let mut config = create_test_config();
    config.rate_limit.max_requests = 5;
    let app = build_test_router(TestAppState::with_config(config));

    // Same client behind the proxy, a fresh forged leading hop every time
    let mut statuses = Vec::new();
    for i in 0..10 {
        let forwarded = format!("1.2.3.{i}, 203.0.113.7");
        statuses.push(send(&app, request_from(&forwarded, "/")).await.status());
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::OK));
    assert!(statuses[5..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_client_real_ip_cannot_pick_bucket() {
    let mut config = create_test_config();
    config.rate_limit.max_requests = 1;
    let app = build_test_router(TestAppState::with_config(config));

    let request = |real_ip: &str| {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", real_ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, request("6.6.6.1")).await.status(), StatusCode::OK);
    assert_eq!(
        send(&app, request("6.6.6.2")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_health_is_exempt_from_rate_limit() {
    let mut config = create_test_config();
    config.rate_limit.max_requests = 1;
    let app = build_test_router(TestAppState::with_config(config));

    for _ in 0..5 {
        let response = send(&app, request_from("10.0.0.1", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// ============================================================================
// XSS sanitization
// ============================================================================

#[tokio::test]
async fn test_script_in_company_is_stored_escaped() {
    let state = TestAppState::new();
    let app = build_test_router(state.clone());
    let alice = register_user(&app, "Alice", "alice@example.com").await;

    let (status, body): (StatusCode, Option<JobResponse>) = post_json_with_auth(
        &app,
        "/api/v1/jobs",
        &json!({ "company": "<script>alert(1)</script>", "position": "Engineer" }),
        &alice.token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let expected = "&lt;script&gt;alert(1)&lt;/script&gt;";
    assert_eq!(body.unwrap().job.company, expected);
    assert_eq!(state.job_repo.all().await[0].company, expected);
}

#[tokio::test]
async fn test_query_string_is_sanitized() {
    let app = build_test_router(TestAppState::new());
    let alice = register_user(&app, "Alice", "alice@example.com").await;
    post_json_with_auth::<_, JobResponse>(
        &app,
        "/api/v1/jobs",
        &json!({ "company": "Acme", "position": "<b>Engineer</b>" }),
        &alice.token,
    )
    .await;

    // The stored position is escaped, so a raw tag search only matches once escaped too
    let (status, body): (StatusCode, Option<JobListResponse>) = get_json_with_auth(
        &app,
        "/api/v1/jobs?search=%3Cb%3E",
        &alice.token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().total, 1);
}
