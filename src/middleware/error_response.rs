//! Error response normalization middleware
//!
//! Every 4xx/5xx leaving the router carries the `{error, message, status}`
//! body, including framework rejections that would otherwise be text/plain.

use crate::error::ErrorResponse;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Probe endpoints answer with their own plain-text bodies
const PASSTHROUGH_PATHS: &[&str] = &["/health", "/ready"];

/// Middleware that rewrites non-JSON error responses into the uniform JSON body.
pub async fn normalize_error_response(request: Request<Body>, next: Next) -> Response {
    let passthrough = PASSTHROUGH_PATHS.contains(&request.uri().path());
    let response = next.run(request).await;

    let status = response.status();
    if passthrough || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        return response;
    }

    // Keep headers set by inner layers (Allow, security, rate limit); only the
    // body description changes.
    let (mut parts, _body) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let mut normalized = generic_error_response(status);
    for (name, value) in parts.headers.iter() {
        normalized.headers_mut().append(name.clone(), value.clone());
    }
    normalized
}

/// Fallback for requests that match no route
pub async fn route_not_found() -> Response {
    let status = StatusCode::NOT_FOUND;
    (
        status,
        Json(ErrorResponse::new(status, "not_found", "Route does not exist")),
    )
        .into_response()
}

fn generic_error_response(status: StatusCode) -> Response {
    let (error_type, message) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", "Invalid request"),
        StatusCode::UNAUTHORIZED => ("unauthorized", "Authentication invalid"),
        StatusCode::FORBIDDEN => ("forbidden", "Access denied"),
        StatusCode::NOT_FOUND => ("not_found", "Route does not exist"),
        StatusCode::METHOD_NOT_ALLOWED => ("method_not_allowed", "Method not allowed"),
        StatusCode::CONFLICT => ("conflict", "Resource conflict"),
        StatusCode::PAYLOAD_TOO_LARGE => ("payload_too_large", "Request body too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ("unsupported_media_type", "Unsupported content type")
        }
        StatusCode::UNPROCESSABLE_ENTITY => ("validation", "Invalid request body"),
        StatusCode::TOO_MANY_REQUESTS => ("too_many_requests", "Too many requests"),
        _ if status.is_client_error() => ("client_error", "Client error"),
        _ => ("internal_error", "Something went wrong, try again later"),
    };

    (status, Json(ErrorResponse::new(status, error_type, message))).into_response()
}
