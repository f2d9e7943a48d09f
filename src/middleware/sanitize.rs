//! XSS input sanitization middleware
//!
//! Escapes `<` and `>` in every string of a JSON request body and in every
//! query parameter before handlers see them. Non-JSON bodies pass through
//! untouched, as do JSON bodies that fail to parse (the `Json` extractor
//! reports those).

use crate::error::ErrorResponse;
use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Escape HTML-significant angle brackets
pub fn escape_html(input: &str) -> String {
    if !input.contains(['<', '>']) {
        return input.to_string();
    }
    input.replace('<', "&lt;").replace('>', "&gt;")
}

/// Recursively escape every string (object keys included) in a JSON value
pub fn sanitize_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (escape_html(&key), sanitize_json(val)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(sanitize_json).collect()),
        Value::String(s) => Value::String(escape_html(&s)),
        other => other,
    }
}

/// Rewrite a raw query string, or `None` when nothing needed escaping
fn sanitize_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let dirty = pairs
        .iter()
        .any(|(k, v)| k.contains(['<', '>']) || v.contains(['<', '>']));
    if !dirty {
        return None;
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(&escape_html(key), &escape_html(value));
    }
    Some(serializer.finish())
}

fn sanitized_uri(uri: &Uri) -> Option<Uri> {
    let query = sanitize_query(uri.query()?)?;
    let path_and_query: PathAndQuery = format!("{}?{}", uri.path(), query).parse().ok()?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).ok()
}

fn is_json(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
}

fn payload_too_large() -> Response {
    let status = StatusCode::PAYLOAD_TOO_LARGE;
    (
        status,
        Json(ErrorResponse::new(
            status,
            "payload_too_large",
            "Request body too large",
        )),
    )
        .into_response()
}

/// Sanitization middleware. State is the maximum body size to buffer.
pub async fn sanitize_input(
    State(body_limit): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut request = request;
    if let Some(uri) = sanitized_uri(request.uri()) {
        *request.uri_mut() = uri;
    }

    if !is_json(&request) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, body_limit).await {
        Ok(bytes) => bytes,
        Err(_) => return payload_too_large(),
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => match serde_json::to_vec(&sanitize_json(value)) {
            Ok(clean) => {
                parts.headers.remove(header::CONTENT_LENGTH);
                Body::from(clean)
            }
            Err(_) => Body::from(bytes),
        },
        Err(_) => Body::from(bytes),
    };

    next.run(Request::from_parts(parts, body)).await
}
