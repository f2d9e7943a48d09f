//! Middleware that makes the client address visible as `X-Real-IP`.
//!
//! Behind a trusted proxy the client is the rightmost `X-Forwarded-For` hop,
//! the one the proxy appended. Anything to its left was written by the client.
//! Without a trusted proxy the socket address always wins. A client-supplied
//! `X-Real-IP` is never kept.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

/// The hop appended by the single trusted proxy
pub fn trusted_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

pub async fn inject_client_ip(
    State(trust_proxy): State<bool>,
    mut request: Request,
    next: Next,
) -> Response {
    let forwarded = trust_proxy
        .then(|| trusted_forwarded_hop(request.headers()))
        .flatten();
    let client_ip = forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|addr| addr.0.ip().to_string())
    });

    match client_ip.and_then(|ip| HeaderValue::from_str(&ip).ok()) {
        Some(value) => {
            request.headers_mut().insert("x-real-ip", value);
        }
        None => {
            request.headers_mut().remove("x-real-ip");
        }
    }

    next.run(request).await
}
