//! Security headers middleware
//!
//! Applies the same header set that helmet ships by default to every response.
//! Swagger UI pages get a content security policy loose enough for its assets.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::SecurityHeadersConfig;

const DEFAULT_CSP: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';\
script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline';\
upgrade-insecure-requests";

const DOCS_CSP: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
form-action 'self';frame-ancestors 'self';img-src 'self' data: https:;object-src 'none';\
script-src 'self' 'unsafe-inline';script-src-attr 'none';\
style-src 'self' https: 'unsafe-inline';connect-src 'self'";

const DOCS_PREFIX: &str = "/api-docs";

fn wants_hsts(config: &SecurityHeadersConfig, headers: &HeaderMap) -> bool {
    if !config.hsts_enabled {
        return false;
    }
    if !config.hsts_https_only {
        return true;
    }
    config.hsts_trust_x_forwarded_proto
        && headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("https"))
}

fn hsts_value(config: &SecurityHeadersConfig) -> String {
    let mut value = format!("max-age={}", config.hsts_max_age_secs);
    if config.hsts_include_subdomains {
        value.push_str("; includeSubDomains");
    }
    if config.hsts_preload {
        value.push_str("; preload");
    }
    value
}

/// Security headers middleware function
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Decide before `request` moves into `next.run`
    let add_hsts = wants_hsts(&config, request.headers());
    let path = request.uri().path();
    let is_docs = path.starts_with(DOCS_PREFIX);
    let is_api = path.starts_with("/api/");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    let csp = if is_docs { DOCS_CSP } else { DEFAULT_CSP };
    headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp));
    headers.insert(
        "cross-origin-opener-policy",
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        "cross-origin-resource-policy",
        HeaderValue::from_static("same-origin"),
    );
    headers.insert("origin-agent-cluster", HeaderValue::from_static("?1"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off"));
    headers.insert("x-download-options", HeaderValue::from_static("noopen"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        "x-permitted-cross-domain-policies",
        HeaderValue::from_static("none"),
    );
    // Legacy auditor does more harm than good; helmet disables it
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    headers.remove("x-powered-by");

    if is_api {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    if add_hsts {
        if let Ok(value) = HeaderValue::from_str(&hsts_value(&config)) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
        }
    }

    response
}
