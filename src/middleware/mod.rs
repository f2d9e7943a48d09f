//! HTTP middleware for the job board API
//!
//! Global layers (client address, rate limiting, security headers, input
//! sanitization, error normalization, observability) plus the JWT guard for
//! the job routes.

pub mod auth;
pub mod client_ip;
pub mod error_response;
pub mod metrics;
pub mod rate_limit;
pub mod require_auth;
pub mod sanitize;
pub mod security_headers;
pub mod trace;

pub use auth::{AuthError, AuthUser};
pub use client_ip::inject_client_ip;
pub use error_response::{normalize_error_response, route_not_found};
pub use metrics::ObservabilityLayer;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
pub use require_auth::{require_auth_middleware, AuthMiddlewareState};
pub use sanitize::sanitize_input;
pub use security_headers::security_headers_middleware;
pub use trace::SanitizedMakeSpan;
