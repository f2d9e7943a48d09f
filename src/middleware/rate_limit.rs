//! Per-client rate limiting for the REST API
//!
//! Sliding window counter kept in process memory, keyed by client IP.

use crate::config::RateLimitConfig;
use crate::error::ErrorResponse;
use crate::middleware::client_ip::trusted_forwarded_hop;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Paths that are never throttled so orchestrator probes keep working
const EXEMPT_PATHS: &[&str] = &["/health", "/ready"];

/// Prune idle buckets once the map grows past this many keys
const MAX_TRACKED_KEYS: usize = 10_000;

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    /// Requests left in the current window after this one
    pub remaining: u64,
    /// Seconds until the oldest request in the window expires
    pub reset_after_secs: u64,
}

/// Sliding window limiter. Each key holds the instants of its recent requests.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    buckets: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    max_requests: u64,
    window: Duration,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Check and record a request for `key`
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.window;
        let expired = |ts: &Instant| now.saturating_duration_since(*ts) >= window;

        // A poisoned lock only means another request panicked mid-update; the
        // timestamps are still usable.
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamps = buckets.entry(key.to_string()).or_default();

        while timestamps.front().is_some_and(expired) {
            timestamps.pop_front();
        }

        let reset_after = |oldest: Option<&Instant>| {
            oldest
                .map(|ts| window.saturating_sub(now.saturating_duration_since(*ts)))
                .unwrap_or(window)
                .as_secs()
                .max(1)
        };

        let decision = if timestamps.len() as u64 >= self.max_requests {
            RateLimitDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_after_secs: reset_after(timestamps.front()),
            }
        } else {
            timestamps.push_back(now);
            RateLimitDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests - timestamps.len() as u64,
                reset_after_secs: reset_after(timestamps.front()),
            }
        };

        if buckets.len() > MAX_TRACKED_KEYS {
            buckets.retain(|_, v| {
                v.retain(|ts| !expired(ts));
                !v.is_empty()
            });
        }

        decision
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Rate limit state shared across requests
#[derive(Clone)]
pub struct RateLimitState {
    enabled: bool,
    trust_proxy: bool,
    limiter: InMemoryRateLimiter,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            trust_proxy: config.trust_proxy,
            limiter: InMemoryRateLimiter::new(config.max_requests, config.window_secs),
        }
    }

    /// A state that lets everything through
    pub fn noop() -> Self {
        Self::new(&RateLimitConfig {
            enabled: false,
            ..Default::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Client address used as the rate limit key.
///
/// With `trust_proxy` the rightmost `X-Forwarded-For` hop wins, since only
/// that one was written by the proxy; otherwise only `X-Real-IP` (which
/// `inject_client_ip` sets from the socket) is consulted.
pub fn extract_client_ip(headers: &HeaderMap, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| trusted_forwarded_hop(headers))
        .flatten();

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn too_many_requests(decision: RateLimitDecision) -> Response {
    let status = StatusCode::TOO_MANY_REQUESTS;
    let mut response = (
        status,
        Json(ErrorResponse::new(
            status,
            "too_many_requests",
            "Too many requests from this IP, please try again later",
        )),
    )
        .into_response();
    response.headers_mut().insert(
        "retry-after",
        HeaderValue::from(decision.reset_after_secs),
    );
    response
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: RateLimitDecision) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(unix_now() + decision.reset_after_secs),
    );
}

/// Rate limiting middleware function
///
/// Returns 429 Too Many Requests once a client exceeds its window budget.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !rate_limit.is_enabled() || EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let client_ip = extract_client_ip(request.headers(), rate_limit.trust_proxy);
    let decision = rate_limit.limiter.check(&client_ip);

    if !decision.allowed {
        metrics::counter!("jobboard_rate_limit_throttled_total").increment(1);
        tracing::warn!(client_ip = %client_ip, "Rate limit exceeded");
        let mut response = too_many_requests(decision);
        insert_rate_limit_headers(response.headers_mut(), decision);
        return response;
    }

    let mut response = next.run(request).await;
    insert_rate_limit_headers(response.headers_mut(), decision);
    response
}
