//! HTTP observability middleware
//!
//! Tower Layer/Service pair that propagates `x-request-id` and records
//! request counters, latency histograms and the in-flight gauge.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderValue, Request},
    response::Response,
};
use metrics::{counter, gauge, histogram};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const UNMATCHED_PATH_LABEL: &str = "unmatched";

/// Longest client-supplied request id that is echoed back
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone)]
pub struct ObservabilityLayer;

impl<S> Layer<S> for ObservabilityLayer {
    type Service = ObservabilityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObservabilityMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct ObservabilityMiddleware<S> {
    inner: S,
}

/// Decrements the in-flight gauge even if the inner future is dropped
struct InFlightGuard;

impl InFlightGuard {
    fn new() -> Self {
        gauge!("jobboard_http_requests_in_flight").increment(1.0);
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("jobboard_http_requests_in_flight").decrement(1.0);
    }
}

impl<S> Service<Request<Body>> for ObservabilityMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let method = request.method().to_string();
        let path = metric_path(&request);

        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let guard = InFlightGuard::new();
        let start = Instant::now();

        // Swap in the clone that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let span = tracing::info_span!("request", request_id = %request_id);

        Box::pin(
            async move {
                let mut response = inner.call(request).await?;

                let status = response.status().as_u16().to_string();
                counter!(
                    "jobboard_http_requests_total",
                    "method" => method.clone(),
                    "path" => path.clone(),
                    "status" => status
                )
                .increment(1);
                histogram!(
                    "jobboard_http_request_duration_seconds",
                    "method" => method,
                    "path" => path
                )
                .record(start.elapsed().as_secs_f64());
                drop(guard);

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Collapse UUID-like path segments to `{id}` to keep label cardinality bounded
/// Route template used as the `path` label; unmatched requests share one
/// label so arbitrary 404 paths cannot grow the series count.
fn metric_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH_LABEL.to_string())
}
