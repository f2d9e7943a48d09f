//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Latency buckets in seconds, with sub-millisecond resolution for fast endpoints
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .install_recorder()
}

/// Register metric descriptions and emit initial zero values so the exposition
/// includes HELP/TYPE lines from startup.
pub fn describe_metrics() {
    describe_counter!("jobboard_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "jobboard_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "jobboard_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    describe_counter!(
        "jobboard_auth_attempts_total",
        "Registration and login attempts by outcome"
    );
    describe_counter!(
        "jobboard_rate_limit_throttled_total",
        "Total number of rate-limited requests"
    );

    counter!("jobboard_auth_attempts_total", "action" => "login", "result" => "success")
        .absolute(0);
    counter!("jobboard_auth_attempts_total", "action" => "register", "result" => "success")
        .absolute(0);
    counter!("jobboard_rate_limit_throttled_total").absolute(0);
    gauge!("jobboard_http_requests_in_flight").set(0.0);
}
