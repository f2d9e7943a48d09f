//! Telemetry initialization: metrics and structured logging

pub mod metrics;

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "jobboard_api=info,tower_http=info";

/// Initialise logging and, when enabled, the Prometheus recorder.
///
/// Returns `Some(PrometheusHandle)` when metrics are enabled so the HTTP
/// server can expose a `/metrics` endpoint.
pub fn init(config: &TelemetryConfig) -> Option<PrometheusHandle> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.log_format == "json" {
        // Flatten event fields so `message` is top-level
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true);
        registry.with(fmt_layer).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if !config.metrics_enabled {
        return None;
    }

    match metrics::install_prometheus_recorder() {
        Ok(handle) => {
            metrics::describe_metrics();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder, metrics disabled");
            None
        }
    }
}
