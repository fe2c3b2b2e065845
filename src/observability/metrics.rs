//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, upstream
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): requests rejected by the limiter
//! - `gateway_auth_failures_total` (counter): rejected credentials by reason
//! - `gateway_upstream_errors_total` (counter): timeouts, refused connections
//!
//! # Design Decisions
//! - One Prometheus recorder per process, installed lazily
//! - Labels for upstream service, method, status code

use std::sync::OnceLock;
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the global Prometheus recorder, or return the one installed
/// earlier. `None` if another recorder owns the process.
pub fn install_recorder() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install metrics recorder");
                None
            }
        })
        .clone()
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, upstream: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "upstream" => upstream.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "upstream" => upstream.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!("gateway_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}
