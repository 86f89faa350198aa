//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_relay_total` (counter): relay outcomes by tier
//! - `gateway_upstream_errors_total` (counter): failed upstream round-trips
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, started: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

pub fn record_relay(tier: &'static str, delivered: bool) {
    let outcome = if delivered { "delivered" } else { "failed" };
    metrics::counter!("gateway_relay_total", "tier" => tier, "outcome" => outcome).increment(1);
}

pub fn record_upstream_error() {
    metrics::counter!("gateway_upstream_errors_total").increment(1);
}
