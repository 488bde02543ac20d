//! Metrics collection and exposition.
//!
//! # Metrics
//! - `transfer_submissions_total` (counter): finished attempts by outcome
//! - `transfer_failures_total` (counter): failed attempts by reason
//! - `transfer_duration_seconds` (histogram): submit-to-outcome latency
//! - `rpc_backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished submission attempt.
pub fn record_submission(outcome: &'static str, started: Instant) {
    metrics::counter!("transfer_submissions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("transfer_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Record why an attempt failed.
pub fn record_transfer_failure(reason: &'static str) {
    metrics::counter!("transfer_failures_total", "reason" => reason).increment(1);
}

/// Record the health of an RPC backend.
pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("rpc_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
