//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, upstream statuses)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_upstream_status_total` (counter): Gemini status codes received
//!
//! # Design Decisions
//! - Low-overhead metric updates through the `metrics` facade
//! - Labels for method and status code only; paths are unbounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::gemini::Status;

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
pub const UPSTREAM_STATUS_TOTAL: &str = "gateway_upstream_status_total";

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, &labels).record(start.elapsed().as_secs_f64());
}

/// Record the status of an upstream Gemini response.
pub fn record_upstream_status(status: Status) {
    metrics::counter!(
        UPSTREAM_STATUS_TOTAL,
        "status" => status.code().to_string(),
        "kind" => status.kind_label()
    )
    .increment(1);
}
