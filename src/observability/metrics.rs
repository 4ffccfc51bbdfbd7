//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (requests, latency, template compiles)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `pages_requests_total` (counter): pages served, by status code
//! - `pages_request_duration_seconds` (histogram): latency distribution
//! - `pages_template_compiles_total` (counter): compilations by outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Compiles are counted where they happen, so cache hits never
//!   inflate the compile counter

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr` and register metric help
/// text.
///
/// Failure to start the exporter is logged, not fatal; the server can
/// serve pages without a scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("pages_requests_total", "Pages served, by status code");
            describe_histogram!(
                "pages_request_duration_seconds",
                "Time to serve a page in seconds"
            );
            describe_counter!(
                "pages_template_compiles_total",
                "Template compilations, by outcome"
            );
            tracing::info!(address = %addr, "metrics exporter listening");
        }
        Err(err) => {
            tracing::error!(address = %addr, error = %err, "failed to start metrics exporter");
        }
    }
}

/// Record one served request.
pub fn record_request(status: u16, start_time: Instant) {
    counter!("pages_requests_total", "status" => status.to_string()).increment(1);
    histogram!("pages_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

/// Record one template compilation attempt.
pub fn record_compile(success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!("pages_template_compiles_total", "outcome" => outcome).increment(1);
}
