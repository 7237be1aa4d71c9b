//! Metrics collection and exposition.
//!
//! # Metrics
//! - `echo_requests_total` (counter): requests by response status
//! - `echo_request_duration_seconds` (histogram): end-to-end handler latency
//! - `echo_worker_outcomes_total` (counter): worker outcomes by kind
//! - `echo_dispatch_duration_seconds` (histogram): fan-out/fan-in latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("echo_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("echo_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("echo_worker_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_dispatch(start: Instant) {
    metrics::histogram!("echo_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}
