//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by kind (`page`/`api`) and status
//! - `site_request_duration_seconds` (histogram): latency by kind
//! - `site_route_resolutions_total` (counter): router lookups by kind and outcome
//! - `site_data_entries` (gauge): values in the data store after startup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn describe() {
    describe_counter!("site_requests_total", "Requests served, by kind and status");
    describe_histogram!(
        "site_request_duration_seconds",
        metrics::Unit::Seconds,
        "Request latency, by kind"
    );
    describe_counter!(
        "site_route_resolutions_total",
        "Route lookups, by kind and outcome"
    );
    describe_gauge!("site_data_entries", "Values held by the data store");
}

pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    counter!("site_requests_total", "kind" => kind, "status" => status.to_string()).increment(1);
    histogram!("site_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolution(kind: &'static str, matched: bool) {
    let outcome = if matched { "matched" } else { "not_found" };
    counter!("site_route_resolutions_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_data_entries(count: usize) {
    gauge!("site_data_entries").set(count as f64);
}
