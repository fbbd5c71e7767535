//! Metrics collection and exposition.
//!
//! # Metrics
//! - `spot_requests_total` (counter): requests by method, status, route
//! - `spot_request_duration_seconds` (histogram): latency by route
//! - `spot_route_errors_total` (counter): handler failures by kind
//! - `spot_cache_lookups_total` (counter): window cache hits and misses
//! - `spot_race_winner_total` (counter): which handler settled each race

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "spot_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("spot_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_error(kind: &'static str) {
    counter!("spot_route_errors_total", "kind" => kind).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("spot_cache_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_race_winner(handler: &str, success: bool) {
    counter!(
        "spot_race_winner_total",
        "handler" => handler.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}
