//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keeper_unit_start_total` (counter): start attempts by unit, outcome
//! - `keeper_unit_stop_total` (counter): stop attempts by unit, outcome
//! - `keeper_inflight_operations` (gauge): start/stop operations not yet finished
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is opt-in via config

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_unit_start(unit: &str, ok: bool) {
    metrics::counter!(
        "keeper_unit_start_total",
        "unit" => unit.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_unit_stop(unit: &str, ok: bool) {
    metrics::counter!(
        "keeper_unit_stop_total",
        "unit" => unit.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_inflight(count: usize) {
    metrics::gauge!("keeper_inflight_operations").set(count as f64);
}
