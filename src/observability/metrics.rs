//! Metrics collection and exposition.
//!
//! # Metrics
//! - `aistudio_dispatch_total` (counter): dispatch calls by endpoint, outcome
//! - `aistudio_dispatch_duration_seconds` (histogram): latency by endpoint
//! - `aistudio_dispatch_in_flight` (gauge): requests currently open
//! - `aistudio_validation_rejects_total` (counter): field errors by kind

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::OutcomeTag;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_dispatch(endpoint: &str, outcome: OutcomeTag, latency: Duration) {
    counter!(
        "aistudio_dispatch_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("aistudio_dispatch_duration_seconds", "endpoint" => endpoint.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_in_flight_delta(delta: f64) {
    gauge!("aistudio_dispatch_in_flight").increment(delta);
}

pub fn record_validation_reject(kind: &'static str) {
    counter!("aistudio_validation_rejects_total", "field_error" => kind).increment(1);
}
