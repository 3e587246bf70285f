//! Per-dispatch telemetry events and the sinks that receive them.
//!
//! The monitoring system (Azure Monitor or anything else) is not wired
//! here. It plugs in by implementing [`TelemetrySink`], or by draining the
//! receiver of a [`ChannelSink`] from its own exporter task.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::dispatch::{DispatchOutcome, OutcomeTag};
use crate::observability::metrics;

/// Structured record of one dispatch call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub endpoint: String,
    pub outcome: OutcomeTag,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub request_id: Uuid,
}

impl TelemetryEvent {
    pub fn new(endpoint: String, outcome: &DispatchOutcome, latency: Duration, request_id: Uuid) -> Self {
        Self {
            endpoint,
            outcome: outcome.tag(),
            latency_ms: latency.as_millis() as u64,
            status: outcome.status(),
            request_id,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Receives telemetry events. Called once per dispatch, on the dispatching
/// task, so implementations must not block.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &TelemetryEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, _event: &TelemetryEvent) {}
}

/// Writes each event as a structured log line on the `telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&self, event: &TelemetryEvent) {
        tracing::info!(
            target: "telemetry",
            endpoint = %event.endpoint,
            outcome = %event.outcome,
            latency_ms = event.latency_ms,
            status = ?event.status,
            request_id = %event.request_id,
            "dispatch"
        );
    }
}

/// Feeds events into the installed `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSink;

impl TelemetrySink for MetricsSink {
    fn emit(&self, event: &TelemetryEvent) {
        metrics::record_dispatch(&event.endpoint, event.outcome, event.latency());
    }
}

/// Forwards events over an unbounded channel to an exporter task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TelemetryEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the exporter should drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelSink {
    fn emit(&self, event: &TelemetryEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(request_id = %event.request_id, "Telemetry receiver dropped, event discarded");
        }
    }
}

/// Sends every event to each inner sink, in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetrySink for FanoutSink {
    fn emit(&self, event: &TelemetryEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchError;
    use serde_json::json;

    fn timeout_event() -> TelemetryEvent {
        let outcome = DispatchOutcome::Failure(DispatchError::Timeout(Duration::from_millis(100)));
        TelemetryEvent::new(
            "example.com/score".into(),
            &outcome,
            Duration::from_millis(101),
            Uuid::nil(),
        )
    }

    #[test]
    fn test_event_shape() {
        let value = serde_json::to_value(timeout_event()).unwrap();
        assert_eq!(
            value,
            json!({
                "endpoint": "example.com/score",
                "outcome": "timeout",
                "latency_ms": 101,
                "request_id": "00000000-0000-0000-0000-000000000000",
            })
        );
    }

    #[tokio::test]
    async fn test_fanout_reaches_every_sink() {
        let (first, mut first_rx) = ChannelSink::new();
        let (second, mut second_rx) = ChannelSink::new();
        let fanout = FanoutSink::new()
            .with(Arc::new(first))
            .with(Arc::new(NoopSink))
            .with(Arc::new(second));
        assert_eq!(fanout.len(), 3);

        fanout.emit(&timeout_event());

        assert_eq!(first_rx.recv().await.unwrap().outcome, OutcomeTag::Timeout);
        assert_eq!(second_rx.recv().await.unwrap().latency_ms, 101);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(&timeout_event());
    }
}
