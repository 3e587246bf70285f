//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / client produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!     → telemetry.rs (one TelemetryEvent per dispatch → TelemetrySink)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//!     → external monitoring exporter fed by a sink
//! ```
//!
//! # Design Decisions
//! - The monitoring backend is an external collaborator behind `TelemetrySink`
//! - Metric updates are no-ops until a recorder is installed
//! - Request ID flows from dispatch into logs, headers and telemetry

pub mod logging;
pub mod metrics;
pub mod telemetry;
