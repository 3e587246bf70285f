//! Validated request dispatch for hosted model endpoints.
//!
//! ```text
//! RequestBody ──▶ request::validate ──▶ Valid(ValidatedBody) ──▶ dispatch ──▶ DispatchOutcome
//!                         │                                         │
//!                         ▼                                         ▼
//!               Invalid(Vec<FieldError>)                    TelemetryEvent → TelemetrySink
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod prompt;
pub mod request;

pub use client::{Endpoint, EndpointClient, SendOutcome};
pub use config::ClientConfig;
pub use dispatch::{AuthToken, DispatchError, DispatchOutcome, EndpointDispatcher};
pub use observability::telemetry::{TelemetryEvent, TelemetrySink};
pub use request::{validate, FieldType, RequestBody, RequestSpec, ValidationResult};
