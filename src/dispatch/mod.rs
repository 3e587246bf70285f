//! Endpoint dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! ValidatedBody + Url + AuthToken + timeout
//!     → dispatcher.rs (POST JSON, deadline, classify)
//!     → DispatchOutcome (Success | Failure(DispatchError))
//!     → telemetry event (always, one per call)
//! ```
//!
//! # Design Decisions
//! - Only `ValidatedBody` can be dispatched
//! - No retries or backoff at this layer; callers decide
//! - Every call has a deadline; expiry abandons the request
//! - Tokens are redacted in Debug/Display and marked sensitive on the wire

pub mod auth;
pub mod dispatcher;
pub mod outcome;

pub use auth::{AuthScheme, AuthToken, InvalidToken};
pub use dispatcher::{endpoint_id, EndpointDispatcher, REQUEST_ID_HEADER};
pub use outcome::{DispatchError, DispatchOutcome, OutcomeTag};
