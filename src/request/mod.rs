//! Request shape declaration and validation.
//!
//! # Data Flow
//! ```text
//! RequestSpec (built once per endpoint kind, fails fast when malformed)
//!     + RequestBody (caller-owned JSON object)
//!     → validator.rs (collects every field error)
//!     → ValidationResult::Valid(ValidatedBody) → dispatch
//!     → ValidationResult::Invalid(Vec<FieldError>) → back to caller
//! ```
//!
//! # Design Decisions
//! - Validation is a pure function; no network, no telemetry
//! - Errors are data, not `Err`; the caller gets every problem at once
//! - `ValidatedBody` can only be minted here, so the dispatcher cannot be
//!   handed an unchecked body

pub mod body;
pub mod spec;
pub mod validator;

pub use body::{NotAnObject, RequestBody};
pub use spec::{FieldSpec, FieldType, RequestSpec, RequestSpecBuilder, SpecError};
pub use validator::{
    validate, FieldError, FieldErrorKind, RequestValidator, UnknownFieldPolicy, ValidatedBody,
    ValidationResult,
};
