//! Request body validation.
//!
//! # Rules
//! - Required field absent → `MissingRequired`
//! - Field not declared → `UnknownField` (unless the policy allows them)
//! - Declared field with the wrong JSON type → `TypeMismatch`
//! - Declared field of the right type breaking a constraint → `ConstraintViolated`
//!
//! Every error is collected. Declared fields are reported in declaration
//! order, followed by unknown fields in body key order.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::request::body::{json_kind, RequestBody};
use crate::request::spec::{FieldType, RequestSpec};

/// What to do with body fields the `RequestSpec` does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    #[default]
    Reject,
    Allow,
}

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    MissingRequired,
    UnknownField,
    TypeMismatch {
        expected: FieldType,
        found: &'static str,
    },
    ConstraintViolated {
        reason: String,
    },
}

impl FieldErrorKind {
    /// Short label, suitable for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::MissingRequired => "missing_required",
            FieldErrorKind::UnknownField => "unknown_field",
            FieldErrorKind::TypeMismatch { .. } => "type_mismatch",
            FieldErrorKind::ConstraintViolated { .. } => "constraint_violated",
        }
    }
}

/// A field-level validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: &str, kind: FieldErrorKind) -> Self {
        Self {
            field: field.to_string(),
            kind,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::MissingRequired => write!(f, "'{}': required field is missing", self.field),
            FieldErrorKind::UnknownField => write!(f, "'{}': field is not declared", self.field),
            FieldErrorKind::TypeMismatch { expected, found } => {
                write!(f, "'{}': expected {}, got {}", self.field, expected, found)
            }
            FieldErrorKind::ConstraintViolated { reason } => write!(f, "'{}': {}", self.field, reason),
        }
    }
}

/// A body that passed validation. Only the validator can create one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedBody(RequestBody);

impl ValidatedBody {
    pub fn into_inner(self) -> RequestBody {
        self.0
    }
}

impl Deref for ValidatedBody {
    type Target = RequestBody;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Outcome of a validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(ValidatedBody),
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Field errors, empty when valid.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<ValidatedBody, Vec<FieldError>> {
        match self {
            ValidationResult::Valid(body) => Ok(body),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

/// Validates bodies against a [`RequestSpec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidator {
    unknown_fields: UnknownFieldPolicy,
}

impl RequestValidator {
    pub fn new(unknown_fields: UnknownFieldPolicy) -> Self {
        Self { unknown_fields }
    }

    /// Validator that ignores undeclared fields.
    pub fn permissive() -> Self {
        Self::new(UnknownFieldPolicy::Allow)
    }

    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    pub fn validate(&self, spec: &RequestSpec, body: RequestBody) -> ValidationResult {
        let mut errors = Vec::new();

        for (name, field) in spec.fields() {
            let Some(value) = body.get(name) else {
                if field.required {
                    errors.push(FieldError::new(name, FieldErrorKind::MissingRequired));
                }
                continue;
            };

            if !field.field_type.matches(value) {
                errors.push(FieldError::new(
                    name,
                    FieldErrorKind::TypeMismatch {
                        expected: field.field_type,
                        found: json_kind(value),
                    },
                ));
            } else if let Some(reason) = field.check_constraints(value) {
                errors.push(FieldError::new(name, FieldErrorKind::ConstraintViolated { reason }));
            }
        }

        if self.unknown_fields == UnknownFieldPolicy::Reject {
            errors.extend(
                body.fields()
                    .filter(|(name, _)| !spec.declares(name))
                    .map(|(name, _)| FieldError::new(name, FieldErrorKind::UnknownField)),
            );
        }

        if errors.is_empty() {
            ValidationResult::Valid(ValidatedBody(body))
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}

/// Validate with the default policy (unknown fields rejected).
pub fn validate(spec: &RequestSpec, body: RequestBody) -> ValidationResult {
    RequestValidator::default().validate(spec, body)
}
