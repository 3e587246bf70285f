//! Declarative request shapes.
//!
//! A [`RequestSpec`] lists the fields an endpoint accepts, in declaration
//! order. Specs are immutable once built; a malformed spec is a programming
//! error and is rejected by [`RequestSpecBuilder::build`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    /// Any JSON number, integral or not.
    Number,
    /// A JSON number without a fractional part (fits i64 or u64).
    Integer,
    Boolean,
    Array,
    Object,
    /// Anything except a missing field.
    Any,
}

impl FieldType {
    /// Check whether a JSON value has this type.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Text, Value::String(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Array, Value::Array(_)) => true,
            (FieldType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared shape of a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub required: bool,
    /// Maximum number of entries (arrays only).
    pub max_items: Option<usize>,
    /// Inclusive lower bound (numbers and integers only).
    pub min: Option<f64>,
    /// Inclusive upper bound (numbers and integers only).
    pub max: Option<f64>,
}

impl FieldSpec {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            max_items: None,
            min: None,
            max: None,
        }
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(field_type)
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Check constraints against a value already known to have the right type.
    ///
    /// Returns a description of the first broken constraint.
    pub(crate) fn check_constraints(&self, value: &Value) -> Option<String> {
        if let (Some(limit), Value::Array(items)) = (self.max_items, value) {
            if items.len() > limit {
                return Some(format!("at most {} items allowed, got {}", limit, items.len()));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    return Some(format!("value {} is below minimum {}", n, min));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Some(format!("value {} is above maximum {}", n, max));
                }
            }
        }

        None
    }
}

/// A malformed [`RequestSpec`] declaration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field '{field}': {constraint} does not apply to {field_type} fields")]
    ConstraintOnWrongType {
        field: String,
        constraint: &'static str,
        field_type: FieldType,
    },

    #[error("field '{field}': bounds must be finite")]
    NonFiniteBound { field: String },

    #[error("field '{field}': minimum {min} exceeds maximum {max}")]
    InvertedRange { field: String, min: f64, max: f64 },
}

/// Expected body shape for one endpoint kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    fields: Vec<(String, FieldSpec)>,
}

impl RequestSpec {
    pub fn builder() -> RequestSpecBuilder {
        RequestSpecBuilder::default()
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, spec)| spec)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`RequestSpec`].
#[derive(Debug, Default)]
pub struct RequestSpecBuilder {
    fields: Vec<(String, FieldSpec)>,
}

impl RequestSpecBuilder {
    pub fn required(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field(name, FieldSpec::required(field_type))
    }

    pub fn optional(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field(name, FieldSpec::optional(field_type))
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Check the declaration and freeze it.
    pub fn build(self) -> Result<RequestSpec, SpecError> {
        let mut seen = HashSet::new();

        for (name, spec) in &self.fields {
            if name.trim().is_empty() {
                return Err(SpecError::EmptyFieldName);
            }
            if !seen.insert(name.as_str()) {
                return Err(SpecError::DuplicateField(name.clone()));
            }
            check_field(name, spec)?;
        }

        Ok(RequestSpec {
            fields: self.fields,
        })
    }
}

fn check_field(name: &str, spec: &FieldSpec) -> Result<(), SpecError> {
    if spec.max_items.is_some() && spec.field_type != FieldType::Array {
        return Err(SpecError::ConstraintOnWrongType {
            field: name.to_string(),
            constraint: "max_items",
            field_type: spec.field_type,
        });
    }

    if spec.min.is_some() || spec.max.is_some() {
        if !spec.field_type.is_numeric() {
            return Err(SpecError::ConstraintOnWrongType {
                field: name.to_string(),
                constraint: "min/max",
                field_type: spec.field_type,
            });
        }
        if spec.min.iter().chain(spec.max.iter()).any(|b| !b.is_finite()) {
            return Err(SpecError::NonFiniteBound {
                field: name.to_string(),
            });
        }
        if let (Some(min), Some(max)) = (spec.min, spec.max) {
            if min > max {
                return Err(SpecError::InvertedRange {
                    field: name.to_string(),
                    min,
                    max,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let spec = RequestSpec::builder()
            .required("prompt", FieldType::Text)
            .optional("max_tokens", FieldType::Number)
            .build()
            .unwrap();

        let names: Vec<_> = spec.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["prompt", "max_tokens"]);
        assert_eq!(spec.required_fields().collect::<Vec<_>>(), vec!["prompt"]);
        assert!(spec.declares("max_tokens"));
        assert!(!spec.declares("temp"));
    }

    #[test]
    fn test_malformed_specs_fail_fast() {
        let dup = RequestSpec::builder()
            .required("prompt", FieldType::Text)
            .optional("prompt", FieldType::Text)
            .build();
        assert_eq!(dup, Err(SpecError::DuplicateField("prompt".into())));

        let empty = RequestSpec::builder().required("  ", FieldType::Text).build();
        assert_eq!(empty, Err(SpecError::EmptyFieldName));

        let wrong = RequestSpec::builder()
            .field("prompt", FieldSpec::required(FieldType::Text).with_max_items(4))
            .build();
        assert!(matches!(wrong, Err(SpecError::ConstraintOnWrongType { .. })));

        let inverted = RequestSpec::builder()
            .field("n", FieldSpec::optional(FieldType::Integer).with_range(Some(10.0), Some(1.0)))
            .build();
        assert!(matches!(inverted, Err(SpecError::InvertedRange { .. })));

        let infinite = RequestSpec::builder()
            .field("t", FieldSpec::optional(FieldType::Number).with_range(None, Some(f64::NAN)))
            .build();
        assert!(matches!(infinite, Err(SpecError::NonFiniteBound { .. })));
    }

    #[test]
    fn test_type_matching() {
        assert!(FieldType::Number.matches(&json!(5)));
        assert!(FieldType::Number.matches(&json!(0.5)));
        assert!(FieldType::Integer.matches(&json!(5)));
        assert!(!FieldType::Integer.matches(&json!(0.5)));
        assert!(!FieldType::Text.matches(&json!(5)));
        assert!(!FieldType::Text.matches(&json!(null)));
        assert!(FieldType::Any.matches(&json!(null)));
    }

    #[test]
    fn test_constraints() {
        let stop = FieldSpec::optional(FieldType::Array).with_max_items(4);
        assert!(stop.check_constraints(&json!(["a", "b"])).is_none());
        assert!(stop.check_constraints(&json!(["a", "b", "c", "d", "e"])).is_some());

        let n = FieldSpec::optional(FieldType::Integer).with_range(Some(1.0), Some(128.0));
        assert!(n.check_constraints(&json!(1)).is_none());
        assert!(n.check_constraints(&json!(128)).is_none());
        assert!(n.check_constraints(&json!(0)).is_some());
        assert!(n.check_constraints(&json!(129)).is_some());
    }
}
