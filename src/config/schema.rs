//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::dispatch::AuthScheme;
use crate::request::{FieldSpec, FieldType, RequestSpec, SpecError, UnknownFieldPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// HTTP client settings shared by every endpoint.
    pub dispatch: DispatchConfig,

    /// Request validation policy.
    pub validation: ValidationConfig,

    /// Endpoint definitions.
    pub endpoints: Vec<EndpointConfig>,
}

impl ClientConfig {
    /// Find an endpoint definition by name.
    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info", "aistudio_requests=debug").
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Default deadline for a whole request in milliseconds.
    pub request_timeout_ms: u64,

    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,

    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 20_000,
            pool_max_idle_per_host: 8,
            user_agent: concat!("aistudio-requests/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Validation policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject or allow body fields the endpoint does not declare.
    pub unknown_fields: UnknownFieldPolicy,
}

/// A hosted endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Endpoint identifier used on the command line and in logs.
    pub name: String,

    /// Full request URL (http or https).
    pub url: String,

    /// How the token is presented.
    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Inline token. Mutually exclusive with `token_env`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Environment variable holding the token.
    #[serde(default)]
    pub token_env: Option<String>,

    /// Per-endpoint deadline; falls back to `dispatch.request_timeout_ms`.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Accepted body fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl EndpointConfig {
    /// Build the endpoint's request shape.
    pub fn request_spec(&self) -> Result<RequestSpec, SpecError> {
        self.fields
            .iter()
            .fold(RequestSpec::builder(), |builder, field| {
                builder.field(field.name.clone(), field.to_spec())
            })
            .build()
    }
}

/// One declared body field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Maximum entries for array fields.
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Inclusive lower bound for numeric fields.
    #[serde(default)]
    pub min: Option<f64>,

    /// Inclusive upper bound for numeric fields.
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldConfig {
    pub fn to_spec(&self) -> FieldSpec {
        FieldSpec {
            field_type: self.field_type,
            required: self.required,
            max_items: self.max_items,
            min: self.min,
            max: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.dispatch.request_timeout_ms, 20_000);
        assert_eq!(config.validation.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.dispatch.user_agent.starts_with("aistudio-requests/"));
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn test_endpoint_fields_become_spec() {
        let config: ClientConfig = toml::from_str(
            r#"
            [[endpoints]]
            name = "gpt4o"
            url = "https://example.com/chat"
            token = "abc"

            [[endpoints.fields]]
            name = "messages"
            type = "array"
            required = true
            max_items = 64

            [[endpoints.fields]]
            name = "n"
            type = "integer"
            min = 1
            max = 128
            "#,
        )
        .unwrap();

        let endpoint = config.endpoint("gpt4o").unwrap();
        assert_eq!(endpoint.auth_scheme, AuthScheme::Bearer);

        let spec = endpoint.request_spec().unwrap();
        assert_eq!(spec.len(), 2);
        assert!(spec.field("messages").unwrap().required);
        assert_eq!(spec.field("n").unwrap().max, Some(128.0));
    }
}
