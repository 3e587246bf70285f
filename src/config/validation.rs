//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check endpoints (unique names, usable URLs, one token source)
//! - Check declared fields build into a request spec
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{ClientConfig, EndpointConfig};

/// A semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted location of the offending value.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.dispatch.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("dispatch.connect_timeout_ms", "must be greater than 0"));
    }
    if config.dispatch.request_timeout_ms == 0 {
        errors.push(ValidationError::new("dispatch.request_timeout_ms", "must be greater than 0"));
    }
    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::new("observability.log_level", "must not be empty"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let mut names = HashSet::new();
    for (i, endpoint) in config.endpoints.iter().enumerate() {
        let path = format!("endpoints[{}]", i);
        if !endpoint.name.is_empty() && !names.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", path),
                format!("duplicate endpoint name '{}'", endpoint.name),
            ));
        }
        validate_endpoint(&path, endpoint, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoint(path: &str, endpoint: &EndpointConfig, errors: &mut Vec<ValidationError>) {
    if endpoint.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.name", path), "must not be empty"));
    }

    match Url::parse(&endpoint.url) {
        Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {}
        Ok(url) => errors.push(ValidationError::new(
            format!("{}.url", path),
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            format!("{}.url", path),
            format!("'{}' is not a valid URL: {}", endpoint.url, e),
        )),
    }

    match (&endpoint.token, &endpoint.token_env) {
        (Some(_), Some(_)) => errors.push(ValidationError::new(
            path,
            "set either token or token_env, not both",
        )),
        (None, None) => errors.push(ValidationError::new(path, "one of token or token_env is required")),
        (Some(token), None) if token.trim().is_empty() => {
            errors.push(ValidationError::new(format!("{}.token", path), "must not be empty"))
        }
        (None, Some(var)) if var.trim().is_empty() => {
            errors.push(ValidationError::new(format!("{}.token_env", path), "must not be empty"))
        }
        _ => {}
    }

    if endpoint.timeout_ms == Some(0) {
        errors.push(ValidationError::new(format!("{}.timeout_ms", path), "must be greater than 0"));
    }

    if let Err(e) = endpoint.request_spec() {
        errors.push(ValidationError::new(format!("{}.fields", path), e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FieldConfig;
    use crate::request::FieldType;

    fn endpoint(name: &str) -> EndpointConfig {
        EndpointConfig {
            name: name.to_string(),
            url: "https://example.com/score".to_string(),
            auth_scheme: Default::default(),
            token: Some("secret".to_string()),
            token_env: None,
            timeout_ms: None,
            fields: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.dispatch.request_timeout_ms = 0;

        let mut bad_url = endpoint("a");
        bad_url.url = "ftp://example.com".to_string();
        let mut no_token = endpoint("a");
        no_token.token = None;
        config.endpoints = vec![bad_url, no_token];

        let errors = validate_config(&config).unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "dispatch.request_timeout_ms",
                "endpoints[0].url",
                "endpoints[1].name",
                "endpoints[1]",
            ]
        );
    }

    #[test]
    fn test_malformed_fields_are_reported() {
        let mut config = ClientConfig::default();
        let mut ep = endpoint("a");
        let field = FieldConfig {
            name: "prompt".to_string(),
            field_type: FieldType::Text,
            required: true,
            max_items: None,
            min: None,
            max: None,
        };
        ep.fields = vec![field.clone(), field];
        config.endpoints.push(ep);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "endpoints[0].fields: field 'prompt' is declared more than once");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ClientConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }
}
