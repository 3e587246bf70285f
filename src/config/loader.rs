//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::dispatch::InvalidToken;
use crate::request::SpecError;

/// Error type for configuration loading and endpoint resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("endpoint '{0}' is not configured")]
    UnknownEndpoint(String),

    #[error("endpoint '{endpoint}': environment variable {var} is not set")]
    MissingEnv { endpoint: String, var: String },

    #[error("endpoint '{endpoint}': {source}")]
    Token {
        endpoint: String,
        #[source]
        source: InvalidToken,
    },

    #[error("endpoint '{endpoint}': {source}")]
    Spec {
        endpoint: String,
        #[source]
        source: SpecError,
    },

    #[error("endpoint '{endpoint}': invalid URL: {source}")]
    Url {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(
        path = %path.display(),
        endpoints = config.endpoints.len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config(
            r#"
            [validation]
            unknown_fields = "allow"

            [[endpoints]]
            name = "llama"
            url = "https://llama.example.com/score"
            auth_scheme = "api_key"
            token_env = "LLAMA_KEY"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.endpoints[0].token_env.as_deref(), Some("LLAMA_KEY"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(include_str!("../../aistudio.example.toml")).unwrap();
        let spec = config.endpoint("gpt4o").unwrap().request_spec().unwrap();
        assert_eq!(spec.required_fields().collect::<Vec<_>>(), vec!["messages"]);
        assert_eq!(spec.field("stop").unwrap().max_items, Some(4));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[dispatch\nconnect_timeout_ms = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_everything() {
        let err = parse_config(
            r#"
            [dispatch]
            connect_timeout_ms = 0
            request_timeout_ms = 0
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: dispatch.connect_timeout_ms: must be greater than 0, \
             dispatch.request_timeout_ms: must be greater than 0"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/aistudio.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
