//! Endpoint client: one configured endpoint bound to a dispatcher.
//!
//! `send` validates first and only dispatches a valid body; a rejected body
//! never reaches the network and produces no telemetry event.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::{ClientConfig, ConfigError, DispatchConfig, EndpointConfig};
use crate::dispatch::{AuthToken, DispatchOutcome, EndpointDispatcher};
use crate::observability::metrics;
use crate::request::{FieldError, RequestBody, RequestSpec, RequestValidator, ValidationResult};

/// A resolved endpoint: URL parsed, token loaded, request shape built.
#[derive(Debug)]
pub struct Endpoint {
    pub name: String,
    pub url: Url,
    pub token: AuthToken,
    pub timeout: Duration,
    pub spec: RequestSpec,
}

impl Endpoint {
    /// Resolve an endpoint definition. `token_env` is read from the
    /// environment here, once.
    pub fn from_config(config: &EndpointConfig, dispatch: &DispatchConfig) -> Result<Self, ConfigError> {
        let url = Url::parse(&config.url).map_err(|source| ConfigError::Url {
            endpoint: config.name.clone(),
            source,
        })?;

        let raw_token = match (&config.token, &config.token_env) {
            (Some(token), _) => token.clone(),
            (None, Some(var)) => env::var(var).map_err(|_| ConfigError::MissingEnv {
                endpoint: config.name.clone(),
                var: var.clone(),
            })?,
            (None, None) => String::new(),
        };
        let token = AuthToken::new(config.auth_scheme, &raw_token).map_err(|source| ConfigError::Token {
            endpoint: config.name.clone(),
            source,
        })?;

        let spec = config.request_spec().map_err(|source| ConfigError::Spec {
            endpoint: config.name.clone(),
            source,
        })?;

        let timeout = Duration::from_millis(config.timeout_ms.unwrap_or(dispatch.request_timeout_ms));

        Ok(Self {
            name: config.name.clone(),
            url,
            token,
            timeout,
            spec,
        })
    }
}

impl ClientConfig {
    /// Resolve every configured endpoint, in declaration order.
    ///
    /// Fails on the first endpoint that cannot be resolved, so a missing
    /// `token_env` variable surfaces at startup rather than on first send.
    pub fn resolve_endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        self.endpoints
            .iter()
            .map(|endpoint| Endpoint::from_config(endpoint, &self.dispatch))
            .collect()
    }
}

/// Result of [`EndpointClient::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Body failed validation; nothing was sent.
    Rejected(Vec<FieldError>),
    /// Body was valid and dispatched.
    Dispatched(DispatchOutcome),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Dispatched(outcome) if outcome.is_success())
    }
}

/// Validates and sends bodies to one endpoint.
#[derive(Clone)]
pub struct EndpointClient {
    endpoint: Arc<Endpoint>,
    dispatcher: EndpointDispatcher,
    validator: RequestValidator,
}

impl EndpointClient {
    pub fn new(endpoint: Endpoint, dispatcher: EndpointDispatcher, validator: RequestValidator) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            dispatcher,
            validator,
        }
    }

    /// Take the named endpoint out of an already resolved set.
    pub fn from_resolved(
        config: &ClientConfig,
        endpoints: Vec<Endpoint>,
        name: &str,
        dispatcher: EndpointDispatcher,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoints
            .into_iter()
            .find(|endpoint| endpoint.name == name)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))?;
        let validator = RequestValidator::new(config.validation.unknown_fields);
        Ok(Self::new(endpoint, dispatcher, validator))
    }

    /// Build a client for the named endpoint of a loaded configuration.
    pub fn from_config(
        config: &ClientConfig,
        name: &str,
        dispatcher: EndpointDispatcher,
    ) -> Result<Self, ConfigError> {
        let endpoint_config = config
            .endpoint(name)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))?;
        let endpoint = Endpoint::from_config(endpoint_config, &config.dispatch)?;
        let validator = RequestValidator::new(config.validation.unknown_fields);

        tracing::debug!(
            endpoint = %endpoint.name,
            fields = endpoint.spec.len(),
            timeout_ms = endpoint.timeout.as_millis() as u64,
            "Endpoint client ready"
        );
        Ok(Self::new(endpoint, dispatcher, validator))
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn dispatcher(&self) -> &EndpointDispatcher {
        &self.dispatcher
    }

    /// Validate a body against this endpoint's spec without sending it.
    pub fn validate(&self, body: RequestBody) -> ValidationResult {
        self.validator.validate(&self.endpoint.spec, body)
    }

    /// Validate, then dispatch if valid.
    pub async fn send(&self, body: RequestBody) -> SendOutcome {
        let valid = match self.validate(body) {
            ValidationResult::Valid(valid) => valid,
            ValidationResult::Invalid(errors) => {
                for error in &errors {
                    metrics::record_validation_reject(error.kind.as_str());
                }
                tracing::debug!(
                    endpoint = %self.endpoint.name,
                    errors = errors.len(),
                    first = %errors[0],
                    "Request body rejected"
                );
                return SendOutcome::Rejected(errors);
            }
        };

        let outcome = self
            .dispatcher
            .dispatch(&self.endpoint.url, &self.endpoint.token, &valid, self.endpoint.timeout)
            .await;
        SendOutcome::Dispatched(outcome)
    }
}
