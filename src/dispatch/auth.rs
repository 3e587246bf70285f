//! Endpoint credentials.

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header used by Azure-hosted deployments that take a raw key.
pub const API_KEY_HEADER: &str = "api-key";

/// How the token is presented to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `api-key: <token>`
    ApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidToken {
    #[error("auth token is empty")]
    Empty,
    #[error("auth token contains characters not allowed in an HTTP header")]
    BadCharacters,
}

/// An endpoint credential, ready to be attached to requests.
///
/// Debug and Display never show the token. The header value is marked
/// sensitive so the HTTP stack keeps it out of its own logs.
pub struct AuthToken {
    scheme: AuthScheme,
    value: HeaderValue,
}

impl AuthToken {
    pub fn new(scheme: AuthScheme, token: &str) -> Result<Self, InvalidToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InvalidToken::Empty);
        }

        let raw = match scheme {
            AuthScheme::Bearer => format!("Bearer {}", token),
            AuthScheme::ApiKey => token.to_string(),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| InvalidToken::BadCharacters)?;
        value.set_sensitive(true);

        Ok(Self { scheme, value })
    }

    pub fn bearer(token: &str) -> Result<Self, InvalidToken> {
        Self::new(AuthScheme::Bearer, token)
    }

    pub fn api_key(token: &str) -> Result<Self, InvalidToken> {
        Self::new(AuthScheme::ApiKey, token)
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Header name and value to attach to a request.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let name = match self.scheme {
            AuthScheme::Bearer => AUTHORIZATION,
            AuthScheme::ApiKey => HeaderName::from_static(API_KEY_HEADER),
        };
        (name, self.value.clone())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("scheme", &self.scheme)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
