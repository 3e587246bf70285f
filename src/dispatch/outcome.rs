//! Dispatch outcomes and error taxonomy.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors a single dispatch can end with. None of them are retried here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Endpoint answered with a non-2xx status.
    #[error("endpoint returned HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// DNS, connect, TLS or IO failure before a full response arrived.
    #[error("transport error: {0}")]
    TransportError(String),

    /// No full response within the deadline; the request was abandoned.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// 2xx response whose body is not JSON.
    #[error("invalid response payload: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    pub fn tag(&self) -> OutcomeTag {
        match self {
            DispatchError::HttpError { .. } => OutcomeTag::HttpError,
            DispatchError::TransportError(_) => OutcomeTag::TransportError,
            DispatchError::Timeout(_) => OutcomeTag::Timeout,
            DispatchError::InvalidResponse(_) => OutcomeTag::InvalidResponse,
        }
    }

    /// Whether a caller-side retry could reasonably succeed.
    ///
    /// Throttling (429), unavailability (503), transport failures and
    /// timeouts qualify. The dispatcher itself never retries; payloads may
    /// not be idempotent.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::HttpError { status, .. } => matches!(status, 429 | 503),
            DispatchError::TransportError(_) | DispatchError::Timeout(_) => true,
            DispatchError::InvalidResponse(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome label shared by telemetry, metrics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    Success,
    HttpError,
    TransportError,
    Timeout,
    InvalidResponse,
}

impl OutcomeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeTag::Success => "success",
            OutcomeTag::HttpError => "http_error",
            OutcomeTag::TransportError => "transport_error",
            OutcomeTag::Timeout => "timeout",
            OutcomeTag::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one dispatch call.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Success {
        /// Parsed response body; `Null` when the endpoint sent no body.
        payload: Value,
        status: u16,
        latency: Duration,
    },
    Failure(DispatchError),
}

impl DispatchOutcome {
    pub fn tag(&self) -> OutcomeTag {
        match self {
            DispatchOutcome::Success { .. } => OutcomeTag::Success,
            DispatchOutcome::Failure(err) => err.tag(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }

    /// HTTP status, when the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchOutcome::Success { status, .. } => Some(*status),
            DispatchOutcome::Failure(err) => err.status(),
        }
    }

    pub fn into_result(self) -> Result<Value, DispatchError> {
        match self {
            DispatchOutcome::Success { payload, .. } => Ok(payload),
            DispatchOutcome::Failure(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_hints() {
        let throttled = DispatchError::HttpError {
            status: 429,
            body: String::new(),
        };
        let bad_request = DispatchError::HttpError {
            status: 400,
            body: String::new(),
        };
        assert!(throttled.is_retryable());
        assert!(!bad_request.is_retryable());
        assert!(DispatchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!DispatchError::InvalidResponse("eof".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250 ms");

        let err = DispatchError::HttpError {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.to_string(), "endpoint returned HTTP 503: busy");
    }

    #[test]
    fn test_outcome_tags() {
        let ok = DispatchOutcome::Success {
            payload: Value::Null,
            status: 200,
            latency: Duration::ZERO,
        };
        assert_eq!(ok.tag(), OutcomeTag::Success);
        assert_eq!(ok.status(), Some(200));

        let failed = DispatchOutcome::Failure(DispatchError::TransportError("refused".into()));
        assert_eq!(failed.tag().as_str(), "transport_error");
        assert_eq!(failed.status(), None);
    }
}
