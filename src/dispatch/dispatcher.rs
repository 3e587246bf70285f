//! HTTPS dispatch of validated request bodies.
//!
//! # Responsibilities
//! - POST the body as JSON with auth and request-id headers
//! - Enforce the per-call deadline over the whole exchange
//! - Classify the result (success, HTTP error, transport error, timeout)
//! - Emit exactly one telemetry event per call

use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::dispatch::auth::AuthToken;
use crate::dispatch::outcome::{DispatchError, DispatchOutcome};
use crate::observability::metrics;
use crate::observability::telemetry::{TelemetryEvent, TelemetrySink};
use crate::request::ValidatedBody;

/// Header carrying the per-call correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sends validated bodies to endpoints.
///
/// Cheap to clone; clones share the connection pool, the telemetry sink and
/// the in-flight counter. Safe to call concurrently.
#[derive(Clone)]
pub struct EndpointDispatcher {
    client: Client,
    sink: Arc<dyn TelemetrySink>,
    in_flight: Arc<AtomicUsize>,
}

impl EndpointDispatcher {
    /// Build a dispatcher with its own connection pool.
    pub fn new(config: &DispatchConfig, sink: Arc<dyn TelemetrySink>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(client, sink))
    }

    /// Wrap an existing HTTP client.
    pub fn with_client(client: Client, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            client,
            sink,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of dispatch calls currently holding a request open.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// POST `body` to `url`.
    ///
    /// The body is not re-validated. `timeout` covers connecting, sending
    /// and reading the full response; on expiry the request future is
    /// dropped, which releases its connection.
    pub async fn dispatch(
        &self,
        url: &Url,
        token: &AuthToken,
        body: &ValidatedBody,
        timeout_duration: Duration,
    ) -> DispatchOutcome {
        let request_id = Uuid::new_v4();
        let endpoint = endpoint_id(url);

        tracing::debug!(
            request_id = %request_id,
            endpoint = %endpoint,
            fields = body.len(),
            timeout_ms = timeout_duration.as_millis() as u64,
            "Dispatching request"
        );

        let start = Instant::now();
        let result = {
            let _guard = InFlightGuard::acquire(&self.in_flight);
            match timeout(timeout_duration, self.send(url, token, body, request_id)).await {
                Ok(result) => result,
                Err(_) => Err(DispatchError::Timeout(timeout_duration)),
            }
        };
        let latency = start.elapsed();

        let outcome = match result {
            Ok((status, payload)) => DispatchOutcome::Success {
                payload,
                status,
                latency,
            },
            Err(err) => DispatchOutcome::Failure(err),
        };

        match &outcome {
            DispatchOutcome::Success { status, .. } => tracing::info!(
                request_id = %request_id,
                endpoint = %endpoint,
                status = *status,
                latency_ms = latency.as_millis() as u64,
                "Request successful"
            ),
            DispatchOutcome::Failure(err) => tracing::warn!(
                request_id = %request_id,
                endpoint = %endpoint,
                outcome = %err.tag(),
                retryable = err.is_retryable(),
                latency_ms = latency.as_millis() as u64,
                error = %err,
                "Request failed"
            ),
        }

        self.sink.emit(&TelemetryEvent::new(endpoint, &outcome, latency, request_id));
        outcome
    }

    async fn send(
        &self,
        url: &Url,
        token: &AuthToken,
        body: &ValidatedBody,
        request_id: Uuid,
    ) -> Result<(u16, Value), DispatchError> {
        let (auth_name, auth_value) = token.header();

        let response = self
            .client
            .post(url.clone())
            .header(auth_name, auth_value)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(DispatchError::HttpError {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| DispatchError::InvalidResponse(e.to_string()))?
        };

        Ok((status.as_u16(), payload))
    }
}

/// Stable endpoint label for logs and telemetry: host, port and path.
///
/// The query string is left out; Azure deployments carry versions and
/// sometimes keys there.
pub fn endpoint_id(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown");
    match url.port() {
        Some(port) => format!("{}:{}{}", host, port, url.path()),
        None => format!("{}{}", host, url.path()),
    }
}

fn transport_error(err: reqwest::Error) -> DispatchError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    DispatchError::TransportError(message)
}

/// Tracks one open request; decrements on every exit path.
struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        metrics::record_in_flight_delta(1.0);
        Self {
            counter: counter.clone(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
        metrics::record_in_flight_delta(-1.0);
    }
}
