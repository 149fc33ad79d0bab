//! Best-effort delivery of records to the collecting service.
//!
//! # Responsibilities
//! - Serialize a record to JSON
//! - POST it to `server_url + endpoint` with identity headers
//! - Run detached from the caller; failures are logged and the record dropped
//!
//! # Design Decisions
//! - No retry, no backoff, no queue beyond reqwest's own connection pool
//! - Without a Tokio runtime the record is dropped with a warning

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::http::request::{X_CORRELATION_ID, X_SESSION_ID};
use crate::identity::IdentitySnapshot;

/// Ingestion endpoints on the collecting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Events,
    Metrics,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Events => "/api/telemetry/events",
            Endpoint::Metrics => "/api/telemetry/metrics",
        }
    }
}

/// Errors raised while building a transport or encoding a record.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sink for encoded records.
///
/// `send` must return immediately; delivery happens elsewhere.
pub trait Transport: Send + Sync {
    fn send(&self, endpoint: Endpoint, body: Vec<u8>, identity: IdentitySnapshot);

    /// Number of sends started but not yet finished.
    fn pending(&self) -> usize {
        0
    }
}

/// Encode a record for the wire.
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(record)?)
}

/// Fire-and-forget HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    events_url: Url,
    metrics_url: Url,
    in_flight: Arc<AtomicUsize>,
}

impl HttpTransport {
    /// Build a transport targeting `server_url` (scheme and authority, optional base path).
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let invalid = |reason: String| TransportError::InvalidUrl {
            url: server_url.to_string(),
            reason,
        };

        let base = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        let root = server_url.trim_end_matches('/');
        let events_url = Url::parse(&format!("{}{}", root, Endpoint::Events.path()))
            .map_err(|e| invalid(e.to_string()))?;
        let metrics_url = Url::parse(&format!("{}{}", root, Endpoint::Metrics.path()))
            .map_err(|e| invalid(e.to_string()))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            events_url,
            metrics_url,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn url_for(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Events => &self.events_url,
            Endpoint::Metrics => &self.metrics_url,
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: Endpoint, body: Vec<u8>, identity: IdentitySnapshot) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    endpoint = endpoint.path(),
                    "No async runtime available, dropping telemetry record"
                );
                return;
            }
        };

        let url = self.url_for(endpoint).clone();
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(X_SESSION_ID, identity.session_id)
            .header(X_CORRELATION_ID, identity.correlation_id)
            .body(body);

        let in_flight = InFlight::enter(&self.in_flight);
        runtime.spawn(async move {
            let _in_flight = in_flight;
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::trace!(url = %url, "Telemetry record delivered");
                }
                Ok(response) => {
                    tracing::warn!(
                        url = %url,
                        status = %response.status(),
                        "Telemetry record rejected"
                    );
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to send telemetry");
                }
            }
        });
    }

    fn pending(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Keeps the in-flight count accurate even if the send task panics.
struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self {
            counter: counter.clone(),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
