//! Identity carried on inbound telemetry requests.
//!
//! # Responsibilities
//! - Name the identity propagation headers shared with the client transport
//! - Recover session / correlation ids from an inbound request
//!
//! # Design Decisions
//! - Headers are authoritative over ids embedded in the body
//! - A missing or non-UTF-8 header falls back to the body's value

use axum::http::HeaderMap;

/// Header carrying the emitting client's session id.
pub const X_SESSION_ID: &str = "x-session-id";

/// Header carrying the correlation id active when the record was emitted.
pub const X_CORRELATION_ID: &str = "x-correlation-id";

/// Correlation value used when neither header nor body provides one.
pub const UNKNOWN_CORRELATION: &str = "unknown";

/// Identity attributed to one ingested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub session_id: String,
    pub correlation_id: String,
}

impl RequestIdentity {
    /// Resolve identity from headers, falling back to body-supplied values.
    pub fn resolve(
        headers: &HeaderMap,
        body_session: &str,
        body_correlation: Option<&str>,
    ) -> Self {
        let session_id = header_value(headers, X_SESSION_ID).unwrap_or(body_session);
        let correlation_id = header_value(headers, X_CORRELATION_ID)
            .or(body_correlation)
            .unwrap_or(UNKNOWN_CORRELATION);

        Self {
            session_id: session_id.to_string(),
            correlation_id: correlation_id.to_string(),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
