//! Server-side spans for ingested records.
//!
//! # Responsibilities
//! - Create one span per processed record with its correlation fields
//! - Mark spans as failed when processing goes wrong
//!
//! Fields are declared empty up front and filled with `Span::record` once
//! the record is decoded.

use std::fmt::Display;
use tracing::field::Empty;
use tracing::Span;

/// Span covering one inbound client event.
pub fn client_event_span() -> Span {
    tracing::info_span!(
        "process_client_telemetry_event",
        client.event_type = Empty,
        client.session_id = Empty,
        client.correlation_id = Empty,
        client.event.level = Empty,
        client.event.score = Empty,
        otel.status_code = Empty,
        error = Empty,
    )
}

/// Span covering one inbound client metric.
pub fn client_metric_span() -> Span {
    tracing::info_span!(
        "process_client_telemetry_metric",
        client.metric.name = Empty,
        client.metric.kind = Empty,
        client.metric.value = Empty,
        client.session_id = Empty,
        client.correlation_id = Empty,
        otel.status_code = Empty,
        error = Empty,
    )
}

/// Span covering one health check.
pub fn health_check_span() -> Span {
    tracing::info_span!("health_check", health.status = Empty, health.service = Empty)
}

/// Mark `span` as failed with the given message and cause.
pub fn record_failure(span: &Span, message: &str, cause: &dyn Display) {
    span.record("otel.status_code", "ERROR");
    span.record("error", tracing::field::display(format!("{}: {}", message, cause)));
}
