//! `POST /api/telemetry/events`

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdentity;
use crate::http::server::AppState;
use crate::ingest::business::{GameSignal, SignalValue};
use crate::ingest::{bad_request, received};
use crate::observability::tracing::{client_event_span, record_failure};
use crate::record::Event;

pub async fn ingest_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let span = client_event_span();
    span.in_scope(|| process_event(&state, &span, &headers, &body))
}

fn process_event(
    state: &AppState,
    span: &tracing::Span,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let event: Event = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(e) => {
            record_failure(span, "Failed to unmarshal client event", &e);
            tracing::error!(error = %e, body_len = body.len(), "Failed to unmarshal client event");
            return bad_request();
        }
    };

    let identity =
        RequestIdentity::resolve(headers, &event.session_id, Some(&event.correlation_id));

    span.record("client.event_type", event.event_type.as_str());
    span.record("client.session_id", identity.session_id.as_str());
    span.record("client.correlation_id", identity.correlation_id.as_str());
    if let Some(level) = event.level {
        span.record("client.event.level", level);
    }
    if let Some(score) = event.score {
        span.record("client.event.score", score);
    }

    tracing::info!(
        event_type = %event.event_type,
        session_id = %identity.session_id,
        correlation_id = %identity.correlation_id,
        level = ?event.level,
        score = ?event.score,
        data = ?event.data,
        trace_id = ?event.trace_id,
        span_id = ?event.span_id,
        client_timestamp = %event.timestamp.to_rfc3339(),
        "Client telemetry event received"
    );

    state.metrics.record_client_event(&event.event_type, &identity.session_id);
    apply_business_metric(state, span, &identity, &event);

    (StatusCode::OK, received()).into_response()
}

fn apply_business_metric(
    state: &AppState,
    span: &tracing::Span,
    identity: &RequestIdentity,
    event: &Event,
) {
    let Some(signal) = GameSignal::from_event_type(&event.event_type) else {
        return;
    };

    match signal.value(event) {
        SignalValue::Record(value) => {
            state
                .metrics
                .record_game_metric(signal.metric_type(), &identity.session_id, None, value);
        }
        SignalValue::Missing(field) => {
            record_failure(span, "Business metric skipped", &format!("event has no {}", field));
            tracing::warn!(
                event_type = %event.event_type,
                session_id = %identity.session_id,
                missing = field,
                "Business metric skipped"
            );
        }
    }
}
