//! `POST /api/telemetry/metrics`

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdentity;
use crate::http::server::AppState;
use crate::ingest::{bad_request, received};
use crate::observability::tracing::{client_metric_span, record_failure};
use crate::record::{Metric, MetricKind};

/// `source` label attached to gauges fed by client metrics.
pub const CLIENT_SOURCE: &str = "client";

pub async fn ingest_metric(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let span = client_metric_span();
    span.in_scope(|| process_metric(&state, &span, &headers, &body))
}

fn process_metric(
    state: &AppState,
    span: &tracing::Span,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let metric: Metric = match serde_json::from_slice(body) {
        Ok(metric) => metric,
        Err(e) => {
            record_failure(span, "Failed to unmarshal client metric", &e);
            tracing::error!(error = %e, body_len = body.len(), "Failed to unmarshal client metric");
            return bad_request();
        }
    };

    let identity = RequestIdentity::resolve(headers, &metric.session_id, None);

    span.record("client.metric.name", metric.name.as_str());
    span.record("client.metric.kind", metric.kind.as_str());
    span.record("client.metric.value", metric.value);
    span.record("client.session_id", identity.session_id.as_str());
    span.record("client.correlation_id", identity.correlation_id.as_str());

    tracing::info!(
        metric_name = %metric.name,
        metric_type = %metric.kind,
        metric_value = metric.value,
        session_id = %identity.session_id,
        correlation_id = %identity.correlation_id,
        client_timestamp = %metric.timestamp.to_rfc3339(),
        "Client telemetry metric received"
    );

    state.metrics.record_client_metric(metric.kind);
    state
        .metrics
        .record_game_metric(&metric.name, &identity.session_id, Some(CLIENT_SOURCE), metric.value);
    match metric.kind {
        MetricKind::Histogram => {
            state
                .metrics
                .record_game_observation(&metric.name, &identity.session_id, metric.value);
        }
        // Client counters arrive as running totals, so last-write-wins is the merge.
        MetricKind::Counter | MetricKind::Gauge => {}
    }

    (StatusCode::OK, received()).into_response()
}
