//! `GET /health`

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::observability::tracing::health_check_span;

pub const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
}

pub async fn health_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<HealthResponse> {
    let span = health_check_span();
    span.in_scope(|| report(&state, &span, &headers))
}

fn report(state: &AppState, span: &tracing::Span, headers: &HeaderMap) -> Json<HealthResponse> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    tracing::info!(user_agent = %user_agent, "Health check requested");
    state.metrics.record_health_check();

    span.record("health.status", HEALTHY);
    span.record("health.service", &*state.service_name);

    Json(HealthResponse {
        status: HEALTHY.to_string(),
        timestamp: Utc::now(),
        service: state.service_name.to_string(),
    })
}
