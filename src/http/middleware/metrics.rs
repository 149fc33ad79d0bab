//! Request counting and latency middleware.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;

use crate::observability::Metrics;

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Record `http_requests_total` and `http_request_duration_seconds`.
///
/// The path label is the route template, so label cardinality stays bounded
/// by the route table rather than by what clients send.
pub async fn track_requests(
    State(metrics): State<Metrics>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(req).await;

    metrics.record_request(method.as_str(), &path, response.status().as_u16(), start);
    response
}
