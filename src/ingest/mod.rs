//! Ingestion endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/telemetry/{events,metrics}
//!     → decode body (failure: 400, nothing recorded)
//!     → http::request (identity from X-Session-ID / X-Correlation-ID)
//!     → observability::tracing (span per record)
//!     → structured log line
//!     → observability::metrics (ingestion counter)
//!     → business.rs (event type → game_metrics gauge)
//!     → 200 {"status":"received"}
//! ```
//!
//! # Design Decisions
//! - Once decoding succeeds the response is always 200
//! - No cross-request state beyond the shared instruments
//! - Arrival order is not assumed to match emission order

pub mod business;
pub mod events;
pub mod metrics;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub use events::ingest_event;
pub use self::metrics::ingest_metric;

/// Acknowledgement body for accepted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
}

pub(crate) fn received() -> Json<Ack> {
    Json(Ack {
        status: "received".to_string(),
    })
}

pub(crate) fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}
