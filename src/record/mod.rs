//! Record types shared by the client and the ingestion endpoint.
//!
//! # Data Flow
//! ```text
//! client::buffer builds Event / Metric
//!     → serialized to JSON by client::transport
//!     → decoded by ingest::{events, metrics}
//! ```

pub mod attributes;
pub mod event;
pub mod metric;

pub use attributes::{AttributeValue, Attributes};
pub use event::{Event, EventPayload};
pub use metric::{Metric, MetricKind};
