//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (spans carrying session / correlation ids)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Session and correlation ids flow into every ingestion span
//! - Instrument initialization failure is fatal at startup

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::{Metrics, MetricsError};
