//! Identity subsystem.
//!
//! # Data Flow
//! ```text
//! Client startup:
//!     generator.rs (session + correlation ids)
//!     → context.rs (IdentityContext, owned by the client handle)
//!     → stamped onto every Event/Metric
//!     → propagated as X-Session-ID / X-Correlation-ID headers
//!
//! Span start:
//!     generator.rs (fresh trace + span ids)
//! ```
//!
//! # Design Decisions
//! - Identifiers come from the OS random source when it is available
//! - Generation never fails: a timestamp-derived fallback is always there
//! - Identity is an explicit value passed around, never a process global

pub mod context;
pub mod generator;

pub use context::{IdentityContext, IdentitySnapshot};
pub use generator::{new_correlation_id, new_session_id, new_span_id, new_trace_id};
