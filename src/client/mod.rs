//! Client-side telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! Observed system
//!     → buffer.rs (record_event / record_metric, stamped with identity)
//!     → span.rs (start_span → set_attribute → end → one `span` event)
//!     → transport.rs (JSON + identity headers, detached POST)
//!     → /api/telemetry/{events,metrics}
//! ```
//!
//! # Design Decisions
//! - Emission never blocks and never fails the caller
//! - No ordering guarantee between emission and arrival
//! - Local buffer is bounded and evicts the oldest event

pub mod buffer;
pub mod span;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::identity::IdentityContext;

pub use buffer::TelemetryClient;
pub use span::{Span, SpanError};
pub use transport::{Endpoint, HttpTransport, Transport, TransportError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl TelemetryClient {
    /// Build a client with fresh identity and an HTTP transport.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(
            &config.server_url,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        Ok(Self::new(IdentityContext::new(), Arc::new(transport), config.buffer_capacity))
    }
}
