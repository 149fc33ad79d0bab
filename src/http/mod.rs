//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, optional static mount)
//!     → middleware/ (request metrics, CORS preflight)
//!     → request.rs (identity headers)
//!     → ingest:: handlers | health.rs | metrics exposition
//!     → Send to client
//! ```

pub mod health;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestIdentity, X_CORRELATION_ID, X_SESSION_ID};
pub use server::{AppState, HttpServer};
