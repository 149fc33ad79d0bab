//! Cross-cutting request middleware.

pub mod cors;
pub mod metrics;

pub use cors::cors;
pub use self::metrics::track_requests;
