//! Telemetry Relay Library
//!
//! A client that emits correlated events, metrics and spans, and the HTTP
//! relay that ingests them into Prometheus instruments and structured logs.

pub mod client;
pub mod config;
pub mod http;
pub mod identity;
pub mod ingest;
pub mod lifecycle;
pub mod observability;
pub mod record;

pub use client::{Span, TelemetryClient};
pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use identity::IdentityContext;
pub use lifecycle::Shutdown;
pub use record::{Event, EventPayload, Metric, MetricKind};
