//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities > 0)
//! - Validate addresses, URLs and paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// Routes the relay always serves.
const RESERVED_PATHS: [&str; 3] = ["/health", "/api/telemetry/events", "/api/telemetry/metrics"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("{field} must start with '/' (got '{value}')")]
    RoutePath { field: &'static str, value: String },

    #[error("assets.mount_path must name a sub-path, not the root")]
    RootMount,

    #[error("{field} '{value}' collides with a built-in route")]
    ReservedPath { field: &'static str, value: String },

    #[error("observability.duration_buckets must be non-empty and strictly increasing")]
    Buckets,

    #[error("observability.upkeep_interval_secs must be greater than zero")]
    ZeroUpkeepInterval,

    #[error("client.server_url '{0}' is not an http(s) URL")]
    ServerUrl(String),

    #[error("client.buffer_capacity must be greater than zero")]
    ZeroBufferCapacity,

    #[error("service.name must not be empty")]
    EmptyServiceName,
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if !config.assets.mount_path.starts_with('/') {
        errors.push(ValidationError::RoutePath {
            field: "assets.mount_path",
            value: config.assets.mount_path.clone(),
        });
    }

    if config.assets.mount_path == "/" {
        errors.push(ValidationError::RootMount);
    }

    for (field, value) in [
        ("assets.mount_path", &config.assets.mount_path),
        ("observability.metrics_path", &config.observability.metrics_path),
    ] {
        if RESERVED_PATHS.iter().any(|reserved| shadows(value, reserved)) {
            errors.push(ValidationError::ReservedPath {
                field,
                value: value.clone(),
            });
        }
    }

    if !config.observability.metrics_path.starts_with('/') {
        errors.push(ValidationError::RoutePath {
            field: "observability.metrics_path",
            value: config.observability.metrics_path.clone(),
        });
    }

    let buckets = &config.observability.duration_buckets;
    if buckets.is_empty() || buckets.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(ValidationError::Buckets);
    }

    if config.observability.upkeep_interval_secs == 0 {
        errors.push(ValidationError::ZeroUpkeepInterval);
    }

    let url_ok = Url::parse(&config.client.server_url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !url_ok {
        errors.push(ValidationError::ServerUrl(config.client.server_url.clone()));
    }

    if config.client.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroBufferCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True when `path` equals `reserved` or is one of its parent segments.
fn shadows(path: &str, reserved: &str) -> bool {
    let path = path.trim_end_matches('/');
    !path.is_empty()
        && (reserved == path
            || reserved
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('/')))
}
