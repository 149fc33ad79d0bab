//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → server sections handed to HttpServer, client section to TelemetryClient
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetsConfig, ClientConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RelayConfig, ServiceConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
