//! # botway-common
//!
//! Shared utilities for the botway client: configuration loading and
//! telemetry setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{ClientConfig, ConfigError, GatewayConfig, RestConfig};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
