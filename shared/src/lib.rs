//! Shared configuration and wire types for the storefront server
//!
//! This crate provides common functionality used across all server crates:
//! - Configuration types loaded from the environment
//! - Error response structures and codes
//! - Health response body
//! - Validation helpers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DatabaseBackend, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus};
pub use utils::validation;
