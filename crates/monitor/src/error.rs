//! Error types for monitor configuration.
//!
//! Measurement itself never fails; only loading configuration can.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::MonitorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric setting is out of range
    #[error("Invalid value for {field}: {value} (must be finite and positive)")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
