//! Error types for the musher task pool

use thiserror::Error;

/// Main error type for musher operations
///
/// Task failures never surface here: they are captured per slot as
/// [`CapturedFailure`](crate::CapturedFailure) values. The only error a pool
/// call can return is a precondition violation, raised before any worker
/// starts.
#[derive(Error, Debug)]
pub enum MusherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid concurrency: {value} (must be > 0)")]
    InvalidConcurrency { value: usize },
}

/// Result type alias for musher operations
pub type MusherResult<T> = Result<T, MusherError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid concurrency error
    pub fn invalid_concurrency(value: usize) -> Self {
        ConfigError::InvalidConcurrency { value }
    }
}
