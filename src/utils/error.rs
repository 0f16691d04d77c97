//! Error types for the latency router

use thiserror::Error;

/// Result type alias for the latency router
pub type Result<T> = std::result::Result<T, RouterError>;

/// Main error type for the latency router
///
/// Only construction, configuration, and the fallible `try_*` store operations
/// surface these. The routing facade logs and absorbs them.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cache backend errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouterError {
    /// Whether the error came from the statistics backend
    ///
    /// Backend errors are the ones the router degrades on instead of failing.
    pub fn is_backend_unavailable(&self) -> bool {
        match self {
            RouterError::Cache(_) => true,
            #[cfg(feature = "redis")]
            RouterError::Redis(_) => true,
            _ => false,
        }
    }
}
