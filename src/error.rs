//! Error types for the cache
//!
//! Cache operations themselves never fail; these errors only surface while
//! parsing configuration.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Replacement strategy name not recognized
    #[error("Unknown replacement strategy: {0}")]
    UnknownStrategy(String),

    /// Configuration value could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
