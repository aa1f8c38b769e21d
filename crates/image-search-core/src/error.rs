//! Error types for image-search-core.

use thiserror::Error;

/// Top-level error type for image-search-core.
///
/// Adapter failures are reported through this type, but they never escape
/// the query orchestrator: every variant a query can produce degrades to an
/// empty result (see [`crate::types::EmptyReason`]).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
