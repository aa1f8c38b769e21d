//! Error types for embedding operations.

use std::path::PathBuf;

use thiserror::Error;

/// Embedding-specific errors.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model files missing, unreadable or inconsistent with the configuration.
    #[error("Failed to load model from {}: {message}", .path.display())]
    ModelLoad { path: PathBuf, message: String },

    /// Tokenizer rejected the input.
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    /// A tensor operation failed during the forward pass.
    #[error("Tensor operation failed: {message}")]
    Tensor { message: String },

    /// Input validation failed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dimension mismatch.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EmbeddingError {
    /// Adapter for `map_err` on candle results: `.map_err(EmbeddingError::tensor("QK matmul"))`.
    pub(crate) fn tensor(context: &'static str) -> impl FnOnce(candle_core::Error) -> Self {
        move |e| Self::Tensor {
            message: format!("{} failed: {}", context, e),
        }
    }

    pub(crate) fn model_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
