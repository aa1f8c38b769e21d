//! Error types for vector storage.

use image_search_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Pool construction failed (malformed URL or options).
    #[error("Failed to configure connection pool: {source}")]
    Connect {
        #[source]
        source: sqlx::Error,
    },

    /// A statement failed, including failure to acquire a connection.
    #[error("Postgres {operation} failed on table '{table}': {source}")]
    Query {
        operation: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// Table name is not a plain SQL identifier.
    #[error("Invalid table name '{0}'")]
    InvalidTable(String),

    /// A vector in pgvector text form could not be parsed.
    #[error("Malformed vector text: {0}")]
    MalformedVector(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Connect { .. } | StorageError::Query { .. } => {
                CoreError::StoreUnavailable(err.to_string())
            }
            StorageError::InvalidTable(_) => CoreError::ConfigError(err.to_string()),
            StorageError::MalformedVector(_) => CoreError::InvalidVector(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_is_store_unavailable() {
        let err = StorageError::Query {
            operation: "nearest",
            table: "image_embeddings".into(),
            source: sqlx::Error::PoolTimedOut,
        };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::StoreUnavailable(ref m) if m.contains("nearest")));
    }

    #[test]
    fn test_malformed_vector_is_invalid_vector() {
        let core: CoreError = StorageError::MalformedVector("[1,x]".into()).into();
        assert!(matches!(core, CoreError::InvalidVector(_)));
    }

    #[test]
    fn test_invalid_table_is_config_error() {
        let core: CoreError = StorageError::InvalidTable("a;b".into()).into();
        assert!(matches!(core, CoreError::ConfigError(_)));
    }
}
