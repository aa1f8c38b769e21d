//! Postgres + pgvector implementation of [`VectorStore`].
//!
//! Each operation is a single statement on a pooled connection; the
//! connection goes back to the pool when the statement future completes or
//! is dropped. An exemplar search therefore issues two independent
//! statements (lookup, then nearest) with no transaction between them.

use std::time::Duration;

use async_trait::async_trait;
use image_search_core::config::{is_sql_identifier, StorageConfig};
use image_search_core::error::{CoreError, CoreResult};
use image_search_core::traits::VectorStore;
use image_search_core::types::{Embedding, ItemId, Neighbor};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::vector_text::{format_vector, parse_vector};

#[derive(Debug, sqlx::FromRow)]
struct EmbeddingRow {
    embedding_text: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct NeighborRow {
    file_name: String,
    distance: f64,
}

/// pgvector-backed vector store over a shared connection pool.
///
/// # Thread Safety
/// `PgPool` is internally reference-counted and safe to share; clone the
/// store or wrap it in `Arc` to serve concurrent requests.
#[derive(Debug, Clone)]
pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    lookup_sql: String,
    nearest_sql: String,
}

impl PgVectorStore {
    /// Build the pool from configuration without opening a connection.
    ///
    /// Connections are established on first use, so a database that is down
    /// at startup surfaces as `StoreUnavailable` on each query instead of
    /// preventing the process from starting.
    ///
    /// # Errors
    ///
    /// - `StorageError::InvalidTable` if `storage.table` is not a plain identifier
    /// - `StorageError::Connect` if the URL cannot be parsed
    pub fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let url = config.database_url.as_deref().unwrap_or_default();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(url)
            .map_err(|source| StorageError::Connect { source })?;

        let store = Self::with_pool(pool, &config.table)?;
        info!(
            target: "image_search_storage::pgvector",
            table = %store.table,
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            "PgVectorStore configured"
        );
        Ok(store)
    }

    /// Use an existing pool.
    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self, StorageError> {
        if !is_sql_identifier(table) {
            return Err(StorageError::InvalidTable(table.to_string()));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
            lookup_sql: format!(
                "SELECT embedding::text AS embedding_text FROM {} WHERE file_name = $1 LIMIT 1",
                table
            ),
            nearest_sql: format!(
                "SELECT file_name, (embedding <#> $1::text::vector)::float8 AS distance \
                 FROM {} \
                 WHERE embedding IS NOT NULL AND file_name IS NOT NULL \
                   AND ($2::text IS NULL OR file_name <> $2) \
                 ORDER BY distance ASC \
                 LIMIT $3",
                table
            ),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial statement to verify the database is reachable.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|source| self.query_error("health_check", source))
    }

    /// Stored embedding of `id`, or `None` if no row (or a NULL embedding) exists.
    pub async fn fetch_embedding(&self, id: &ItemId) -> Result<Option<Vec<f32>>, StorageError> {
        let row = sqlx::query_as::<_, EmbeddingRow>(&self.lookup_sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| self.query_error("lookup", source))?;

        match row {
            Some(EmbeddingRow {
                embedding_text: Some(text),
            }) => parse_vector(&text).map(Some),
            Some(EmbeddingRow {
                embedding_text: None,
            }) => {
                debug!(
                    target: "image_search_storage::pgvector",
                    file_name = %id,
                    "Row has NULL embedding, treating as absent"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Up to `limit` rows nearest to `query`, ascending by negative inner product.
    pub async fn fetch_nearest(
        &self,
        query: &[f32],
        limit: usize,
        exclude: Option<&ItemId>,
    ) -> Result<Vec<Neighbor>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, NeighborRow>(&self.nearest_sql)
            .bind(format_vector(query))
            .bind(exclude.map(ItemId::as_str))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| self.query_error("nearest", source))?;

        Ok(rows
            .into_iter()
            .map(|row| Neighbor::new(row.file_name, row.distance))
            .collect())
    }

    fn query_error(&self, operation: &'static str, source: sqlx::Error) -> StorageError {
        StorageError::Query {
            operation,
            table: self.table.clone(),
            source,
        }
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn get_embedding(&self, id: &ItemId) -> CoreResult<Option<Embedding>> {
        let values = self.fetch_embedding(id).await.map_err(|e| {
            warn!(
                target: "image_search_storage::pgvector",
                file_name = %id,
                error = %e,
                "Embedding lookup failed"
            );
            CoreError::from(e)
        })?;

        values.map(Embedding::new).transpose()
    }

    async fn nearest(
        &self,
        query: &Embedding,
        limit: usize,
        exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        let rows = self
            .fetch_nearest(query.as_slice(), limit, exclude)
            .await
            .map_err(|e| {
                warn!(
                    target: "image_search_storage::pgvector",
                    limit,
                    error = %e,
                    "Nearest-neighbor query failed"
                );
                CoreError::from(e)
            })?;

        debug!(
            target: "image_search_storage::pgvector",
            returned = rows.len(),
            limit,
            "Nearest-neighbor query complete"
        );
        Ok(rows)
    }

    fn backend_name(&self) -> &str {
        "pgvector"
    }
}
