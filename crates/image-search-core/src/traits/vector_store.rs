//! Vector store trait for `(identifier, embedding)` persistence.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Embedding, ItemId, Neighbor};

/// Holds item embeddings and answers nearest-neighbor queries.
///
/// The store owns the distance metric: `nearest` orders rows by negative
/// inner product to the query vector, ascending. Ties keep the store's
/// natural row order.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Fetch the stored embedding for `id`; `Ok(None)` if there is no such row.
    ///
    /// # Errors
    ///
    /// - `CoreError::StoreUnavailable` on connectivity or query failure
    async fn get_embedding(&self, id: &ItemId) -> CoreResult<Option<Embedding>>;

    /// Up to `limit` rows nearest to `query`, ascending distance, never
    /// including `exclude`.
    ///
    /// # Errors
    ///
    /// - `CoreError::StoreUnavailable` on connectivity or query failure
    /// - `CoreError::DimensionMismatch` if `query` does not match the corpus dimension
    async fn nearest(
        &self,
        query: &Embedding,
        limit: usize,
        exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>>;

    /// Backend name, for logging.
    fn backend_name(&self) -> &str;
}
