//! In-memory vector store for development and tests.
//!
//! Brute-force negative inner product over every row. Rows keep insertion
//! order, which is also the tie-break order for equal distances.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::traits::VectorStore;
use crate::types::{Embedding, ItemId, Neighbor};

/// One row of a seed file.
#[derive(Debug, Deserialize)]
struct SeedRow {
    file_name: ItemId,
    embedding: Embedding,
}

/// Vector store holding every row in memory.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    rows: RwLock<Vec<(ItemId, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows from a JSON seed file: `[{"file_name": "...", "embedding": [...]}, ...]`.
    ///
    /// # Errors
    ///
    /// - `CoreError::ConfigError` if the file cannot be read
    /// - `CoreError::SerializationError` if it is not a valid seed document
    /// - `CoreError::DimensionMismatch` if rows disagree on dimension
    pub fn from_seed_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        let rows: Vec<SeedRow> = serde_json::from_str(&content)?;

        let store = Self::new();
        for row in rows {
            store.insert(row.file_name, row.embedding)?;
        }

        info!(
            target: "image_search_core::stubs",
            path = %path.display(),
            rows = store.len(),
            "Loaded in-memory vector store from seed file"
        );
        Ok(store)
    }

    /// Insert a row, replacing the embedding of an existing identifier in place.
    ///
    /// # Errors
    ///
    /// - `CoreError::DimensionMismatch` if the corpus already holds vectors of another dimension
    pub fn insert(&self, id: impl Into<ItemId>, embedding: Embedding) -> CoreResult<()> {
        let id = id.into();
        let mut rows = self.rows.write();

        if let Some((_, first)) = rows.first() {
            embedding.ensure_dimension(first.dimension())?;
        }

        match rows.iter_mut().find(|(existing, _)| *existing == id) {
            Some(row) => row.1 = embedding,
            None => rows.push((id, embedding)),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn get_embedding(&self, id: &ItemId) -> CoreResult<Option<Embedding>> {
        Ok(self
            .rows
            .read()
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, embedding)| embedding.clone()))
    }

    async fn nearest(
        &self,
        query: &Embedding,
        limit: usize,
        exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        let rows = self.rows.read();

        let mut scored = Vec::with_capacity(rows.len());
        for (id, embedding) in rows.iter() {
            if exclude == Some(id) {
                continue;
            }
            let distance = embedding.negative_inner_product(query)?;
            scored.push(Neighbor::new(id.clone(), distance));
        }

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(limit);

        debug!(
            target: "image_search_core::stubs",
            scanned = rows.len(),
            returned = scored.len(),
            "In-memory nearest-neighbor scan"
        );
        Ok(scored)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_nearest_orders_by_negative_inner_product() {
        let store = InMemoryVectorStore::new();
        store.insert("low", emb(&[0.1, 0.0])).unwrap();
        store.insert("high", emb(&[0.9, 0.0])).unwrap();
        store.insert("mid", emb(&[0.5, 0.0])).unwrap();

        let hits = store.nearest(&emb(&[1.0, 0.0]), 10, None).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert!((hits[0].distance + 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_nearest_excludes_and_limits() {
        let store = InMemoryVectorStore::new();
        for i in 0..5 {
            store.insert(format!("img{}", i), emb(&[i as f32, 1.0])).unwrap();
        }
        let exclude = ItemId::from("img4");

        let hits = store.nearest(&emb(&[1.0, 0.0]), 2, Some(&exclude)).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["img3", "img2"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_mixed_dimensions() {
        let store = InMemoryVectorStore::new();
        store.insert("a", emb(&[1.0, 0.0])).unwrap();

        let err = store.insert("b", emb(&[1.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_insert_replaces_in_place() {
        let store = InMemoryVectorStore::new();
        store.insert("a", emb(&[1.0, 0.0])).unwrap();
        store.insert("b", emb(&[0.0, 1.0])).unwrap();
        store.insert("a", emb(&[0.0, 0.5])).unwrap();

        assert_eq!(store.len(), 2);
        let a = store.get_embedding(&ItemId::from("a")).await.unwrap().unwrap();
        assert_eq!(a.as_slice(), &[0.0, 0.5]);
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_an_error() {
        let store = InMemoryVectorStore::new();
        store.insert("a", emb(&[1.0, 0.0])).unwrap();

        let result = store.nearest(&emb(&[1.0, 0.0, 0.0]), 5, None).await;
        assert!(matches!(result, Err(CoreError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"file_name": "cat.jpg", "embedding": [0.6, 0.8]}},
               {{"file_name": "dog.jpg", "embedding": [0.8, 0.6]}}]"#
        )
        .unwrap();

        let store = InMemoryVectorStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store
            .get_embedding(&ItemId::from("dog.jpg"))
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_from_missing_seed_file() {
        let result = InMemoryVectorStore::from_seed_file(Path::new("/nonexistent/seed.json"));
        assert!(matches!(result, Err(CoreError::ConfigError(_))));
    }
}
