//! Encoders and stores with controlled behavior.
//!
//! These are for exercising failure normalization and the ranking policy
//! in the orchestrator without a model or database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image_search_core::error::{CoreError, CoreResult};
use image_search_core::traits::{TextEncoder, VectorStore};
use image_search_core::types::{Embedding, ItemId, Neighbor};

/// Encoder that always fails with `EncodingFailure`.
#[derive(Debug, Clone)]
pub struct FailingTextEncoder {
    dimension: usize,
}

impl FailingTextEncoder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl TextEncoder for FailingTextEncoder {
    async fn encode(&self, text: &str) -> CoreResult<Embedding> {
        Err(CoreError::EncodingFailure(format!(
            "encoder unavailable for '{}'",
            text
        )))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "failing-encoder"
    }
}

/// Encoder returning fixed embeddings per phrase, failing on unknown phrases.
#[derive(Debug, Clone, Default)]
pub struct MappedTextEncoder {
    phrases: HashMap<String, Embedding>,
    dimension: usize,
}

impl MappedTextEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            phrases: HashMap::new(),
            dimension,
        }
    }

    /// Map `phrase` to `embedding`.
    pub fn with_phrase(mut self, phrase: impl Into<String>, embedding: Embedding) -> Self {
        self.phrases.insert(phrase.into(), embedding);
        self
    }
}

#[async_trait]
impl TextEncoder for MappedTextEncoder {
    async fn encode(&self, text: &str) -> CoreResult<Embedding> {
        self.phrases
            .get(text)
            .cloned()
            .ok_or_else(|| CoreError::EncodingFailure(format!("no mapping for '{}'", text)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "mapped-encoder"
    }
}

/// Wraps an encoder and counts `encode` calls.
pub struct CountingTextEncoder {
    inner: Arc<dyn TextEncoder>,
    calls: Arc<AtomicUsize>,
}

impl CountingTextEncoder {
    pub fn new(inner: Arc<dyn TextEncoder>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter; stays valid after the encoder is moved into an orchestrator.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl TextEncoder for CountingTextEncoder {
    async fn encode(&self, text: &str) -> CoreResult<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

/// Store whose every operation fails with `StoreUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct UnavailableVectorStore;

#[async_trait]
impl VectorStore for UnavailableVectorStore {
    async fn get_embedding(&self, _id: &ItemId) -> CoreResult<Option<Embedding>> {
        Err(CoreError::StoreUnavailable("connection refused".into()))
    }

    async fn nearest(
        &self,
        _query: &Embedding,
        _limit: usize,
        _exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        Err(CoreError::StoreUnavailable("connection refused".into()))
    }

    fn backend_name(&self) -> &str {
        "unavailable"
    }
}

/// Store that ignores exclusion and limit, duplicates every row and
/// returns rows unsorted. Lookups delegate to the wrapped store.
pub struct UnrulyVectorStore {
    inner: Arc<dyn VectorStore>,
}

impl UnrulyVectorStore {
    pub fn new(inner: Arc<dyn VectorStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VectorStore for UnrulyVectorStore {
    async fn get_embedding(&self, id: &ItemId) -> CoreResult<Option<Embedding>> {
        self.inner.get_embedding(id).await
    }

    async fn nearest(
        &self,
        query: &Embedding,
        _limit: usize,
        _exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        let mut rows = self.inner.nearest(query, usize::MAX, None).await?;
        rows.reverse();
        let duplicates: Vec<Neighbor> = rows
            .iter()
            .map(|n| Neighbor::new(n.id.clone(), n.distance + 1.0))
            .collect();
        rows.extend(duplicates);
        Ok(rows)
    }

    fn backend_name(&self) -> &str {
        "unruly"
    }
}

/// Store that honors the limit but ignores the exclusion, so an exemplar
/// comes back as its own nearest neighbor.
pub struct ExclusionBlindVectorStore {
    inner: Arc<dyn VectorStore>,
}

impl ExclusionBlindVectorStore {
    pub fn new(inner: Arc<dyn VectorStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VectorStore for ExclusionBlindVectorStore {
    async fn get_embedding(&self, id: &ItemId) -> CoreResult<Option<Embedding>> {
        self.inner.get_embedding(id).await
    }

    async fn nearest(
        &self,
        query: &Embedding,
        limit: usize,
        _exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        self.inner.nearest(query, limit, None).await
    }

    fn backend_name(&self) -> &str {
        "exclusion-blind"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_search_core::stubs::StubTextEncoder;

    #[tokio::test]
    async fn test_counting_encoder_counts() {
        let counting = CountingTextEncoder::new(Arc::new(StubTextEncoder::with_dimension(4)));
        let counter = counting.counter();
        counting.encode("a").await.unwrap();
        counting.encode("b").await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mapped_encoder_unknown_phrase_fails() {
        let encoder = MappedTextEncoder::new(2)
            .with_phrase("dog", Embedding::new(vec![1.0, 0.0]).unwrap());
        assert!(encoder.encode("dog").await.is_ok());
        assert!(matches!(
            encoder.encode("cat").await,
            Err(CoreError::EncodingFailure(_))
        ));
    }
}
