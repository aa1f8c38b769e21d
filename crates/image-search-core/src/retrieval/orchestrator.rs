//! Query orchestrator: the single entry point of the similarity-query core.
//!
//! Resolves a [`Query`] to a query vector (text encoding or exemplar
//! lookup), delegates ranking to the [`RetrievalEngine`], and guarantees
//! that no failure reaches the caller. Every failure mode degrades to an
//! empty result whose reason is logged.
//!
//! # Pipeline
//!
//! ```text
//! Query::Text      ──trim──► TextEncoder::encode ──┐
//!                                                  ├─► RetrievalEngine::retrieve(cap=30, exclude)
//! Query::Exemplar  ──────► VectorStore::get_embedding ┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::traits::{TextEncoder, VectorStore};
use crate::types::{
    Embedding, EmptyReason, ItemId, Query, SearchOutcome, SearchResponse, RESULT_CAP,
};

use super::engine::{store_failure_reason, RetrievalEngine};

/// Drives query resolution and retrieval for one request at a time.
///
/// Holds only shared, read-only handles: the encoder model loaded at
/// startup and the vector store (typically a connection pool). No
/// embeddings or results are cached between requests, and no adapter
/// call is retried.
#[derive(Clone)]
pub struct QueryOrchestrator {
    encoder: Arc<dyn TextEncoder>,
    engine: RetrievalEngine,
}

impl QueryOrchestrator {
    /// Create an orchestrator. The engine rejects vectors whose dimension
    /// differs from the encoder's.
    pub fn new(encoder: Arc<dyn TextEncoder>, store: Arc<dyn VectorStore>) -> Self {
        let engine = RetrievalEngine::new(store).with_dimension(encoder.dimension());
        info!(
            target: "image_search_core::orchestrator",
            model = encoder.model_id(),
            dimension = encoder.dimension(),
            backend = engine.store().backend_name(),
            "QueryOrchestrator initialized"
        );
        Self { encoder, engine }
    }

    /// Run a query and return identifiers plus the text echo.
    ///
    /// Never fails: encoder errors, lookup misses and store outages all
    /// yield an empty `results` list.
    pub async fn search(&self, query: &Query) -> SearchResponse {
        let outcome = self.search_ranked(query).await;
        SearchResponse::from_outcome(&outcome, query.echo())
    }

    /// Run a query, keeping the distances reported by the store.
    pub async fn search_ranked(&self, query: &Query) -> SearchOutcome {
        if query.is_blank() {
            debug!(
                target: "image_search_core::orchestrator",
                "Blank text query, skipping encoder and store"
            );
            return SearchOutcome::Empty(EmptyReason::EmptyQuery);
        }

        let vector = match query {
            Query::Text { text } => self.encode_text(text.trim()).await,
            Query::Exemplar { identifier } => self.lookup_exemplar(identifier).await,
        };

        match vector {
            Ok(vector) => {
                self.engine
                    .retrieve(Some(&vector), RESULT_CAP, query.excluded())
                    .await
            }
            Err(reason) => SearchOutcome::Empty(reason),
        }
    }

    async fn encode_text(&self, text: &str) -> Result<Embedding, EmptyReason> {
        self.encoder.encode(text).await.map_err(|e| {
            warn!(
                target: "image_search_core::orchestrator",
                model = self.encoder.model_id(),
                error = %e,
                "Text encoding failed, returning empty result"
            );
            EmptyReason::EncodingFailure
        })
    }

    async fn lookup_exemplar(&self, id: &ItemId) -> Result<Embedding, EmptyReason> {
        let store = self.engine.store();
        match store.get_embedding(id).await {
            Ok(Some(vector)) => Ok(vector),
            Ok(None) => {
                debug!(
                    target: "image_search_core::orchestrator",
                    exemplar = %id,
                    "Exemplar not found in store"
                );
                Err(EmptyReason::LookupMiss)
            }
            Err(e) => {
                let reason = store_failure_reason(&e);
                warn!(
                    target: "image_search_core::orchestrator",
                    backend = store.backend_name(),
                    exemplar = %id,
                    error = %e,
                    reason = %reason,
                    "Exemplar lookup failed, returning empty result"
                );
                Err(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{CoreError, CoreResult};
    use crate::stubs::{InMemoryVectorStore, StubTextEncoder};
    use crate::types::Neighbor;

    /// Store whose rows hold vectors that cannot be decoded.
    struct CorruptRowStore;

    #[async_trait]
    impl VectorStore for CorruptRowStore {
        async fn get_embedding(&self, _id: &ItemId) -> CoreResult<Option<Embedding>> {
            Err(CoreError::InvalidVector("unparseable stored vector".into()))
        }

        async fn nearest(
            &self,
            _query: &Embedding,
            _limit: usize,
            _exclude: Option<&ItemId>,
        ) -> CoreResult<Vec<Neighbor>> {
            Ok(Vec::new())
        }

        fn backend_name(&self) -> &str {
            "corrupt"
        }
    }

    fn orchestrator_with(store: InMemoryVectorStore) -> QueryOrchestrator {
        QueryOrchestrator::new(
            Arc::new(StubTextEncoder::with_dimension(4)),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_blank_text_short_circuits() {
        let orchestrator = orchestrator_with(InMemoryVectorStore::new());

        let outcome = orchestrator.search_ranked(&Query::text(" ")).await;
        assert_eq!(outcome, SearchOutcome::Empty(EmptyReason::EmptyQuery));
    }

    #[tokio::test]
    async fn test_exemplar_is_excluded() {
        let store = InMemoryVectorStore::new();
        store
            .insert("a", Embedding::new(vec![1.0, 0.0, 0.0, 0.0]).unwrap())
            .unwrap();
        store
            .insert("b", Embedding::new(vec![0.9, 0.1, 0.0, 0.0]).unwrap())
            .unwrap();
        let orchestrator = orchestrator_with(store);

        let response = orchestrator.search(&Query::exemplar("a")).await;
        assert_eq!(response.results, vec![ItemId::from("b")]);
        assert_eq!(response.echoed_text, None);
    }

    #[tokio::test]
    async fn test_missing_exemplar_is_lookup_miss() {
        let orchestrator = orchestrator_with(InMemoryVectorStore::new());

        let outcome = orchestrator.search_ranked(&Query::exemplar("ghost.jpg")).await;
        assert_eq!(outcome, SearchOutcome::Empty(EmptyReason::LookupMiss));
    }

    #[tokio::test]
    async fn test_text_echo_is_trimmed() {
        let orchestrator = orchestrator_with(InMemoryVectorStore::new());

        let response = orchestrator.search(&Query::text("  red car  ")).await;
        assert_eq!(response.echoed_text.as_deref(), Some("red car"));
        // Empty store answers with no rows, which is not a degraded outcome.
        assert!(response.results.is_empty());
        assert_eq!(response.empty_reason, None);
    }

    #[tokio::test]
    async fn test_corrupt_exemplar_is_invalid_vector() {
        let orchestrator = QueryOrchestrator::new(
            Arc::new(StubTextEncoder::with_dimension(4)),
            Arc::new(CorruptRowStore),
        );

        let outcome = orchestrator.search_ranked(&Query::exemplar("img7.jpg")).await;
        assert_eq!(outcome, SearchOutcome::Empty(EmptyReason::InvalidVector));
    }
}
