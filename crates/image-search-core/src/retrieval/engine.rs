//! Retrieval engine: query vector in, ranked candidate list out.
//!
//! The distance metric itself is evaluated by the [`VectorStore`]. The
//! engine owns the ranking policy around it:
//!
//! 1. Absent or wrong-dimension vectors never reach the store
//! 2. The excluded identifier never appears in the output
//! 3. Identifiers are unique (first occurrence wins)
//! 4. Output is sorted by ascending distance; equal distances keep store order
//! 5. Output length is `min(cap, eligible rows)` for any store that honors
//!    the limit, even one that ignores the exclusion
//!
//! A store that returns duplicate identifiers within its limit leaves the
//! output short by the number of duplicates; the engine does not re-query.
//!
//! Store failures are terminal for the request and come back as
//! [`SearchOutcome::Empty`], never as an error.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::traits::VectorStore;
use crate::types::{Embedding, EmptyReason, ItemId, Neighbor, SearchOutcome};

/// Ranks candidates for a query vector against a [`VectorStore`].
#[derive(Clone)]
pub struct RetrievalEngine {
    store: Arc<dyn VectorStore>,
    dimension: Option<usize>,
}

impl RetrievalEngine {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            dimension: None,
        }
    }

    /// Reject query vectors whose dimension differs from the corpus dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Retrieve up to `cap` identifiers nearest to `vector`, never including `exclude`.
    pub async fn retrieve(
        &self,
        vector: Option<&Embedding>,
        cap: usize,
        exclude: Option<&ItemId>,
    ) -> SearchOutcome {
        let Some(vector) = vector else {
            warn!(
                target: "image_search_core::retrieval",
                "Retrieval called without a query vector"
            );
            return SearchOutcome::Empty(EmptyReason::InvalidVector);
        };

        match self.rank(vector, cap, exclude).await {
            Ok(neighbors) => {
                debug!(
                    target: "image_search_core::retrieval",
                    backend = self.store.backend_name(),
                    cap,
                    excluded = exclude.map(ItemId::as_str),
                    returned = neighbors.len(),
                    "Retrieval complete"
                );
                SearchOutcome::Ranked(neighbors)
            }
            Err(e) => {
                let reason = store_failure_reason(&e);
                warn!(
                    target: "image_search_core::retrieval",
                    backend = self.store.backend_name(),
                    error = %e,
                    reason = %reason,
                    "Retrieval degraded to empty result"
                );
                SearchOutcome::Empty(reason)
            }
        }
    }

    async fn rank(
        &self,
        vector: &Embedding,
        cap: usize,
        exclude: Option<&ItemId>,
    ) -> CoreResult<Vec<Neighbor>> {
        if let Some(expected) = self.dimension {
            vector.ensure_dimension(expected)?;
        }
        if cap == 0 {
            return Ok(Vec::new());
        }

        // One spare row so a store that leaks the excluded item still fills the cap.
        let limit = match exclude {
            Some(_) => cap.saturating_add(1),
            None => cap,
        };
        let rows = self.store.nearest(vector, limit, exclude).await?;
        Ok(apply_ranking_policy(rows, cap, exclude))
    }
}

/// Empty-result reason for an error reported by a [`VectorStore`].
pub(crate) fn store_failure_reason(err: &CoreError) -> EmptyReason {
    match err {
        CoreError::DimensionMismatch { .. } | CoreError::InvalidVector(_) => {
            EmptyReason::InvalidVector
        }
        _ => EmptyReason::StoreUnavailable,
    }
}

/// Enforce exclusion, uniqueness, ordering and cap on raw store rows.
fn apply_ranking_policy(
    rows: Vec<Neighbor>,
    cap: usize,
    exclude: Option<&ItemId>,
) -> Vec<Neighbor> {
    let mut seen: HashSet<ItemId> = HashSet::with_capacity(rows.len());
    let mut ranked: Vec<Neighbor> = rows
        .into_iter()
        .filter(|n| exclude != Some(&n.id))
        .filter(|n| seen.insert(n.id.clone()))
        .collect();

    // sort_by is stable: equal distances keep the store's row order.
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(cap);
    ranked
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    /// Records the limit it was asked for and answers from fixed rows.
    struct RecordingStore {
        rows: Vec<Neighbor>,
        limits: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn get_embedding(&self, _id: &ItemId) -> CoreResult<Option<Embedding>> {
            Ok(None)
        }

        async fn nearest(
            &self,
            _query: &Embedding,
            limit: usize,
            _exclude: Option<&ItemId>,
        ) -> CoreResult<Vec<Neighbor>> {
            self.limits.lock().push(limit);
            Ok(self.rows.iter().take(limit).cloned().collect())
        }

        fn backend_name(&self) -> &str {
            "recording"
        }
    }

    fn recording_engine(rows: Vec<Neighbor>) -> (RetrievalEngine, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore {
            rows,
            limits: Mutex::new(Vec::new()),
        });
        (RetrievalEngine::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_leaked_exclusion_still_fills_cap() {
        let rows: Vec<Neighbor> = (0..5)
            .map(|i| Neighbor::new(format!("img{}", i), i as f64))
            .collect();
        let (engine, store) = recording_engine(rows);
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let exclude = ItemId::from("img0");

        let outcome = engine.retrieve(Some(&query), 3, Some(&exclude)).await;
        assert_eq!(
            outcome.identifiers(),
            vec![ItemId::from("img1"), ItemId::from("img2"), ItemId::from("img3")]
        );
        assert_eq!(*store.limits.lock(), vec![4]);

        engine.retrieve(Some(&query), 3, None).await;
        assert_eq!(*store.limits.lock(), vec![4, 3]);
    }

    fn ids(neighbors: &[Neighbor]) -> Vec<&str> {
        neighbors.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_store_failure_reasons() {
        assert_eq!(
            store_failure_reason(&CoreError::StoreUnavailable("refused".into())),
            EmptyReason::StoreUnavailable
        );
        assert_eq!(
            store_failure_reason(&CoreError::InvalidVector("bad literal".into())),
            EmptyReason::InvalidVector
        );
        assert_eq!(
            store_failure_reason(&CoreError::DimensionMismatch {
                expected: 4,
                actual: 2
            }),
            EmptyReason::InvalidVector
        );
    }

    #[test]
    fn test_policy_drops_excluded_identifier() {
        let rows = vec![
            Neighbor::new("self", -1.0),
            Neighbor::new("a", -0.8),
            Neighbor::new("b", -0.2),
        ];
        let exclude = ItemId::from("self");

        let ranked = apply_ranking_policy(rows, 30, Some(&exclude));
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn test_policy_dedups_keeping_first() {
        let rows = vec![
            Neighbor::new("a", -0.9),
            Neighbor::new("b", -0.5),
            Neighbor::new("a", -0.1),
        ];

        let ranked = apply_ranking_policy(rows, 30, None);
        assert_eq!(ids(&ranked), vec!["a", "b"]);
        assert_eq!(ranked[0].distance, -0.9);
    }

    #[test]
    fn test_policy_sorts_stably() {
        let rows = vec![
            Neighbor::new("far", 0.5),
            Neighbor::new("tie1", -0.5),
            Neighbor::new("near", -0.9),
            Neighbor::new("tie2", -0.5),
        ];

        let ranked = apply_ranking_policy(rows, 30, None);
        assert_eq!(ids(&ranked), vec!["near", "tie1", "tie2", "far"]);
    }

    #[test]
    fn test_policy_truncates_to_cap() {
        let rows: Vec<Neighbor> = (0..10)
            .map(|i| Neighbor::new(format!("img{}", i), i as f64))
            .collect();

        let ranked = apply_ranking_policy(rows, 3, None);
        assert_eq!(ids(&ranked), vec!["img0", "img1", "img2"]);
    }
}
