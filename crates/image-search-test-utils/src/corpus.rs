//! Deterministic corpus generation.
//!
//! All vectors are unit length, so an item's embedding is strictly its own
//! nearest neighbor under negative inner product.

use image_search_core::stubs::InMemoryVectorStore;
use image_search_core::types::{Embedding, ItemId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate a unit vector of `dim` dimensions (L2 norm = 1.0) from `rng`.
pub fn generate_unit_vector<R: Rng>(rng: &mut R, dim: usize) -> Vec<f32> {
    let mut vec: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vec {
            *v /= norm;
        }
    }
    vec
}

/// A seeded corpus of items named `img1..imgN`.
#[derive(Debug, Clone)]
pub struct Corpus {
    rows: Vec<(ItemId, Embedding)>,
}

impl Corpus {
    /// Build `size` items of dimension `dim`; equal seeds give equal corpora.
    pub fn generate(size: usize, dim: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rows = (1..=size)
            .map(|i| {
                let embedding = Embedding::new(generate_unit_vector(&mut rng, dim))
                    .expect("unit vector is finite and non-empty");
                (ItemId::new(format!("img{}", i)), embedding)
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[(ItemId, Embedding)] {
        &self.rows
    }

    /// Embedding of `id`. Panics if the corpus has no such item.
    pub fn embedding(&self, id: &str) -> Embedding {
        self.rows
            .iter()
            .find(|(item, _)| item.as_str() == id)
            .map(|(_, embedding)| embedding.clone())
            .unwrap_or_else(|| panic!("corpus has no item {}", id))
    }

    /// Every other item ordered by ascending distance to `query`, brute force.
    pub fn expected_ranking(&self, query: &Embedding, exclude: Option<&str>) -> Vec<ItemId> {
        let mut scored: Vec<(f64, &ItemId)> = self
            .rows
            .iter()
            .filter(|(id, _)| Some(id.as_str()) != exclude)
            .map(|(id, embedding)| {
                let distance = embedding
                    .negative_inner_product(query)
                    .expect("corpus and query share a dimension");
                (distance, id)
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, id)| id.clone()).collect()
    }

    /// Load every row into a fresh in-memory store.
    pub fn into_store(&self) -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        for (id, embedding) in &self.rows {
            store
                .insert(id.clone(), embedding.clone())
                .expect("corpus rows share a dimension");
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_corpus() {
        let a = Corpus::generate(5, 8, 42);
        let b = Corpus::generate(5, 8, 42);
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn test_names_and_norms() {
        let corpus = Corpus::generate(3, 16, 7);
        assert_eq!(corpus.rows()[0].0.as_str(), "img1");
        assert_eq!(corpus.rows()[2].0.as_str(), "img3");

        for (_, embedding) in corpus.rows() {
            let norm: f32 = embedding.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_item_is_its_own_nearest() {
        let corpus = Corpus::generate(20, 32, 1);
        let query = corpus.embedding("img7");
        assert_eq!(corpus.expected_ranking(&query, None)[0].as_str(), "img7");
    }
}
