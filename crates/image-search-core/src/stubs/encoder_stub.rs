//! Stub text encoder for development.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::traits::TextEncoder;
use crate::types::Embedding;

/// Default stub dimension (CLIP ViT-B/32 shared embedding space).
pub const STUB_DIMENSION: usize = 512;

/// Stub encoder for running without model files.
///
/// Generates deterministic embeddings based on input hashing.
/// Same input always produces same embedding, enabling reproducible tests.
#[derive(Debug, Clone)]
pub struct StubTextEncoder {
    dimension: usize,
    model_id: String,
}

impl StubTextEncoder {
    /// Create a stub encoder with default 512 dimensions.
    pub fn new() -> Self {
        Self::with_dimension(STUB_DIMENSION)
    }

    /// Create a stub encoder with custom dimensions.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: "stub-text-encoder-v1".to_string(),
        }
    }

    /// Generate deterministic L2-normalized values from text.
    fn generate(&self, text: &str) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.dimension);

        for i in 0..self.dimension {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            (i as u64).hash(&mut hasher);
            let hash = hasher.finish();

            // Map to [-1.0, 1.0] range
            let value = ((hash as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32;
            values.push(value);
        }

        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }

        values
    }
}

impl Default for StubTextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextEncoder for StubTextEncoder {
    async fn encode(&self, text: &str) -> CoreResult<Embedding> {
        Embedding::new(self.generate(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_encode_dimension() {
        let encoder = StubTextEncoder::with_dimension(384);
        let embedding = encoder.encode("test").await.unwrap();
        assert_eq!(embedding.dimension(), 384);
    }

    #[tokio::test]
    async fn test_deterministic_across_instances() {
        let e1 = StubTextEncoder::new().encode("red car").await.unwrap();
        let e2 = StubTextEncoder::default().encode("red car").await.unwrap();
        assert_eq!(e1, e2, "Same input must produce identical embedding");
    }

    #[tokio::test]
    async fn test_different_inputs() {
        let encoder = StubTextEncoder::new();
        let e1 = encoder.encode("red car").await.unwrap();
        let e2 = encoder.encode("blue boat").await.unwrap();
        assert_ne!(e1, e2);
    }

    #[tokio::test]
    async fn test_normalized() {
        let encoder = StubTextEncoder::new();
        let embedding = encoder.encode("test normalization").await.unwrap();
        let norm: f32 = embedding.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
