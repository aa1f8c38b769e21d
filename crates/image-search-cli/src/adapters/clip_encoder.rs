//! Adapter bridging the CLIP text model to the core `TextEncoder` trait.
//!
//! # Error Mapping
//!
//! | Embeddings Error | Core Error |
//! |-----------------|------------|
//! | `EmbeddingError::*` | `CoreError::EncodingFailure(message)` |
//! | blocking task panicked or cancelled | `CoreError::EncodingFailure(message)` |

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image_search_core::error::{CoreError, CoreResult};
use image_search_core::traits::TextEncoder;
use image_search_core::types::Embedding;
use image_search_embeddings::{select_device, ClipTextModel, EmbeddingError};
use tracing::debug;

/// `TextEncoder` backed by a loaded [`ClipTextModel`].
///
/// The forward pass is CPU/GPU bound, so each call runs on the blocking
/// thread pool. The model is shared read-only through an `Arc`.
#[derive(Clone)]
pub struct ClipEncoderAdapter {
    inner: Arc<ClipTextModel>,
}

impl ClipEncoderAdapter {
    pub fn new(model: ClipTextModel) -> Self {
        Self {
            inner: Arc::new(model),
        }
    }

    /// Load the model from `model_dir`, truncating text to `max_tokens` tokens.
    pub fn load(model_dir: &Path, use_gpu: bool, max_tokens: usize) -> CoreResult<Self> {
        let device = select_device(use_gpu);
        let model = ClipTextModel::load(model_dir, &device)
            .map_err(|e| map_embedding_error(&e))?
            .with_max_tokens(max_tokens);
        Ok(Self::new(model))
    }
}

#[async_trait]
impl TextEncoder for ClipEncoderAdapter {
    async fn encode(&self, text: &str) -> CoreResult<Embedding> {
        let start = Instant::now();
        let model = Arc::clone(&self.inner);
        let text = text.to_owned();

        let values = tokio::task::spawn_blocking(move || model.encode(&text))
            .await
            .map_err(|e| CoreError::EncodingFailure(format!("encoder task failed: {}", e)))?
            .map_err(|e| map_embedding_error(&e))?;

        debug!(
            target: "image_search_cli::adapters",
            model = self.inner.model_id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Text encoded"
        );

        Embedding::new(values).map_err(|e| CoreError::EncodingFailure(e.to_string()))
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

/// Map an embeddings-crate error onto the core encoder failure.
pub fn map_embedding_error(err: &EmbeddingError) -> CoreError {
    CoreError::EncodingFailure(err.to_string())
}
