//! Loaded CLIP text model handle.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use tokenizers::Tokenizer;

use crate::error::{EmbeddingError, EmbeddingResult};

use super::config::ClipTextConfig;
use super::constants::{TOKENIZER_FILE, WEIGHTS_FILE};
use super::forward::text_forward;
use super::weights::ClipTextWeights;

/// CLIP text tower ready for inference.
///
/// Built once at startup by [`ClipTextModel::load`] and never mutated
/// afterwards, so a single instance can serve concurrent requests.
pub struct ClipTextModel {
    weights: ClipTextWeights,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    max_tokens: usize,
}

impl std::fmt::Debug for ClipTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipTextModel")
            .field("model_id", &self.model_id)
            .field("device", &self.device)
            .field("max_tokens", &self.max_tokens)
            .field("config", &self.weights.config)
            .finish_non_exhaustive()
    }
}

impl ClipTextModel {
    /// Load config, tokenizer and weights from `model_dir` onto `device`.
    ///
    /// The directory must contain `tokenizer.json` and `model.safetensors`;
    /// `config.json` is optional.
    ///
    /// # Errors
    ///
    /// - `EmbeddingError::ModelLoad` if a file is missing or unreadable
    /// - `EmbeddingError::Tensor` if a weight is missing or has the wrong shape
    pub fn load(model_dir: &Path, device: &Device) -> EmbeddingResult<Self> {
        tracing::info!(
            target: "image_search_embeddings::clip",
            model_dir = %model_dir.display(),
            device = ?device,
            "Loading CLIP text model..."
        );

        let config = ClipTextConfig::from_model_dir(model_dir)?;

        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            tracing::error!(
                target: "image_search_embeddings::clip",
                error = %e,
                tokenizer_path = %tokenizer_path.display(),
                "CLIP tokenizer load FAILED"
            );
            EmbeddingError::model_load(&tokenizer_path, e.to_string())
        })?;

        let weights_path = model_dir.join(WEIGHTS_FILE);
        if !weights_path.is_file() {
            return Err(EmbeddingError::model_load(
                &weights_path,
                "weights file not found",
            ));
        }

        // SAFETY: the file is memory-mapped read-only and not modified while the model lives.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, device)
        }
        .map_err(|e| EmbeddingError::model_load(&weights_path, e.to_string()))?;

        let weights = ClipTextWeights::load(&vb, &config)?;

        let model_id = format!(
            "clip-text:{}",
            model_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "local".to_string())
        );

        tracing::info!(
            target: "image_search_embeddings::clip",
            model_id = %model_id,
            dimension = config.projection_dim,
            layers = config.num_hidden_layers,
            params = weights.param_count(),
            "CLIP text model loaded"
        );

        Ok(Self {
            max_tokens: config.max_position_embeddings,
            weights,
            tokenizer,
            device: device.clone(),
            model_id,
        })
    }

    /// Truncate tokenized text to `max_tokens`, never beyond the context window.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        let window = self.weights.config.max_position_embeddings;
        if max_tokens > window {
            tracing::warn!(
                target: "image_search_embeddings::clip",
                requested = max_tokens,
                window,
                "max_tokens exceeds the context window, clamping"
            );
        }
        self.max_tokens = max_tokens.min(window).max(1);
        self
    }

    /// Encode text into a unit-length vector of [`dimension`](Self::dimension) values.
    ///
    /// Text longer than the context window is truncated, keeping the end token.
    pub fn encode(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("text is empty".into()));
        }
        let ids = self.tokenize(text)?;
        self.encode_ids(&ids)
    }

    /// Run the forward pass on pre-tokenized ids (start token first, end token last).
    pub fn encode_ids(&self, ids: &[u32]) -> EmbeddingResult<Vec<f32>> {
        let config = &self.weights.config;
        if ids.is_empty() {
            return Err(EmbeddingError::InvalidInput("token sequence is empty".into()));
        }
        if ids.len() > config.max_position_embeddings {
            return Err(EmbeddingError::InvalidInput(format!(
                "{} tokens exceed the context window of {}",
                ids.len(),
                config.max_position_embeddings
            )));
        }
        if let Some(bad) = ids.iter().find(|&&id| id as usize >= config.vocab_size) {
            return Err(EmbeddingError::InvalidInput(format!(
                "token id {} outside vocabulary of {}",
                bad, config.vocab_size
            )));
        }

        let vector = text_forward(ids, &self.weights, &self.device)?;
        if vector.len() != self.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    /// Tokenize with start/end tokens, truncating to [`max_tokens`](Self::max_tokens).
    pub fn tokenize(&self, text: &str) -> EmbeddingResult<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

        let mut ids = encoding.get_ids().to_vec();
        let max = self.max_tokens;
        if ids.len() > max {
            // The end token carries the sequence embedding; keep it in the last slot.
            let eos = ids[ids.len() - 1];
            ids.truncate(max);
            ids[max - 1] = eos;
        }
        Ok(ids)
    }

    pub fn dimension(&self) -> usize {
        self.weights.config.projection_dim
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn config(&self) -> &ClipTextConfig {
        &self.weights.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// CPU, or CUDA device 0 when `use_gpu` is set and CUDA is available.
pub fn select_device(use_gpu: bool) -> Device {
    if !use_gpu {
        return Device::Cpu;
    }
    match Device::cuda_if_available(0) {
        Ok(device) => {
            if device.is_cpu() {
                tracing::warn!(
                    target: "image_search_embeddings::clip",
                    "GPU requested but CUDA is not available, using CPU"
                );
            }
            device
        }
        Err(e) => {
            tracing::warn!(
                target: "image_search_embeddings::clip",
                error = %e,
                "CUDA device creation failed, using CPU"
            );
            Device::Cpu
        }
    }
}
