//! CLIP text encoder configuration.
//!
//! Defaults describe the text tower of clip-vit-large-patch14. Real
//! checkpoints ship a HuggingFace `config.json`, which overrides them.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{EmbeddingError, EmbeddingResult};

use super::constants::{CLIP_MAX_TOKENS, CLIP_VOCAB_SIZE, CONFIG_FILE};

/// MLP activation of the transformer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `x * sigmoid(1.702 * x)`, used by the OpenAI checkpoints.
    QuickGelu,
    /// Exact (erf) GELU.
    Gelu,
}

/// CLIP text encoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTextConfig {
    /// Vocabulary size (49408 for CLIP).
    pub vocab_size: usize,
    /// Hidden layer size.
    pub hidden_size: usize,
    /// Number of transformer layers.
    pub num_hidden_layers: usize,
    /// Number of attention heads.
    pub num_attention_heads: usize,
    /// Intermediate FFN size.
    pub intermediate_size: usize,
    /// Maximum sequence length (77 tokens).
    pub max_position_embeddings: usize,
    /// Layer normalization epsilon.
    pub layer_norm_eps: f64,
    /// Output dimension of the text projection.
    pub projection_dim: usize,
    pub hidden_act: Activation,
}

impl Default for ClipTextConfig {
    fn default() -> Self {
        Self {
            vocab_size: CLIP_VOCAB_SIZE,
            hidden_size: 768,
            num_hidden_layers: 12,
            num_attention_heads: 12,
            intermediate_size: 3072,
            max_position_embeddings: CLIP_MAX_TOKENS,
            layer_norm_eps: 1e-5,
            projection_dim: 768,
            hidden_act: Activation::QuickGelu,
        }
    }
}

/// Text tower fields as written by HuggingFace; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct HfTextConfig {
    vocab_size: Option<usize>,
    hidden_size: Option<usize>,
    num_hidden_layers: Option<usize>,
    num_attention_heads: Option<usize>,
    intermediate_size: Option<usize>,
    max_position_embeddings: Option<usize>,
    layer_norm_eps: Option<f64>,
    projection_dim: Option<usize>,
    hidden_act: Option<Activation>,
}

impl ClipTextConfig {
    /// Read `config.json` from `model_dir`, falling back to defaults if it is absent.
    ///
    /// Accepts both full CLIP configs (`text_config` + top-level
    /// `projection_dim`) and text-only configs with the fields at the top level.
    pub fn from_model_dir(model_dir: &Path) -> EmbeddingResult<Self> {
        let path = model_dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::warn!(
                target: "image_search_embeddings::clip",
                path = %path.display(),
                "config.json not found, using default CLIP text configuration"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_json(&content)
            .map_err(|e| EmbeddingError::model_load(&path, e.to_string()))?;
        Ok(config)
    }

    /// Parse a HuggingFace config document.
    pub fn from_json(content: &str) -> EmbeddingResult<Self> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| EmbeddingError::InvalidInput(format!("config.json: {}", e)))?;

        let text_value = root.get("text_config").cloned().unwrap_or_else(|| root.clone());
        let text: HfTextConfig = serde_json::from_value(text_value)
            .map_err(|e| EmbeddingError::InvalidInput(format!("config.json text_config: {}", e)))?;
        let top_level_projection = root.get("projection_dim").and_then(Value::as_u64);

        let defaults = Self::default();
        let config = Self {
            vocab_size: text.vocab_size.unwrap_or(defaults.vocab_size),
            hidden_size: text.hidden_size.unwrap_or(defaults.hidden_size),
            num_hidden_layers: text.num_hidden_layers.unwrap_or(defaults.num_hidden_layers),
            num_attention_heads: text.num_attention_heads.unwrap_or(defaults.num_attention_heads),
            intermediate_size: text.intermediate_size.unwrap_or(defaults.intermediate_size),
            max_position_embeddings: text
                .max_position_embeddings
                .unwrap_or(defaults.max_position_embeddings),
            layer_norm_eps: text.layer_norm_eps.unwrap_or(defaults.layer_norm_eps),
            projection_dim: top_level_projection
                .map(|p| p as usize)
                .or(text.projection_dim)
                .unwrap_or(defaults.projection_dim),
            hidden_act: text.hidden_act.unwrap_or(defaults.hidden_act),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.hidden_size == 0 || self.num_attention_heads == 0 {
            return Err(EmbeddingError::InvalidInput(
                "hidden_size and num_attention_heads must be greater than 0".into(),
            ));
        }
        if self.hidden_size % self.num_attention_heads != 0 {
            return Err(EmbeddingError::InvalidInput(format!(
                "hidden_size {} is not divisible by num_attention_heads {}",
                self.hidden_size, self.num_attention_heads
            )));
        }
        if self.vocab_size == 0 || self.max_position_embeddings == 0 || self.projection_dim == 0 {
            return Err(EmbeddingError::InvalidInput(
                "vocab_size, max_position_embeddings and projection_dim must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_clip_config() {
        let json = r#"{
            "projection_dim": 512,
            "text_config": {
                "hidden_size": 512,
                "intermediate_size": 2048,
                "num_attention_heads": 8,
                "num_hidden_layers": 12,
                "hidden_act": "quick_gelu",
                "bos_token_id": 49406,
                "eos_token_id": 49407
            },
            "vision_config": { "hidden_size": 768, "patch_size": 32 }
        }"#;

        let config = ClipTextConfig::from_json(json).unwrap();
        assert_eq!(config.hidden_size, 512);
        assert_eq!(config.projection_dim, 512);
        assert_eq!(config.num_attention_heads, 8);
        assert_eq!(config.head_dim(), 64);
        // Unspecified fields keep their defaults.
        assert_eq!(config.vocab_size, 49408);
        assert_eq!(config.max_position_embeddings, 77);
    }

    #[test]
    fn test_text_only_config() {
        let json = r#"{"hidden_size": 768, "projection_dim": 768, "hidden_act": "gelu"}"#;
        let config = ClipTextConfig::from_json(json).unwrap();
        assert_eq!(config.projection_dim, 768);
        assert_eq!(config.hidden_act, Activation::Gelu);
    }

    #[test]
    fn test_rejects_indivisible_heads() {
        let json = r#"{"text_config": {"hidden_size": 100, "num_attention_heads": 8}}"#;
        assert!(matches!(
            ClipTextConfig::from_json(json),
            Err(EmbeddingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_activation() {
        let json = r#"{"text_config": {"hidden_act": "swish"}}"#;
        assert!(ClipTextConfig::from_json(json).is_err());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClipTextConfig::from_model_dir(dir.path()).unwrap();
        assert_eq!(config, ClipTextConfig::default());
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert!(matches!(
            ClipTextConfig::from_model_dir(dir.path()),
            Err(EmbeddingError::ModelLoad { .. })
        ));
    }
}
