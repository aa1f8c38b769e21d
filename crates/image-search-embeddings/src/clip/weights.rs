//! CLIP text encoder weights and their safetensors loading.
//!
//! Tensor names follow the HuggingFace `CLIPModel` /
//! `CLIPTextModelWithProjection` layout (`text_model.*`, `text_projection.weight`).

use candle_core::Tensor;
use candle_nn::VarBuilder;

use crate::error::{EmbeddingError, EmbeddingResult};

use super::config::ClipTextConfig;

/// Attention weights for a single layer. Linear weights are `[out, in]`.
#[derive(Debug)]
pub struct ClipAttentionWeights {
    pub q_proj_weight: Tensor,
    pub q_proj_bias: Tensor,
    pub k_proj_weight: Tensor,
    pub k_proj_bias: Tensor,
    pub v_proj_weight: Tensor,
    pub v_proj_bias: Tensor,
    pub out_proj_weight: Tensor,
    pub out_proj_bias: Tensor,
}

/// MLP weights for a single layer.
#[derive(Debug)]
pub struct ClipMlpWeights {
    /// FC1: [intermediate_size, hidden_size]
    pub fc1_weight: Tensor,
    pub fc1_bias: Tensor,
    /// FC2: [hidden_size, intermediate_size]
    pub fc2_weight: Tensor,
    pub fc2_bias: Tensor,
}

/// One pre-norm transformer layer.
#[derive(Debug)]
pub struct ClipLayerWeights {
    pub attention: ClipAttentionWeights,
    pub mlp: ClipMlpWeights,
    /// Layer norm before attention.
    pub layer_norm1_weight: Tensor,
    pub layer_norm1_bias: Tensor,
    /// Layer norm before MLP.
    pub layer_norm2_weight: Tensor,
    pub layer_norm2_bias: Tensor,
}

/// Complete text encoder weights.
#[derive(Debug)]
pub struct ClipTextWeights {
    pub config: ClipTextConfig,
    /// Word embeddings: [vocab_size, hidden_size]
    pub token_embedding: Tensor,
    /// Position embeddings: [max_position, hidden_size]
    pub position_embedding: Tensor,
    pub layers: Vec<ClipLayerWeights>,
    pub final_layer_norm_weight: Tensor,
    pub final_layer_norm_bias: Tensor,
    /// Text projection (no bias): [projection_dim, hidden_size]
    pub text_projection: Tensor,
}

impl ClipTextWeights {
    /// Load and shape-check every text tower tensor from `vb`.
    pub fn load(vb: &VarBuilder, config: &ClipTextConfig) -> EmbeddingResult<Self> {
        let prefix = "text_model";
        let h = config.hidden_size;

        let token_embedding = get_tensor(
            vb,
            &format!("{}.embeddings.token_embedding.weight", prefix),
            &[config.vocab_size, h],
        )?;
        let position_embedding = get_tensor(
            vb,
            &format!("{}.embeddings.position_embedding.weight", prefix),
            &[config.max_position_embeddings, h],
        )?;

        let layers = (0..config.num_hidden_layers)
            .map(|idx| {
                load_layer(
                    vb,
                    &format!("{}.encoder.layers.{}", prefix, idx),
                    h,
                    config.intermediate_size,
                )
            })
            .collect::<EmbeddingResult<Vec<_>>>()?;

        let final_layer_norm_weight =
            get_tensor(vb, &format!("{}.final_layer_norm.weight", prefix), &[h])?;
        let final_layer_norm_bias =
            get_tensor(vb, &format!("{}.final_layer_norm.bias", prefix), &[h])?;

        let text_projection =
            get_tensor(vb, "text_projection.weight", &[config.projection_dim, h])?;

        Ok(Self {
            config: config.clone(),
            token_embedding,
            position_embedding,
            layers,
            final_layer_norm_weight,
            final_layer_norm_bias,
            text_projection,
        })
    }

    /// Total parameter count.
    pub fn param_count(&self) -> usize {
        let layer_params: usize = self
            .layers
            .iter()
            .map(|l| {
                [
                    &l.attention.q_proj_weight,
                    &l.attention.q_proj_bias,
                    &l.attention.k_proj_weight,
                    &l.attention.k_proj_bias,
                    &l.attention.v_proj_weight,
                    &l.attention.v_proj_bias,
                    &l.attention.out_proj_weight,
                    &l.attention.out_proj_bias,
                    &l.mlp.fc1_weight,
                    &l.mlp.fc1_bias,
                    &l.mlp.fc2_weight,
                    &l.mlp.fc2_bias,
                    &l.layer_norm1_weight,
                    &l.layer_norm1_bias,
                    &l.layer_norm2_weight,
                    &l.layer_norm2_bias,
                ]
                .iter()
                .map(|t| t.elem_count())
                .sum::<usize>()
            })
            .sum();

        self.token_embedding.elem_count()
            + self.position_embedding.elem_count()
            + self.final_layer_norm_weight.elem_count()
            + self.final_layer_norm_bias.elem_count()
            + self.text_projection.elem_count()
            + layer_params
    }
}

fn load_layer(
    vb: &VarBuilder,
    prefix: &str,
    h: usize,
    i: usize,
) -> EmbeddingResult<ClipLayerWeights> {
    let attn = |name: &str, shape: &[usize]| {
        get_tensor(vb, &format!("{}.self_attn.{}", prefix, name), shape)
    };

    let attention = ClipAttentionWeights {
        q_proj_weight: attn("q_proj.weight", &[h, h])?,
        q_proj_bias: attn("q_proj.bias", &[h])?,
        k_proj_weight: attn("k_proj.weight", &[h, h])?,
        k_proj_bias: attn("k_proj.bias", &[h])?,
        v_proj_weight: attn("v_proj.weight", &[h, h])?,
        v_proj_bias: attn("v_proj.bias", &[h])?,
        out_proj_weight: attn("out_proj.weight", &[h, h])?,
        out_proj_bias: attn("out_proj.bias", &[h])?,
    };

    let mlp = ClipMlpWeights {
        fc1_weight: get_tensor(vb, &format!("{}.mlp.fc1.weight", prefix), &[i, h])?,
        fc1_bias: get_tensor(vb, &format!("{}.mlp.fc1.bias", prefix), &[i])?,
        fc2_weight: get_tensor(vb, &format!("{}.mlp.fc2.weight", prefix), &[h, i])?,
        fc2_bias: get_tensor(vb, &format!("{}.mlp.fc2.bias", prefix), &[h])?,
    };

    Ok(ClipLayerWeights {
        attention,
        mlp,
        layer_norm1_weight: get_tensor(vb, &format!("{}.layer_norm1.weight", prefix), &[h])?,
        layer_norm1_bias: get_tensor(vb, &format!("{}.layer_norm1.bias", prefix), &[h])?,
        layer_norm2_weight: get_tensor(vb, &format!("{}.layer_norm2.weight", prefix), &[h])?,
        layer_norm2_bias: get_tensor(vb, &format!("{}.layer_norm2.bias", prefix), &[h])?,
    })
}

/// Get a tensor from the VarBuilder, failing if it is missing or has another shape.
fn get_tensor(vb: &VarBuilder, name: &str, expected_shape: &[usize]) -> EmbeddingResult<Tensor> {
    vb.get(expected_shape, name).map_err(|e| EmbeddingError::Tensor {
        message: format!("Failed to load weight '{}': {}", name, e),
    })
}
