//! Text encoder forward pass.
//!
//! 1. Token embeddings + position embeddings
//! 2. Pre-norm transformer layers under a causal mask
//! 3. Final layer norm
//! 4. Hidden state at the EOS position (last token)
//! 5. Text projection and L2 normalization
//!
//! The sequence is not padded: under a causal mask, padding after the EOS
//! token cannot change the EOS hidden state.

use candle_core::{Device, Tensor};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::ops::normalize;

use super::attention::{create_causal_mask, self_attention};
use super::layer_norm::layer_norm;
use super::mlp::mlp;
use super::weights::{ClipLayerWeights, ClipTextWeights};

/// Run the text tower over `ids` (already tokenized, EOS last).
///
/// Callers guarantee `1 <= ids.len() <= max_position_embeddings` and
/// that every id is inside the vocabulary.
pub(crate) fn text_forward(
    ids: &[u32],
    weights: &ClipTextWeights,
    device: &Device,
) -> EmbeddingResult<Vec<f32>> {
    let config = &weights.config;
    let seq_len = ids.len();

    let input_ids =
        Tensor::new(ids, device).map_err(EmbeddingError::tensor("Input tensor creation"))?;

    // [seq_len, hidden_size]
    let token_emb = weights
        .token_embedding
        .index_select(&input_ids, 0)
        .map_err(EmbeddingError::tensor("Token embedding lookup"))?;
    let position_emb = weights
        .position_embedding
        .narrow(0, 0, seq_len)
        .map_err(EmbeddingError::tensor("Position embedding slice"))?;

    // [1, seq_len, hidden_size]
    let mut hidden_states = (token_emb + position_emb)
        .and_then(|h| h.unsqueeze(0))
        .map_err(EmbeddingError::tensor("Embedding addition"))?;

    let causal_mask = create_causal_mask(seq_len, device)?;
    for layer in &weights.layers {
        hidden_states = transformer_layer(&hidden_states, layer, weights, &causal_mask)?;
    }

    let hidden_states = layer_norm(
        &hidden_states,
        &weights.final_layer_norm_weight,
        &weights.final_layer_norm_bias,
        config.layer_norm_eps,
    )?;

    // [1, hidden_size]
    let eos_hidden = hidden_states
        .narrow(1, seq_len - 1, 1)
        .and_then(|t| t.squeeze(1))
        .map_err(EmbeddingError::tensor("EOS extraction"))?;

    // [1, projection_dim]
    let projected = weights
        .text_projection
        .t()
        .and_then(|proj_t| eos_hidden.matmul(&proj_t))
        .map_err(EmbeddingError::tensor("Text projection"))?;

    normalize(&projected)
        .and_then(|n| n.squeeze(0))
        .and_then(|n| n.to_vec1::<f32>())
        .map_err(EmbeddingError::tensor("L2 normalization"))
}

fn transformer_layer(
    hidden_states: &Tensor,
    layer: &ClipLayerWeights,
    weights: &ClipTextWeights,
    causal_mask: &Tensor,
) -> EmbeddingResult<Tensor> {
    let config = &weights.config;

    let normed = layer_norm(
        hidden_states,
        &layer.layer_norm1_weight,
        &layer.layer_norm1_bias,
        config.layer_norm_eps,
    )?;
    let attn_output = self_attention(
        &normed,
        &layer.attention,
        config.num_attention_heads,
        Some(causal_mask),
    )?;
    let hidden_states = (hidden_states + attn_output)
        .map_err(EmbeddingError::tensor("Attention residual"))?;

    let normed = layer_norm(
        &hidden_states,
        &layer.layer_norm2_weight,
        &layer.layer_norm2_bias,
        config.layer_norm_eps,
    )?;
    let mlp_output = mlp(&normed, &layer.mlp, config.hidden_act)?;

    (hidden_states + mlp_output).map_err(EmbeddingError::tensor("MLP residual"))
}
