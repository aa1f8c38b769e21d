//! Multi-head self-attention for the CLIP text transformer.
//!
//! Projections use the flatten/reshape pattern (2D matmul) and every
//! transpose is followed by `contiguous()` before it feeds a matmul.

use candle_core::{Tensor, D};

use crate::error::{EmbeddingError, EmbeddingResult};

use super::weights::ClipAttentionWeights;

/// Multi-head self-attention over `[batch, seq, hidden]` with an optional additive mask.
pub fn self_attention(
    hidden_states: &Tensor,
    weights: &ClipAttentionWeights,
    num_heads: usize,
    mask: Option<&Tensor>,
) -> EmbeddingResult<Tensor> {
    let (batch, seq_len, hidden_size) = hidden_states
        .dims3()
        .map_err(EmbeddingError::tensor("Attention dims3"))?;
    let head_dim = hidden_size / num_heads;

    let hidden_flat = hidden_states
        .reshape((batch * seq_len, hidden_size))
        .map_err(EmbeddingError::tensor("Attention flatten"))?;

    let split_heads = |proj: Tensor, name: &'static str| -> EmbeddingResult<Tensor> {
        proj.reshape((batch, seq_len, num_heads, head_dim))
            .and_then(|t| t.transpose(1, 2))
            .and_then(|t| t.contiguous())
            .map_err(EmbeddingError::tensor(name))
    };

    let q = split_heads(
        linear(&hidden_flat, &weights.q_proj_weight, &weights.q_proj_bias, "Q projection")?,
        "Q head split",
    )?;
    let k = split_heads(
        linear(&hidden_flat, &weights.k_proj_weight, &weights.k_proj_bias, "K projection")?,
        "K head split",
    )?;
    let v = split_heads(
        linear(&hidden_flat, &weights.v_proj_weight, &weights.v_proj_bias, "V projection")?,
        "V head split",
    )?;

    let k_t = k
        .transpose(2, 3)
        .and_then(|t| t.contiguous())
        .map_err(EmbeddingError::tensor("K transpose"))?;

    // [batch, heads, seq, seq]
    let scale = (head_dim as f64).sqrt();
    let scores = q
        .matmul(&k_t)
        .and_then(|s| s / scale)
        .map_err(EmbeddingError::tensor("Attention scores"))?;
    let scores = match mask {
        Some(m) => scores
            .broadcast_add(m)
            .map_err(EmbeddingError::tensor("Mask addition"))?,
        None => scores,
    };
    let probs = candle_nn::ops::softmax(&scores, D::Minus1)
        .map_err(EmbeddingError::tensor("Softmax"))?;

    let context = probs
        .matmul(&v)
        .and_then(|c| c.transpose(1, 2))
        .and_then(|c| c.contiguous())
        .and_then(|c| c.reshape((batch * seq_len, hidden_size)))
        .map_err(EmbeddingError::tensor("Attention context"))?;

    linear(
        &context,
        &weights.out_proj_weight,
        &weights.out_proj_bias,
        "Output projection",
    )?
    .reshape((batch, seq_len, hidden_size))
    .map_err(EmbeddingError::tensor("Output reshape"))
}

/// `x @ W^T + b` for a flattened `[rows, in]` input and a `[out, in]` weight.
pub(crate) fn linear(
    input: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    name: &'static str,
) -> EmbeddingResult<Tensor> {
    weight
        .t()
        .and_then(|w_t| input.matmul(&w_t))
        .and_then(|out| out.broadcast_add(bias))
        .map_err(EmbeddingError::tensor(name))
}

/// Additive causal mask `[1, 1, seq, seq]`: 0 where attending is allowed, -inf above the diagonal.
pub fn create_causal_mask(
    seq_len: usize,
    device: &candle_core::Device,
) -> EmbeddingResult<Tensor> {
    let mask: Vec<f32> = (0..seq_len)
        .flat_map(|i| (0..seq_len).map(move |j| if j <= i { 0.0 } else { f32::NEG_INFINITY }))
        .collect();

    Tensor::from_slice(&mask, (1, 1, seq_len, seq_len), device)
        .map_err(EmbeddingError::tensor("Causal mask creation"))
}
