//! Layer normalization over the last dimension.

use candle_core::{Tensor, D};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Layer normalization for `[batch, seq, hidden]` tensors.
pub fn layer_norm(
    hidden_states: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    eps: f64,
) -> EmbeddingResult<Tensor> {
    let mean = hidden_states
        .mean_keepdim(D::Minus1)
        .map_err(EmbeddingError::tensor("LayerNorm mean"))?;
    let centered = hidden_states
        .broadcast_sub(&mean)
        .map_err(EmbeddingError::tensor("LayerNorm center"))?;
    let var = centered
        .sqr()
        .and_then(|sq| sq.mean_keepdim(D::Minus1))
        .map_err(EmbeddingError::tensor("LayerNorm variance"))?;

    let std = (var + eps)
        .and_then(|v| v.sqrt())
        .map_err(EmbeddingError::tensor("LayerNorm std"))?;

    centered
        .broadcast_div(&std)
        .and_then(|n| n.broadcast_mul(weight))
        .and_then(|n| n.broadcast_add(bias))
        .map_err(EmbeddingError::tensor("LayerNorm affine"))
}
