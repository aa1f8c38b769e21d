//! Feed-forward block of the CLIP text transformer.

use candle_core::Tensor;

use crate::error::{EmbeddingError, EmbeddingResult};

use super::attention::linear;
use super::config::Activation;
use super::weights::ClipMlpWeights;

/// FC1 -> activation -> FC2 over `[batch, seq, hidden]`.
pub fn mlp(
    hidden_states: &Tensor,
    weights: &ClipMlpWeights,
    activation: Activation,
) -> EmbeddingResult<Tensor> {
    let (batch, seq_len, hidden_size) = hidden_states
        .dims3()
        .map_err(EmbeddingError::tensor("MLP dims3"))?;

    let hidden_flat = hidden_states
        .reshape((batch * seq_len, hidden_size))
        .map_err(EmbeddingError::tensor("MLP flatten"))?;

    let hidden = linear(&hidden_flat, &weights.fc1_weight, &weights.fc1_bias, "FC1")?;
    let hidden = activate(&hidden, activation)?;
    let output = linear(&hidden, &weights.fc2_weight, &weights.fc2_bias, "FC2")?;

    output
        .reshape((batch, seq_len, hidden_size))
        .map_err(EmbeddingError::tensor("MLP reshape"))
}

fn activate(hidden: &Tensor, activation: Activation) -> EmbeddingResult<Tensor> {
    match activation {
        // x * sigmoid(1.702 * x)
        Activation::QuickGelu => (hidden * 1.702)
            .and_then(|scaled| candle_nn::ops::sigmoid(&scaled))
            .and_then(|gate| hidden * gate)
            .map_err(EmbeddingError::tensor("QuickGELU")),
        Activation::Gelu => hidden.gelu_erf().map_err(EmbeddingError::tensor("GELU")),
    }
}
