//! Tensor operations shared by encoders.

use candle_core::{Tensor, D};

/// Normalize a tensor to unit length along its last dimension (L2 normalization).
///
/// # Formula
///
/// `normalized = tensor / (||tensor||_2 + 1e-12)`
pub fn normalize(tensor: &Tensor) -> candle_core::Result<Tensor> {
    let norm = tensor.sqr()?.sum_keepdim(D::Minus1)?.sqrt()?;
    tensor.broadcast_div(&(norm + 1e-12)?)
}
