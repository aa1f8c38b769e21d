//! Dense embedding vector type.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Fixed-length dense vector representing an item or a text query.
///
/// Every embedding of a corpus has the same dimensionality. Construction
/// rejects empty vectors and non-finite components, so any `Embedding`
/// in hand is safe to pass to a distance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Create an embedding, validating its components.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidVector` if `values` is empty or holds NaN/Inf
    pub fn new(values: Vec<f32>) -> CoreResult<Self> {
        if values.is_empty() {
            return Err(CoreError::InvalidVector("embedding is empty".into()));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(CoreError::InvalidVector(format!(
                "non-finite value {} at index {}",
                values[pos], pos
            )));
        }
        Ok(Self(values))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Fail with `DimensionMismatch` unless this embedding has `expected` components.
    pub fn ensure_dimension(&self, expected: usize) -> CoreResult<()> {
        if self.dimension() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: self.dimension(),
            });
        }
        Ok(())
    }

    /// Inner product accumulated in f64.
    pub fn inner_product(&self, other: &Embedding) -> CoreResult<f64> {
        other.ensure_dimension(self.dimension())?;
        Ok(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum())
    }

    /// Negative inner product, the ranking distance (smaller = more similar).
    ///
    /// Matches pgvector's `<#>` operator.
    pub fn negative_inner_product(&self, other: &Embedding) -> CoreResult<f64> {
        self.inner_product(other).map(|ip| -ip)
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = CoreError;

    fn try_from(values: Vec<f32>) -> CoreResult<Self> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        let err = Embedding::new(vec![]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidVector(_)));
    }

    #[test]
    fn test_rejects_nan_and_inf() {
        assert!(Embedding::new(vec![0.1, f32::NAN]).is_err());
        assert!(Embedding::new(vec![f32::INFINITY, 0.1]).is_err());
    }

    #[test]
    fn test_negative_inner_product() {
        let a = Embedding::new(vec![1.0, 2.0, 3.0]).unwrap();
        let b = Embedding::new(vec![4.0, -5.0, 6.0]).unwrap();

        // 4 - 10 + 18 = 12
        assert!((a.inner_product(&b).unwrap() - 12.0).abs() < 1e-9);
        assert!((a.negative_inner_product(&b).unwrap() + 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_dimensions_fail_fast() {
        let a = Embedding::new(vec![1.0, 0.0]).unwrap();
        let b = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();

        match a.inner_product(&b) {
            Err(CoreError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Embedding = serde_json::from_str("[0.5, -0.5]").unwrap();
        assert_eq!(ok.dimension(), 2);

        assert!(serde_json::from_str::<Embedding>("[]").is_err());
    }
}
