//! Text encoder trait: text in, query vector out.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Embedding;

/// Converts text into a fixed-dimension embedding.
///
/// Implementations must be deterministic for the same text and model
/// version. The encoder is loaded once and shared read-only across
/// requests, so implementations hold no per-request state.
///
/// # Example
///
/// ```
/// use image_search_core::stubs::StubTextEncoder;
/// use image_search_core::traits::TextEncoder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let encoder = StubTextEncoder::with_dimension(16);
/// let vector = encoder.encode("red car").await.unwrap();
/// assert_eq!(vector.dimension(), encoder.dimension());
/// # }
/// ```
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encode `text` into an embedding.
    ///
    /// # Errors
    ///
    /// - `CoreError::EncodingFailure` if the model cannot produce a vector
    async fn encode(&self, text: &str) -> CoreResult<Embedding>;

    /// Output dimension of every embedding this encoder produces.
    fn dimension(&self) -> usize;

    /// Model identifier, for logging.
    fn model_id(&self) -> &str;
}
