//! Image Search Core Library
//!
//! Provides the similarity-query core for retrieving visually or
//! semantically similar images from a fixed corpus.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`ItemId`, `Embedding`, `Query`, `Neighbor`, `SearchResponse`)
//! - Adapter traits (`TextEncoder`, `VectorStore`)
//! - The retrieval pipeline (`RetrievalEngine`, `QueryOrchestrator`)
//! - Error types and result aliases
//! - Configuration structures
//! - Stub adapters for development and tests (`StubTextEncoder`, `InMemoryVectorStore`)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use image_search_core::retrieval::QueryOrchestrator;
//! use image_search_core::stubs::{InMemoryVectorStore, StubTextEncoder};
//! use image_search_core::types::Query;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let orchestrator = QueryOrchestrator::new(
//!     Arc::new(StubTextEncoder::with_dimension(8)),
//!     Arc::new(InMemoryVectorStore::new()),
//! );
//!
//! // Blank text never reaches the encoder or the store.
//! let response = orchestrator.search(&Query::text("   ")).await;
//! assert!(response.results.is_empty());
//! # }
//! ```

pub mod config;
pub mod error;
pub mod retrieval;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use retrieval::{QueryOrchestrator, RetrievalEngine};
pub use traits::{TextEncoder, VectorStore};
pub use types::{
    Embedding, EmptyReason, ItemId, Neighbor, Query, SearchOutcome, SearchResponse, RESULT_CAP,
};
