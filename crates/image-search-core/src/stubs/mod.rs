//! Stub adapters for development and testing.
//!
//! These let the full query pipeline run without model files or a
//! database. The CLI selects them with `embedding.backend = "stub"` and
//! `storage.backend = "memory"`.

mod encoder_stub;
mod memory_store;

pub use encoder_stub::{StubTextEncoder, STUB_DIMENSION};
pub use memory_store::InMemoryVectorStore;
