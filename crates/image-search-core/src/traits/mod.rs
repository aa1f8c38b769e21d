//! Core trait definitions for the external collaborators.

mod text_encoder;
mod vector_store;

pub use text_encoder::TextEncoder;
pub use vector_store::VectorStore;
