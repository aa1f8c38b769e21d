//! Test utilities for the image-search workspace.
//!
//! - [`corpus`]: deterministic `img1..imgN` corpora with unit-length embeddings
//! - [`adapters`]: encoders and stores that fail, count calls or misbehave

pub mod adapters;
pub mod corpus;

pub use adapters::{
    CountingTextEncoder, ExclusionBlindVectorStore, FailingTextEncoder, MappedTextEncoder, UnavailableVectorStore,
    UnrulyVectorStore,
};
pub use corpus::{generate_unit_vector, Corpus};
