//! Vector storage for image search.
//!
//! Implements the core [`VectorStore`](image_search_core::traits::VectorStore)
//! trait over Postgres with the pgvector extension. The table is owned by the
//! ingestion side; this crate only reads it:
//!
//! ```sql
//! CREATE TABLE image_embeddings (file_name TEXT, embedding vector(512));
//! ```
//!
//! Similarity is pgvector's negative inner product (`<#>`), ascending.

pub mod error;
pub mod pgvector;
pub mod vector_text;

pub use error::StorageError;
pub use pgvector::PgVectorStore;
pub use vector_text::{format_vector, parse_vector};
