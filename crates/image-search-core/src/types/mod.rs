//! Domain types for the similarity-query core.

mod embedding;
mod item;
mod query;
mod result;

pub use embedding::Embedding;
pub use item::ItemId;
pub use query::Query;
pub use result::{EmptyReason, Neighbor, SearchOutcome, SearchResponse};

/// Maximum number of identifiers returned for a single query.
pub const RESULT_CAP: usize = 30;
