//! Retrieval pipeline: query resolution and ranking.
//!
//! - [`QueryOrchestrator`]: mode dispatch and failure normalization
//! - [`RetrievalEngine`]: ranking, exclusion and cap policy

mod engine;
mod orchestrator;

pub use engine::RetrievalEngine;
pub use orchestrator::QueryOrchestrator;
