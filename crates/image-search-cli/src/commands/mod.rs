//! CLI command handlers
//!
//! # Modules
//!
//! - `search`: free-text similarity search
//! - `neighbors`: images similar to a stored exemplar
//! - `output`: rendering shared by both commands

pub mod neighbors;
pub mod output;
pub mod search;
