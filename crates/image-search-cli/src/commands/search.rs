//! `search`: images matching a free-text description.
//!
//! Words are joined with single spaces, so `image-search search red car`
//! and `image-search search "red car"` issue the same query. Failures
//! degrade to an empty result with exit code 0; the reason is logged.

use clap::Args;
use image_search_core::retrieval::QueryOrchestrator;
use image_search_core::types::Query;
use super::output::{emit, log_outcome, render, OutputOptions};

/// Arguments for the search command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Description of the images to find
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Output as JSON instead of one identifier per line
    #[arg(long)]
    pub json: bool,

    /// Include the store-reported distance of each result
    #[arg(long)]
    pub distances: bool,
}

impl SearchArgs {
    pub fn query(&self) -> Query {
        Query::text(self.text.join(" "))
    }

    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            distances: self.distances,
        }
    }
}

pub async fn handle_search(orchestrator: &QueryOrchestrator, args: SearchArgs) -> i32 {
    let query = args.query();
    let outcome = orchestrator.search_ranked(&query).await;

    log_outcome("text", &outcome);

    emit(&render(&outcome, query.echo(), args.output()));
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_joined() {
        let args = SearchArgs {
            text: vec!["red".into(), "car".into()],
            json: false,
            distances: false,
        };
        assert_eq!(args.query(), Query::text("red car"));
    }
}
