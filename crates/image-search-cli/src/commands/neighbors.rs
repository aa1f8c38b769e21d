//! `neighbors`: images similar to a stored exemplar.
//!
//! The exemplar itself never appears in its own results.

use clap::Args;
use image_search_core::retrieval::QueryOrchestrator;
use image_search_core::types::Query;
use tracing::debug;

use super::output::{emit, log_outcome, render, OutputOptions};

/// Arguments for the neighbors command.
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Identifier (file name) of the exemplar image
    pub file_name: String,

    /// Output as JSON instead of one identifier per line
    #[arg(long)]
    pub json: bool,

    /// Include the store-reported distance of each result
    #[arg(long)]
    pub distances: bool,
}

pub async fn handle_neighbors(orchestrator: &QueryOrchestrator, args: NeighborsArgs) -> i32 {
    let query = Query::exemplar(args.file_name.as_str());
    let outcome = orchestrator.search_ranked(&query).await;

    debug!(
        target: "image_search_cli::commands",
        exemplar = %args.file_name,
        "Exemplar search finished"
    );
    log_outcome("exemplar", &outcome);

    let opts = OutputOptions {
        json: args.json,
        distances: args.distances,
    };
    emit(&render(&outcome, query.echo(), opts));
    0
}
