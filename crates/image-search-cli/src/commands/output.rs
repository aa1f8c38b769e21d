//! Rendering of search outcomes for stdout.

use image_search_core::types::{Neighbor, SearchOutcome, SearchResponse};
use serde::Serialize;
use tracing::{info, warn, Level};

/// JSON document printed with `--json --distances`.
#[derive(Debug, Serialize)]
struct RankedDocument<'a> {
    #[serde(flatten)]
    response: &'a SearchResponse,
    neighbors: &'a [Neighbor],
}

/// Options shared by every query command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub distances: bool,
}

/// Render an outcome; returns the text to print (possibly empty).
pub fn render(outcome: &SearchOutcome, echoed_text: Option<String>, opts: OutputOptions) -> String {
    if opts.json {
        return render_json(outcome, echoed_text, opts.distances);
    }
    render_plain(outcome.neighbors(), opts.distances)
}

/// One identifier per line, optionally followed by a tab and the distance.
pub fn render_plain(neighbors: &[Neighbor], distances: bool) -> String {
    neighbors
        .iter()
        .map(|n| {
            if distances {
                format!("{}\t{:.6}", n.id, n.distance)
            } else {
                n.id.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(outcome: &SearchOutcome, echoed_text: Option<String>, distances: bool) -> String {
    let response = SearchResponse::from_outcome(outcome, echoed_text);
    let rendered = if distances {
        serde_json::to_string_pretty(&RankedDocument {
            response: &response,
            neighbors: outcome.neighbors(),
        })
    } else {
        serde_json::to_string_pretty(&response)
    };
    rendered.unwrap_or_default()
}

/// `WARN` when a failing collaborator emptied the result, `INFO` otherwise.
pub fn outcome_level(outcome: &SearchOutcome) -> Level {
    match outcome.empty_reason() {
        Some(reason) if reason.is_degraded() => Level::WARN,
        _ => Level::INFO,
    }
}

/// Log the end of a query at [`outcome_level`].
pub fn log_outcome(query_kind: &'static str, outcome: &SearchOutcome) {
    let reason = outcome.empty_reason();
    if outcome_level(outcome) == Level::WARN {
        warn!(
            target: "image_search_cli::commands",
            query_kind,
            empty_reason = ?reason,
            "Search degraded to an empty result"
        );
    } else {
        info!(
            target: "image_search_cli::commands",
            query_kind,
            results = outcome.len(),
            empty_reason = ?reason,
            "Search complete"
        );
    }
}

/// Print to stdout unless there is nothing to show.
pub fn emit(rendered: &str) {
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}
