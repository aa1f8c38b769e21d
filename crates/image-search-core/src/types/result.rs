//! Retrieval results and the caller-facing search response.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ItemId;

/// One ranked candidate as reported by the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: ItemId,
    /// Negative inner product to the query vector (smaller = more similar).
    pub distance: f64,
}

impl Neighbor {
    pub fn new(id: impl Into<ItemId>, distance: f64) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

/// Why a query produced no candidates.
///
/// Externally every reason looks the same (an empty result list); the
/// distinction is kept for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Text query was empty or whitespace-only.
    EmptyQuery,
    /// The encoder could not produce a vector for the text.
    EncodingFailure,
    /// The exemplar identifier has no stored embedding.
    LookupMiss,
    /// Connectivity or query failure against the vector store.
    StoreUnavailable,
    /// Query vector absent, malformed or of the wrong dimension.
    InvalidVector,
}

impl EmptyReason {
    /// True for reasons caused by a failing collaborator rather than by the query itself.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            EmptyReason::EncodingFailure | EmptyReason::StoreUnavailable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyReason::EmptyQuery => "empty_query",
            EmptyReason::EncodingFailure => "encoding_failure",
            EmptyReason::LookupMiss => "lookup_miss",
            EmptyReason::StoreUnavailable => "store_unavailable",
            EmptyReason::InvalidVector => "invalid_vector",
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed outcome of one retrieval: ranked candidates, or empty with a reason.
///
/// `Ranked(vec![])` means the store answered and had no eligible rows.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Ranked(Vec<Neighbor>),
    Empty(EmptyReason),
}

impl SearchOutcome {
    pub fn neighbors(&self) -> &[Neighbor] {
        match self {
            SearchOutcome::Ranked(neighbors) => neighbors,
            SearchOutcome::Empty(_) => &[],
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            SearchOutcome::Ranked(_) => None,
            SearchOutcome::Empty(reason) => Some(*reason),
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors().is_empty()
    }

    /// Identifiers nearest-first.
    pub fn identifiers(&self) -> Vec<ItemId> {
        self.neighbors().iter().map(|n| n.id.clone()).collect()
    }
}

/// Caller-facing result of [`crate::QueryOrchestrator::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Item identifiers, nearest-first, no duplicates, at most [`super::RESULT_CAP`].
    pub results: Vec<ItemId>,
    /// Trimmed text of a text query, for pre-filling a search box. `None` for exemplar queries.
    pub echoed_text: Option<String>,
    /// Set when `results` is empty because of the query or a failing collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

impl SearchResponse {
    pub fn from_outcome(outcome: &SearchOutcome, echoed_text: Option<String>) -> Self {
        Self {
            results: outcome.identifiers(),
            echoed_text,
            empty_reason: outcome.empty_reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ranked = SearchOutcome::Ranked(vec![Neighbor::new("a", -0.9), Neighbor::new("b", -0.5)]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.empty_reason(), None);
        assert_eq!(ranked.identifiers(), vec![ItemId::from("a"), ItemId::from("b")]);

        let empty = SearchOutcome::Empty(EmptyReason::LookupMiss);
        assert!(empty.is_empty());
        assert_eq!(empty.empty_reason(), Some(EmptyReason::LookupMiss));
    }

    #[test]
    fn test_degraded_reasons() {
        assert!(EmptyReason::StoreUnavailable.is_degraded());
        assert!(EmptyReason::EncodingFailure.is_degraded());
        assert!(!EmptyReason::EmptyQuery.is_degraded());
        assert!(!EmptyReason::LookupMiss.is_degraded());
    }

    #[test]
    fn test_response_json_omits_reason_when_ranked() {
        let outcome = SearchOutcome::Ranked(vec![Neighbor::new("img1.jpg", -0.3)]);
        let response = SearchResponse::from_outcome(&outcome, Some("dog".into()));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"results":["img1.jpg"],"echoed_text":"dog"}"#);

        let empty = SearchResponse::from_outcome(&SearchOutcome::Empty(EmptyReason::StoreUnavailable), None);
        let json = serde_json::to_string(&empty).unwrap();
        assert!(json.contains("\"empty_reason\":\"store_unavailable\""));
    }
}
