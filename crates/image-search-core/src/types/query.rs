//! Query type: the two modes feeding the retrieval pipeline.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A similarity query, produced per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    /// Free-text description, encoded into a query vector.
    Text { text: String },
    /// Neighbors of an existing item, driven by its stored embedding.
    Exemplar { identifier: ItemId },
}

impl Query {
    pub fn text(text: impl Into<String>) -> Self {
        Query::Text { text: text.into() }
    }

    pub fn exemplar(identifier: impl Into<ItemId>) -> Self {
        Query::Exemplar {
            identifier: identifier.into(),
        }
    }

    /// True for a text query with nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Query::Text { text } if text.trim().is_empty())
    }

    /// Text to pre-fill a search box with: the trimmed text for text
    /// queries, `None` for exemplar queries.
    pub fn echo(&self) -> Option<String> {
        match self {
            Query::Text { text } => Some(text.trim().to_string()),
            Query::Exemplar { .. } => None,
        }
    }

    /// Identifier that must never appear in this query's results.
    pub fn excluded(&self) -> Option<&ItemId> {
        match self {
            Query::Text { .. } => None,
            Query::Exemplar { identifier } => Some(identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(Query::text("").is_blank());
        assert!(Query::text(" \t\n ").is_blank());
        assert!(!Query::text(" red car ").is_blank());
        assert!(!Query::exemplar("img1.jpg").is_blank());
    }

    #[test]
    fn test_echo() {
        assert_eq!(Query::text("  red car ").echo().as_deref(), Some("red car"));
        assert_eq!(Query::text("   ").echo().as_deref(), Some(""));
        assert_eq!(Query::exemplar("img1.jpg").echo(), None);
    }

    #[test]
    fn test_exclusion_only_for_exemplar() {
        assert!(Query::text("red car").excluded().is_none());
        assert_eq!(
            Query::exemplar("img7.jpg").excluded(),
            Some(&ItemId::from("img7.jpg"))
        );
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Query::exemplar("img7.jpg")).unwrap();
        assert_eq!(json, r#"{"kind":"exemplar","identifier":"img7.jpg"}"#);

        let query: Query = serde_json::from_str(r#"{"kind":"text","text":"dog"}"#).unwrap();
        assert_eq!(query, Query::text("dog"));
    }
}
