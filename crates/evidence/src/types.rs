//! Shared evidence types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a retrievable source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Legal text: regulation, directive, delegated act
    Regulation,
    /// Standards-body publication
    Standard,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Regulation => "regulation",
            SourceKind::Standard => "standard",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a source across retrievers: `(kind, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceKey {
    pub kind: SourceKind,
    pub id: u64,
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.id)
    }
}

/// A candidate evidence document as returned by a retriever.
///
/// Retriever-specific scores are optional: a vector retriever fills
/// `vector_similarity`, a lexical retriever fills `lexical_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: u64,

    #[serde(rename = "type")]
    pub kind: SourceKind,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Regulation code (CSRD, EUDR, ...) when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_type: Option<String>,

    /// Standard category (e.g. "GS1 Identification")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Cosine similarity in [0, 1] from the vector retriever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_similarity: Option<f64>,

    /// Unbounded non-negative score from the lexical retriever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical_score: Option<f64>,
}

impl Source {
    /// Create a source with only the required fields set.
    pub fn new(id: u64, kind: SourceKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            description: None,
            url: None,
            regulation_type: None,
            category: None,
            vector_similarity: None,
            lexical_score: None,
        }
    }

    pub fn key(&self) -> SourceKey {
        SourceKey {
            kind: self.kind,
            id: self.id,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_regulation_type(mut self, code: impl Into<String>) -> Self {
        self.regulation_type = Some(code.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_vector_similarity(mut self, similarity: f64) -> Self {
        self.vector_similarity = Some(similarity);
        self
    }

    pub fn with_lexical_score(mut self, score: f64) -> Self {
        self.lexical_score = Some(score);
        self
    }

    /// Title and description joined, as used for keyword boosting and
    /// lexical indexing.
    pub fn searchable_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_identity() {
        let reg = Source::new(1, SourceKind::Regulation, "CSRD");
        let std = Source::new(1, SourceKind::Standard, "GS1 GTIN");

        assert_ne!(reg.key(), std.key());
        assert_eq!(reg.key().to_string(), "regulation_1");
    }

    #[test]
    fn test_source_deserializes_optional_fields() {
        let json = r#"{"id": 7, "type": "standard", "title": "GS1 EPCIS", "category": "GS1 Traceability"}"#;
        let source: Source = serde_json::from_str(json).unwrap();

        assert_eq!(source.kind, SourceKind::Standard);
        assert_eq!(source.category.as_deref(), Some("GS1 Traceability"));
        assert!(source.url.is_none());
        assert!(source.vector_similarity.is_none());
    }

    #[test]
    fn test_searchable_text() {
        let source = Source::new(1, SourceKind::Regulation, "EUDR")
            .with_description("Deforestation-free products");
        assert_eq!(source.searchable_text(), "EUDR Deforestation-free products");
    }
}
