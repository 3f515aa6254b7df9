//! In-memory BM25 keyword index.
//!
//! Two fields per document: the title (weight 2) and a body made of title,
//! description, regulation code and category (weight 1).

use super::LexicalRetriever;
use crate::types::Source;
use isa_core::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "do", "does", "i", "we", "my", "our",
];

/// Lowercase, split on non-alphanumerics, drop stop words and single
/// characters, and strip a plural `s`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1 && !STOP_WORDS.contains(t))
        .map(|t| {
            if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") {
                t[..t.len() - 1].to_string()
            } else {
                t.to_string()
            }
        })
        .collect()
}

/// BM25 parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f64,
    /// Length normalisation
    pub b: f64,
    pub title_weight: f64,
    pub body_weight: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            title_weight: 2.0,
            body_weight: 1.0,
        }
    }
}

#[derive(Debug, Default)]
struct Field {
    tf: HashMap<String, u32>,
    len: usize,
}

impl Field {
    fn from_text(text: &str) -> Self {
        let tokens = tokenize(text);
        let mut tf = HashMap::new();
        for token in &tokens {
            *tf.entry(token.clone()).or_insert(0) += 1;
        }
        Self {
            tf,
            len: tokens.len(),
        }
    }
}

#[derive(Debug)]
struct IndexedDoc {
    source: Source,
    title: Field,
    body: Field,
}

/// Keyword index over sources. Not ready until at least one document is in.
#[derive(Debug, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    docs: Vec<IndexedDoc>,
    doc_freq: HashMap<String, usize>,
    total_title_len: usize,
    total_body_len: usize,
}

impl Bm25Index {
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Build an index over `sources` with default parameters.
    pub fn build(sources: impl IntoIterator<Item = Source>) -> Self {
        let mut index = Self::default();
        for source in sources {
            index.add(source);
        }
        index
    }

    pub fn add(&mut self, source: Source) {
        let body_text = [
            Some(source.title.as_str()),
            source.description.as_deref(),
            source.regulation_type.as_deref(),
            source.category.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        let title = Field::from_text(&source.title);
        let body = Field::from_text(&body_text);

        let terms: HashSet<&String> = title.tf.keys().chain(body.tf.keys()).collect();
        for term in terms {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }

        self.total_title_len += title.len;
        self.total_body_len += body.len;
        self.docs.push(IndexedDoc {
            source,
            title,
            body,
        });
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn field_score(&self, field: &Field, term: &str, avg_len: f64) -> f64 {
        let tf = field.tf.get(term).copied().unwrap_or(0) as f64;
        if tf == 0.0 {
            return 0.0;
        }
        let Bm25Params { k1, b, .. } = self.params;
        let len_ratio = if avg_len > 0.0 {
            field.len as f64 / avg_len
        } else {
            1.0
        };
        tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * len_ratio))
    }

    /// Score every document against the query; zero scores are dropped.
    pub fn score(&self, query: &str) -> Vec<(usize, f64)> {
        if self.docs.is_empty() {
            return Vec::new();
        }

        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();

        let n = self.docs.len() as f64;
        let avg_title = self.total_title_len as f64 / n;
        let avg_body = self.total_body_len as f64 / n;

        self.docs
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                let score: f64 = terms
                    .iter()
                    .map(|term| {
                        let tf_part = self.params.title_weight
                            * self.field_score(&doc.title, term, avg_title)
                            + self.params.body_weight * self.field_score(&doc.body, term, avg_body);
                        self.idf(term) * tf_part
                    })
                    .sum();
                (score > 0.0).then_some((i, score))
            })
            .collect()
    }

    /// Top `limit` sources by descending score, with `lexical_score` set.
    pub fn top(&self, query: &str, limit: usize) -> Vec<Source> {
        let mut scored = self.score(query);
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| self.docs[*a].source.key().cmp(&self.docs[*b].source.key()))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(i, score)| self.docs[i].source.clone().with_lexical_score(score))
            .collect()
    }
}

#[async_trait::async_trait]
impl LexicalRetriever for Bm25Index {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Source>> {
        if !self.is_ready() {
            tracing::warn!("Lexical index not initialized, returning empty results");
            return Ok(Vec::new());
        }
        let results = self.top(query, limit);
        tracing::debug!("Lexical search returned {} results", results.len());
        Ok(results)
    }

    fn is_ready(&self) -> bool {
        !self.docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn corpus() -> Vec<Source> {
        vec![
            Source::new(1, SourceKind::Regulation, "CSRD Corporate Sustainability Reporting Directive")
                .with_description("Sustainability reporting obligations for large companies")
                .with_regulation_type("CSRD"),
            Source::new(2, SourceKind::Regulation, "EUDR Deforestation Regulation")
                .with_description("Due diligence for deforestation-free products")
                .with_regulation_type("EUDR"),
            Source::new(3, SourceKind::Standard, "GS1 GTIN")
                .with_description("Global Trade Item Number for product identification")
                .with_category("GS1 Identification"),
        ]
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("What are the CSRD reporting requirements?"),
            vec!["csrd", "reporting", "requirement"]
        );
        assert_eq!(tokenize("GS1 GTINs, Scope-3"), vec!["gs1", "gtin", "scope"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_not_ready_until_indexed() {
        let index = Bm25Index::default();
        assert!(!index.is_ready());
        assert!(index.top("csrd", 5).is_empty());

        let index = Bm25Index::build(corpus());
        assert!(index.is_ready());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_title_match_ranks_first() {
        let index = Bm25Index::build(corpus());
        let results = index.top("deforestation due diligence", 10);

        assert_eq!(results[0].id, 2);
        assert!(results[0].lexical_score.unwrap() > 0.0);
        assert!(results.iter().all(|s| s.id != 1));
    }

    #[test]
    fn test_results_sorted_and_limited() {
        let index = Bm25Index::build(corpus());
        let results = index.top("reporting product identification regulation", 2);

        assert_eq!(results.len(), 2);
        assert!(results[0].lexical_score >= results[1].lexical_score);
    }

    #[test]
    fn test_no_match_is_empty() {
        let index = Bm25Index::build(corpus());
        assert!(index.top("blockchain", 10).is_empty());
    }

    #[tokio::test]
    async fn test_retriever_search() {
        let index = Bm25Index::build(corpus());
        let results = index.search("GTIN", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 3);
    }
}
