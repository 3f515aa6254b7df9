//! Query analysis types.

use crate::authority::AuthorityLevel;
use serde::{Deserialize, Serialize};

/// Why a query was judged unclear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityKind {
    /// Query too broad (e.g. "ESG")
    VagueTopic,
    /// Needs industry/company context
    MissingContext,
    /// Unclear if asking about EU, national or global rules
    UnclearScope,
    /// Unclear timeframe
    TimeAmbiguity,
    /// Acronym with several meanings
    AcronymAmbiguity,
    /// Comparison without a clear aspect
    ComparisonUnclear,
}

/// One clarification offered back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    #[serde(rename = "type")]
    pub kind: AmbiguityKind,
    pub message: String,
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

/// Result of analysing one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    pub original_query: String,
    pub is_ambiguous: bool,
    /// Additive score, capped at 1.0
    pub ambiguity_score: f64,
    pub clarifications: Vec<Clarification>,
    /// The query to search with; absent when the query is ambiguous
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_query: Option<String>,
    pub related_topics: Vec<String>,
}

impl QueryAnalysis {
    pub fn has(&self, kind: AmbiguityKind) -> bool {
        self.clarifications.iter().any(|c| c.kind == kind)
    }
}

/// Tunable deltas and thresholds of the ambiguity analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbiguityWeights {
    pub short_query: f64,
    pub vague_term: f64,
    pub acronym: f64,
    pub missing_context: f64,
    pub unclear_scope: f64,
    pub time: f64,
    pub comparison: f64,
    /// Queries with at most this many tokens get the short-query penalty
    pub short_query_max_tokens: usize,
    /// Comparisons with fewer tokens than this are flagged
    pub comparison_min_tokens: usize,
    /// Score at or above which a query is ambiguous
    pub ambiguous_threshold: f64,
    /// Score at or above which an ambiguous query skips retrieval
    pub skip_retrieval_threshold: f64,
}

impl Default for AmbiguityWeights {
    fn default() -> Self {
        Self {
            short_query: 0.3,
            vague_term: 0.3,
            acronym: 0.2,
            missing_context: 0.2,
            unclear_scope: 0.15,
            time: 0.1,
            comparison: 0.15,
            short_query_max_tokens: 2,
            comparison_min_tokens: 8,
            ambiguous_threshold: 0.3,
            skip_retrieval_threshold: 0.5,
        }
    }
}

/// How complete an answer can be given the evidence found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Full,
    Partial,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseModeAnalysis {
    pub mode: ResponseMode,
    pub reason: String,
    pub recommendations: Vec<String>,
}

/// The per-result view used for suggestions and response mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSignal {
    pub title: String,
    /// Relevance in [0, 1]
    pub score: f64,
    pub authority: Option<AuthorityLevel>,
}
