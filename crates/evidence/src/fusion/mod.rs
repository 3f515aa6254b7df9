//! Reciprocal Rank Fusion of vector and lexical candidates.
//!
//! `fused = Σ 1/(rrf_k + rank/weight)` over the lists that contain a source.
//! Fusion is pure: it only sees already-fetched lists.

pub mod config;
pub mod context;

pub use config::FusionConfig;
pub use context::build_context;

use crate::authority::{AuthorityClassifier, AuthorityInfo, ContextSource};
use crate::clarity::ResultSignal;
use crate::types::{Source, SourceKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A fused view of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridResult {
    pub source: Source,

    pub fused_score: f64,

    /// 1-based rank in the filtered vector list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_rank: Option<usize>,

    /// 1-based rank in the filtered lexical list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm25_rank: Option<usize>,

    /// Raw vector similarity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f64>,

    /// Raw lexical score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm25_score: Option<f64>,

    pub authority: AuthorityInfo,
}

impl HybridResult {
    pub fn key(&self) -> SourceKey {
        self.source.key()
    }

    /// Relevance in [0, 1]: the raw similarity when the vector side saw the
    /// source, otherwise the fused score.
    pub fn relevance(&self) -> f64 {
        self.vector_score.unwrap_or(self.fused_score)
    }
}

impl From<&HybridResult> for ResultSignal {
    fn from(result: &HybridResult) -> Self {
        ResultSignal {
            title: result.source.title.clone(),
            score: result.relevance(),
            authority: Some(result.authority.level),
        }
    }
}

impl<'a> From<&'a HybridResult> for ContextSource<'a> {
    fn from(result: &'a HybridResult) -> Self {
        ContextSource {
            title: &result.source.title,
            level: result.authority.level,
            similarity: result.vector_score,
        }
    }
}

/// A source that survived its list's threshold, with its 1-based rank.
struct Ranked<'a> {
    source: &'a Source,
    rank: usize,
    score: f64,
}

/// Filter by threshold and rank the survivors in input order. The first
/// occurrence of a duplicated key wins.
fn rank_filtered<'a>(
    list: &'a [Source],
    score_of: impl Fn(&Source) -> Option<f64>,
    threshold: f64,
) -> Vec<Ranked<'a>> {
    let mut seen = HashSet::new();
    list.iter()
        .filter_map(|source| {
            let score = score_of(source).unwrap_or(0.0);
            (score >= threshold && seen.insert(source.key())).then_some((source, score))
        })
        .enumerate()
        .map(|(i, (source, score))| Ranked {
            source,
            rank: i + 1,
            score,
        })
        .collect()
}

fn rrf_term(rank: usize, weight: f64, k: f64) -> f64 {
    1.0 / (k + rank as f64 / weight)
}

/// Lower rank first, absent ranks last.
fn compare_rank(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fused score descending, then vector rank, lexical rank, id and kind.
fn compare_results(a: &HybridResult, b: &HybridResult) -> Ordering {
    b.fused_score
        .total_cmp(&a.fused_score)
        .then_with(|| compare_rank(a.vector_rank, b.vector_rank))
        .then_with(|| compare_rank(a.bm25_rank, b.bm25_rank))
        .then_with(|| a.source.id.cmp(&b.source.id))
        .then_with(|| a.source.kind.cmp(&b.source.kind))
}

fn sector_boost(source: &Source, keywords: &[String], config: &FusionConfig) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let content = source.searchable_text().to_lowercase();
    let matches = keywords.iter().filter(|kw| content.contains(kw.as_str())).count();
    (config.sector_boost_per_match * matches as f64).min(config.max_sector_boost)
}

/// Fuse two retriever lists, each sorted by descending raw score.
///
/// When the lexical side is not ready or returned nothing, the vector list is
/// used alone and `fused_score` is the raw similarity.
pub fn fuse_ranked(
    vector: &[Source],
    lexical: &[Source],
    lexical_ready: bool,
    config: &FusionConfig,
    classifier: &AuthorityClassifier,
) -> Vec<HybridResult> {
    let vector_ranked = rank_filtered(vector, |s| s.vector_similarity, config.vector_threshold);

    tracing::info!(
        "Fusing vector: {} results, lexical: {} results",
        vector.len(),
        lexical.len()
    );

    let mut results = if !lexical_ready || lexical.is_empty() {
        tracing::warn!("Lexical results unavailable, using vector-only ranking");
        vector_only(&vector_ranked, classifier)
    } else {
        let lexical_ranked =
            rank_filtered(lexical, |s| s.lexical_score, config.bm25_threshold);
        reciprocal_rank(&vector_ranked, &lexical_ranked, config, classifier)
    };

    results.sort_by(compare_results);
    results.truncate(config.limit);

    match results.first() {
        Some(top) => tracing::info!(
            "Fused {} results, top: {:?} (fused={:.4}, vector={}, lexical={})",
            results.len(),
            top.source.title,
            top.fused_score,
            top.vector_score.map_or("n/a".to_string(), |s| format!("{:.4}", s)),
            top.bm25_score.map_or("n/a".to_string(), |s| format!("{:.4}", s)),
        ),
        None => tracing::info!("Fusion produced no results"),
    }

    results
}

fn vector_only(ranked: &[Ranked<'_>], classifier: &AuthorityClassifier) -> Vec<HybridResult> {
    ranked
        .iter()
        .map(|entry| HybridResult {
            source: entry.source.clone(),
            fused_score: entry.score,
            vector_rank: Some(entry.rank),
            bm25_rank: None,
            vector_score: Some(entry.score),
            bm25_score: None,
            authority: classifier.classify(entry.source),
        })
        .collect()
}

fn reciprocal_rank(
    vector: &[Ranked<'_>],
    lexical: &[Ranked<'_>],
    config: &FusionConfig,
    classifier: &AuthorityClassifier,
) -> Vec<HybridResult> {
    let mut merged: HashMap<SourceKey, HybridResult> = HashMap::new();

    for entry in vector {
        merged.insert(
            entry.source.key(),
            HybridResult {
                source: entry.source.clone(),
                fused_score: rrf_term(entry.rank, config.vector_weight, config.rrf_k),
                vector_rank: Some(entry.rank),
                bm25_rank: None,
                vector_score: Some(entry.score),
                bm25_score: None,
                authority: classifier.classify(entry.source),
            },
        );
    }

    for entry in lexical {
        let term = rrf_term(entry.rank, config.bm25_weight, config.rrf_k);
        merged
            .entry(entry.source.key())
            .and_modify(|result| {
                result.fused_score += term;
                result.bm25_rank = Some(entry.rank);
                result.bm25_score = Some(entry.score);
            })
            .or_insert_with(|| HybridResult {
                source: entry.source.clone(),
                fused_score: term,
                vector_rank: None,
                bm25_rank: Some(entry.rank),
                vector_score: None,
                bm25_score: Some(entry.score),
                authority: classifier.classify(entry.source),
            });
    }

    let keywords = config.boost_keywords();
    merged
        .into_values()
        .map(|mut result| {
            let boost = sector_boost(&result.source, &keywords, config);
            if boost > 0.0 {
                result.fused_score *= 1.0 + boost;
            }
            result
        })
        .collect()
}
