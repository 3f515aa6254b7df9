//! Query-to-verified-answer orchestration.
//!
//! Gate the query, run hybrid search, hand the fused evidence to an answer
//! generator, then verify the generated answer against that evidence.

use crate::authority::{AuthorityAggregate, AuthorityClassifier, WeightedAuthority};
use crate::clarity::{
    did_you_mean, determine_response_mode, QueryAnalysis, QueryAnalyzer, ResponseModeAnalysis,
    ResultSignal,
};
use crate::config::EvidenceConfig;
use crate::fusion::{FusionConfig, HybridResult};
use crate::retrieval::HybridSearch;
use crate::verify::{AnswerVerifier, CitationSource, VerificationSummary};
use futures::stream::{self, StreamExt};
use isa_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Produces answer text from fused evidence.
///
/// Answers should cite evidence as `[n]`, where `n` is the 1-based position
/// of the result in `results`.
#[async_trait::async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, query: &str, results: &[HybridResult]) -> AppResult<String>;
}

/// Offline generator that stitches the top results' descriptions into an
/// answer, one cited sentence per result.
#[derive(Debug, Clone)]
pub struct ExtractiveGenerator {
    max_sentences: usize,
}

impl Default for ExtractiveGenerator {
    fn default() -> Self {
        Self { max_sentences: 3 }
    }
}

impl ExtractiveGenerator {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
        }
    }
}

#[async_trait::async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, _query: &str, results: &[HybridResult]) -> AppResult<String> {
        let sentences: Vec<String> = results
            .iter()
            .take(self.max_sentences)
            .enumerate()
            .map(|(i, result)| {
                let body = result
                    .source
                    .description
                    .as_deref()
                    .unwrap_or(&result.source.title)
                    .trim()
                    .trim_end_matches('.');
                format!("{} [{}].", body, i + 1)
            })
            .collect();
        Ok(sentences.join(" "))
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AskOutcome {
    /// The query is too ambiguous to search; ask the user first
    NeedsClarification { analysis: QueryAnalysis },
    /// Search ran but nothing passed fusion
    NoEvidence { analysis: QueryAnalysis },
    Answered(Box<Answer>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub analysis: QueryAnalysis,
    pub answer: String,
    pub results: Vec<HybridResult>,
    pub summary: VerificationSummary,
    pub mode: ResponseModeAnalysis,
    pub authority: AuthorityAggregate,
    pub suggestions: Vec<String>,
}

impl AskOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AskOutcome::NeedsClarification { .. } => "needs_clarification",
            AskOutcome::NoEvidence { .. } => "no_evidence",
            AskOutcome::Answered(_) => "answered",
        }
    }
}

/// One query of a batch run with its outcome.
#[derive(Debug)]
pub struct BatchItem {
    pub query: String,
    pub outcome: AppResult<AskOutcome>,
}

pub struct EvidencePipeline {
    analyzer: QueryAnalyzer,
    search: HybridSearch,
    fusion: FusionConfig,
    verifier: AnswerVerifier,
    classifier: AuthorityClassifier,
    generator: Arc<dyn AnswerGenerator>,
}

impl EvidencePipeline {
    pub fn new(
        search: HybridSearch,
        generator: Arc<dyn AnswerGenerator>,
        config: &EvidenceConfig,
    ) -> Self {
        let classifier = AuthorityClassifier::new(config.authority.clone());
        Self {
            analyzer: QueryAnalyzer::new(config.ambiguity.clone()),
            search: search.with_classifier(classifier.clone()),
            fusion: config.fusion.clone(),
            verifier: AnswerVerifier::new(
                config.extraction.clone(),
                config.verification.clone(),
                classifier.clone(),
            ),
            classifier,
            generator,
        }
    }

    pub async fn ask(&self, query: &str, cancel: &CancellationToken) -> AppResult<AskOutcome> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let analysis = self.analyzer.analyze(query);
        if self.analyzer.should_skip_retrieval(&analysis) {
            tracing::info!("Query needs clarification before retrieval");
            return Ok(AskOutcome::NeedsClarification { analysis });
        }

        let search_query = analysis.enhanced_query.as_deref().unwrap_or(query);
        let results = self.search.search(search_query, &self.fusion, cancel).await?;
        if results.is_empty() {
            tracing::info!("No evidence found for query");
            return Ok(AskOutcome::NoEvidence { analysis });
        }

        let answer = tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            answer = self.generator.generate(query, &results) => answer?,
        };
        tracing::debug!(
            "Generated answer with {} ({} chars)",
            self.generator.name(),
            answer.len()
        );

        let sources: Vec<CitationSource> = results.iter().map(CitationSource::from).collect();
        let summary = self.verifier.verify(&answer, &sources);

        let signals: Vec<ResultSignal> = results.iter().map(ResultSignal::from).collect();
        let mode = determine_response_mode(&signals, summary.verification_rate);
        let suggestions = did_you_mean(&signals);

        let weighted: Vec<WeightedAuthority> = results
            .iter()
            .map(|r| WeightedAuthority::weighted(r.authority.level, r.relevance()))
            .collect();
        let authority = self.classifier.aggregate(&weighted);

        Ok(AskOutcome::Answered(Box::new(Answer {
            analysis,
            answer,
            results,
            summary,
            mode,
            authority,
            suggestions,
        })))
    }

    /// Run many queries with at most `max_concurrency` in flight.
    ///
    /// Items come back in input order. A failing query does not stop the
    /// others; cancellation fails the queries that have not finished.
    pub async fn run_batch(
        &self,
        queries: Vec<String>,
        max_concurrency: usize,
        cancel: &CancellationToken,
    ) -> Vec<BatchItem> {
        let total = queries.len();
        tracing::info!(
            "Running batch of {} queries (max {} concurrent)",
            total,
            max_concurrency.max(1)
        );

        let tasks = queries.into_iter().enumerate().map(|(index, query)| async move {
            let outcome = self.ask(&query, cancel).await;
            if let Err(e) = &outcome {
                tracing::warn!("Query {} failed: {}", index + 1, e);
            }
            (index, BatchItem { query, outcome })
        });

        let mut items: Vec<(usize, BatchItem)> = stream::iter(tasks)
            .buffer_unordered(max_concurrency.max(1))
            .collect()
            .await;
        items.sort_by_key(|(index, _)| *index);

        items.into_iter().map(|(_, item)| item).collect()
    }
}
