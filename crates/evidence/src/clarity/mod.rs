//! Query ambiguity analysis.
//!
//! Decides whether a query is specific enough to search at all. Each rule may
//! fire independently and adds its delta to the score; the
//! caller skips retrieval when [`QueryAnalyzer::should_skip_retrieval`] holds
//! and shows the clarifications instead.

pub mod rules;
pub mod types;

pub use types::{
    AmbiguityKind, AmbiguityWeights, Clarification, QueryAnalysis, ResponseMode,
    ResponseModeAnalysis, ResultSignal,
};

use crate::patterns::is_match;
use rules::*;

/// Accumulates rule findings for one query.
#[derive(Debug, Default)]
struct Assessment {
    score: f64,
    clarifications: Vec<Clarification>,
}

impl Assessment {
    fn flag(
        &mut self,
        kind: AmbiguityKind,
        message: impl Into<String>,
        suggestions: &[&str],
        confidence: f64,
        delta: f64,
    ) {
        self.clarifications.push(Clarification {
            kind,
            message: message.into(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            confidence,
        });
        self.score += delta;
    }
}

/// Normalised query handed to every rule.
struct QueryText<'a> {
    lower: &'a str,
    tokens: usize,
}

type Rule = fn(&QueryText<'_>, &AmbiguityWeights, &mut Assessment);

/// Ambiguity rules in evaluation order.
const RULES: &[Rule] = &[
    short_query,
    acronym,
    missing_context,
    unclear_scope,
    time,
    comparison,
];

fn short_query(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    if query.tokens > weights.short_query_max_tokens {
        return;
    }
    out.score += weights.short_query;

    if let Some(vague) = VAGUE_TERMS.iter().find(|v| query.lower.contains(v.term)) {
        out.flag(
            AmbiguityKind::VagueTopic,
            vague.message,
            vague.suggestions,
            0.8,
            weights.vague_term,
        );
    }
}

fn acronym(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    for (entry, pattern) in ACRONYM_PATTERNS.iter() {
        if !pattern.is_match(query.lower) {
            continue;
        }
        // A meaning's first word nearby disambiguates the acronym
        let resolved = entry.meanings.iter().any(|meaning| {
            meaning
                .split_whitespace()
                .next()
                .is_some_and(|first| query.lower.contains(&first.to_lowercase()))
        });
        if !resolved {
            out.flag(
                AmbiguityKind::AcronymAmbiguity,
                format!(
                    "\"{}\" could refer to: {}",
                    entry.acronym.to_uppercase(),
                    entry.meanings.join(", ")
                ),
                entry.questions,
                0.6,
                weights.acronym,
            );
        }
    }
}

fn missing_context(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    let personal = BUSINESS_CONTEXT_PHRASES
        .iter()
        .any(|phrase| query.lower.contains(phrase));

    if personal && !mentions_industry(query.lower) {
        out.flag(
            AmbiguityKind::MissingContext,
            "Which industry or sector is your company in?",
            MISSING_CONTEXT_SUGGESTIONS,
            0.7,
            weights.missing_context,
        );
    }
}

fn unclear_scope(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    let scoped_noun = SCOPE_NOUNS.iter().any(|noun| query.lower.contains(noun));

    if scoped_noun && !is_match(&JURISDICTION, query.lower) {
        out.flag(
            AmbiguityKind::UnclearScope,
            "Are you asking about EU, Dutch, or international regulations?",
            UNCLEAR_SCOPE_SUGGESTIONS,
            0.5,
            weights.unclear_scope,
        );
    }
}

fn time(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    if is_match(&DEADLINE_QUESTION, query.lower) && !is_match(&TIME_REFERENCE, query.lower) {
        out.flag(
            AmbiguityKind::TimeAmbiguity,
            "Are you asking about current requirements or future deadlines?",
            TIME_SUGGESTIONS,
            0.5,
            weights.time,
        );
    }
}

fn comparison(query: &QueryText<'_>, weights: &AmbiguityWeights, out: &mut Assessment) {
    if is_match(&COMPARISON, query.lower) && query.tokens < weights.comparison_min_tokens {
        out.flag(
            AmbiguityKind::ComparisonUnclear,
            "What aspect would you like to compare?",
            COMPARISON_SUGGESTIONS,
            0.6,
            weights.comparison,
        );
    }
}

/// Topics related to terms in the query, de-duplicated, at most five.
pub fn related_topics(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut topics: Vec<String> = Vec::new();

    for (term, related) in TOPIC_MAPPINGS {
        if !lower.contains(term) {
            continue;
        }
        for topic in related.iter() {
            if !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }
    }

    topics.truncate(MAX_RELATED_TOPICS);
    topics
}

/// Scores queries for ambiguity.
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer {
    weights: AmbiguityWeights,
}

impl QueryAnalyzer {
    pub fn new(weights: AmbiguityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &AmbiguityWeights {
        &self.weights
    }

    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let lower = query.trim().to_lowercase();
        let text = QueryText {
            lower: &lower,
            tokens: lower.split_whitespace().count(),
        };

        let mut assessment = Assessment::default();
        for rule in RULES {
            rule(&text, &self.weights, &mut assessment);
        }

        let is_ambiguous = assessment.score >= self.weights.ambiguous_threshold
            || !assessment.clarifications.is_empty();
        let ambiguity_score = assessment.score.min(1.0);

        tracing::info!(
            "Analyzed query: ambiguous={}, score={:.2}, clarifications={}",
            is_ambiguous,
            ambiguity_score,
            assessment.clarifications.len()
        );

        QueryAnalysis {
            original_query: query.to_string(),
            is_ambiguous,
            ambiguity_score,
            clarifications: assessment.clarifications,
            enhanced_query: (!is_ambiguous).then(|| query.to_string()),
            related_topics: related_topics(&lower),
        }
    }

    /// Gate: ambiguous and at or above the skip threshold.
    pub fn should_skip_retrieval(&self, analysis: &QueryAnalysis) -> bool {
        analysis.is_ambiguous && analysis.ambiguity_score >= self.weights.skip_retrieval_threshold
    }
}

/// Follow-up queries suggested when some results look weak, keyed on
/// regulation names in the top three titles.
pub fn did_you_mean(results: &[ResultSignal]) -> Vec<String> {
    if !results.iter().any(|r| r.score < 0.5) {
        return Vec::new();
    }

    let top_titles = results
        .iter()
        .take(3)
        .map(|r| r.title.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    DID_YOU_MEAN
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|kw| top_titles.contains(kw)))
        .map(|(_, suggestion)| suggestion.to_string())
        .take(MAX_DID_YOU_MEAN)
        .collect()
}

/// Decide how complete an answer can be from result quality and the
/// fraction of verified claims.
pub fn determine_response_mode(
    results: &[ResultSignal],
    verification_rate: f64,
) -> ResponseModeAnalysis {
    let avg_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64
    };
    let has_authoritative = results
        .iter()
        .any(|r| r.authority.is_some_and(|level| level.is_authoritative()));

    if avg_score >= 0.7 && has_authoritative && verification_rate >= 0.7 {
        return ResponseModeAnalysis {
            mode: ResponseMode::Full,
            reason: "High-quality evidence from authoritative sources".to_string(),
            recommendations: Vec::new(),
        };
    }

    if avg_score >= 0.4 || results.len() >= 2 {
        let mut recommendations = Vec::new();
        if !has_authoritative {
            recommendations
                .push("Consider consulting official EU documentation for verification".to_string());
        }
        if verification_rate < 0.7 {
            recommendations.push("Some claims may require additional verification".to_string());
        }
        return ResponseModeAnalysis {
            mode: ResponseMode::Partial,
            reason: "Moderate evidence quality - response may be incomplete".to_string(),
            recommendations,
        };
    }

    ResponseModeAnalysis {
        mode: ResponseMode::Insufficient,
        reason: "Limited evidence available for this query".to_string(),
        recommendations: vec![
            "Try rephrasing your question with more specific terms".to_string(),
            "Check official EU regulation texts directly".to_string(),
            "Contact GS1 Netherlands for specific guidance".to_string(),
        ],
    }
}

/// Append industry and scope context the query does not already carry.
pub fn enhance_query(query: &str, industry: Option<&str>, scope: Option<&str>) -> String {
    let mut enhanced = query.to_string();

    if let Some(industry) = industry {
        if !mentions_industry(&query.to_lowercase()) {
            enhanced = format!("{} for {} industry", query, industry);
        }
    }

    if let Some(scope) = scope {
        if !is_match(&ENHANCE_SCOPE, query) {
            enhanced = format!("{} ({})", enhanced, scope);
        }
    }

    enhanced
}
