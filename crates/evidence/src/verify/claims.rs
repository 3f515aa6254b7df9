//! Claim extraction from generated answer text.
//!
//! Offsets are byte offsets into the answer text.

use crate::patterns::{compile_all, is_match, lazy_regex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Factual,
    Procedural,
    Definitional,
    Numerical,
    Temporal,
}

impl ClaimKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimKind::Factual => "factual",
            ClaimKind::Procedural => "procedural",
            ClaimKind::Definitional => "definitional",
            ClaimKind::Numerical => "numerical",
            ClaimKind::Temporal => "temporal",
        }
    }
}

/// A checkable assertion located in the answer text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedClaim {
    pub id: String,
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(rename = "type")]
    pub kind: ClaimKind,
    /// In [min_confidence, max_confidence]
    pub confidence: f64,
}

/// Claim pattern families in evaluation order.
pub const CLAIM_PATTERNS: &[(ClaimKind, &[&str])] = &[
    (
        ClaimKind::Factual,
        &[
            r"(?i)(?:requires?|mandates?|obligates?|stipulates?)\s+(?:that\s+)?([^.!?]+)",
            r"(?i)(?:according to|as per|under)\s+(?:the\s+)?([A-Z][A-Za-z0-9\s]+),?\s+([^.!?]+)",
            r"(?i)(?:the\s+)?([A-Z][A-Z0-9]+)\s+(?:regulation|directive|standard)\s+([^.!?]+)",
        ],
    ),
    (
        ClaimKind::Procedural,
        &[
            r"(?i)(?:companies?|organizations?|businesses?)\s+(?:must|should|need to|are required to)\s+([^.!?]+)",
            r"(?i)(?:to comply|for compliance),?\s+([^.!?]+)",
            r"(?i)(?:the process|the procedure|the steps?)\s+(?:involves?|includes?|requires?)\s+([^.!?]+)",
        ],
    ),
    (
        ClaimKind::Definitional,
        &[
            r"(?i)([A-Z][A-Za-z0-9\s]+)\s+(?:is|refers to|means|stands for)\s+([^.!?]+)",
            r"(?i)(?:defined as|known as|called)\s+([^.!?]+)",
        ],
    ),
    (
        ClaimKind::Numerical,
        &[
            r"(?i)(\d+(?:\.\d+)?%)\s+(?:of|reduction|increase|target)",
            r"(?i)(?:by|before|from|until)\s+(\d{4})",
            r"(?i)(\d+(?:,\d{3})*(?:\.\d+)?)\s+(?:companies|organizations|entities|products)",
            r"(?i)(?:within|after|before)\s+(\d+)\s+(?:days?|months?|years?)",
        ],
    ),
    (
        ClaimKind::Temporal,
        &[
            r"(?i)(?:deadline|effective date|entry into force|applicable from)\s+(?:is|of)?\s*([^.!?]+)",
            r"(?i)(?:starting|beginning|from)\s+(?:in\s+)?(\d{4}|January|February|March|April|May|June|July|August|September|October|November|December)",
        ],
    ),
];

static COMPILED_PATTERNS: LazyLock<Vec<(ClaimKind, Vec<Regex>)>> = LazyLock::new(|| {
    CLAIM_PATTERNS
        .iter()
        .map(|(kind, patterns)| (*kind, compile_all(patterns)))
        .collect()
});

lazy_regex!(
    DOMAIN_ENTITY,
    r"(?i)\b(CSRD|ESRS|EUDR|ESPR|CSDDD|PPWR|GS1|GTIN|GLN|EPCIS|EU Taxonomy)\b"
);
lazy_regex!(ASSERTION_VERB, r"(?i)(?:requires?|mandates?|states?|specifies?|defines?)");
lazy_regex!(
    REGULATION_NAME,
    r"(?i)\b(CSRD|ESRS|EUDR|ESPR|CSDDD|PPWR|EU Taxonomy)\b"
);
lazy_regex!(
    STRUCTURAL_REFERENCE,
    r"(?i)Article\s+\d+|Section\s+\d+|Chapter\s+\d+"
);
lazy_regex!(
    CONCRETE_VALUE,
    r"(?i)\d+(?:\.\d+)?%|\d{4}|\d+\s+(?:days?|months?|years?)"
);
lazy_regex!(
    HEDGING,
    r"(?i)\b(may|might|could|possibly|generally|typically|often)\b"
);

/// Extraction thresholds and confidence adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_sentence_chars: usize,
    pub min_claim_chars: usize,
    /// Confidence of whole-sentence entity claims
    pub entity_claim_confidence: f64,
    pub base_confidence: f64,
    pub regulation_bonus: f64,
    pub reference_bonus: f64,
    pub numeric_bonus: f64,
    pub hedging_penalty: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: 20,
            min_claim_chars: 15,
            entity_claim_confidence: 0.8,
            base_confidence: 0.5,
            regulation_bonus: 0.2,
            reference_bonus: 0.15,
            numeric_bonus: 0.1,
            hedging_penalty: 0.15,
            min_confidence: 0.1,
            max_confidence: 1.0,
        }
    }
}

/// A sentence and its byte offset in the full text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub start: usize,
}

/// Split at whitespace runs that follow `.`, `!` or `?`.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(Sentence {
                text: &text[start..i],
                start,
            });
            let mut next_start = i + c.len_utf8();
            while let Some(&(j, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                next_start = j + w.len_utf8();
                chars.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    if start < text.len() || sentences.is_empty() {
        sentences.push(Sentence {
            text: &text[start..],
            start,
        });
    }
    sentences
}

/// Extracts typed claims from answer text.
#[derive(Debug, Clone, Default)]
pub struct ClaimExtractor {
    config: ExtractionConfig,
}

impl ClaimExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, text: &str) -> Vec<ExtractedClaim> {
        let mut claims: Vec<ExtractedClaim> = Vec::new();

        for sentence in split_sentences(text) {
            if sentence.text.chars().count() < self.config.min_sentence_chars
                || sentence.text.starts_with('#')
            {
                continue;
            }

            for (kind, patterns) in COMPILED_PATTERNS.iter() {
                for pattern in patterns {
                    for m in pattern.find_iter(sentence.text) {
                        self.record_match(text, m.as_str(), *kind, &mut claims);
                    }
                }
            }

            self.record_entity_sentence(text, sentence, &mut claims);
        }

        tracing::info!("Extracted {} claims from answer", claims.len());
        claims
    }

    fn record_match(
        &self,
        text: &str,
        matched: &str,
        kind: ClaimKind,
        claims: &mut Vec<ExtractedClaim>,
    ) {
        let claim_text = matched.trim();
        if claim_text.chars().count() < self.config.min_claim_chars {
            return;
        }
        // Containment de-duplication: an approximation that can over-merge
        // claims sharing a substring.
        if claims
            .iter()
            .any(|c| c.text.contains(claim_text) || claim_text.contains(c.text.as_str()))
        {
            return;
        }
        let Some(start) = text.find(claim_text) else {
            return;
        };

        claims.push(ExtractedClaim {
            id: format!("claim_{}", claims.len() + 1),
            text: claim_text.to_string(),
            start_index: start,
            end_index: start + claim_text.len(),
            kind,
            confidence: self.confidence(claim_text, kind),
        });
    }

    /// A sentence naming a domain entity with an assertion verb becomes one
    /// factual claim unless a claim already starts there or spans it.
    fn record_entity_sentence(
        &self,
        text: &str,
        sentence: Sentence<'_>,
        claims: &mut Vec<ExtractedClaim>,
    ) {
        if !is_match(&DOMAIN_ENTITY, sentence.text) || !is_match(&ASSERTION_VERB, sentence.text) {
            return;
        }

        let trimmed = sentence.text.trim();
        let leading = sentence.text.len() - sentence.text.trim_start().len();
        let start = sentence.start + leading;
        let end = start + trimmed.len();
        debug_assert_eq!(&text[start..end], trimmed);

        let covered = claims
            .iter()
            .any(|c| c.start_index == start || (c.start_index <= start && c.end_index >= end));
        if covered {
            return;
        }

        claims.push(ExtractedClaim {
            id: format!("claim_{}", claims.len() + 1),
            text: trimmed.to_string(),
            start_index: start,
            end_index: end,
            kind: ClaimKind::Factual,
            confidence: self.config.entity_claim_confidence,
        });
    }

    /// Base confidence adjusted for regulation names, structural references,
    /// concrete numbers and hedging; clamped.
    pub fn confidence(&self, claim_text: &str, kind: ClaimKind) -> f64 {
        let cfg = &self.config;
        let mut confidence = cfg.base_confidence;

        if is_match(&REGULATION_NAME, claim_text) {
            confidence += cfg.regulation_bonus;
        }
        if is_match(&STRUCTURAL_REFERENCE, claim_text) {
            confidence += cfg.reference_bonus;
        }
        if kind == ClaimKind::Numerical && is_match(&CONCRETE_VALUE, claim_text) {
            confidence += cfg.numeric_bonus;
        }
        if is_match(&HEDGING, claim_text) {
            confidence -= cfg.hedging_penalty;
        }

        confidence.clamp(cfg.min_confidence, cfg.max_confidence)
    }
}
