//! Matches claims to nearby citations and scores their support.

use super::citations::CitationReference;
use super::claims::ExtractedClaim;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const NO_CITATION_ISSUE: &str = "No citation found for this claim";
pub const LOW_AUTHORITY_ISSUE: &str = "Claim only supported by lower-authority sources";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Citations within this many bytes of either claim boundary support it
    pub nearby_window: usize,
    pub base_score: f64,
    /// Any official or verified supporting source
    pub authority_bonus: f64,
    /// A citation inside the claim span
    pub inline_bonus: f64,
    /// Every supporting source is industry or community
    pub low_authority_penalty: f64,
    pub verified_threshold: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            nearby_window: 200,
            base_score: 0.5,
            authority_bonus: 0.3,
            inline_bonus: 0.2,
            low_authority_penalty: 0.1,
            verified_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVerificationResult {
    pub claim: ExtractedClaim,
    pub verified: bool,
    /// One citation per distinct source, inline citations first
    pub supporting_citations: Vec<CitationReference>,
    /// In [0, 1]
    pub verification_score: f64,
    pub issues: Vec<String>,
}

impl ClaimVerificationResult {
    pub fn has_issue(&self, issue: &str) -> bool {
        self.issues.iter().any(|i| i == issue)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimVerifier {
    config: VerificationConfig,
}

impl ClaimVerifier {
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// Verify each claim against the citations found in `text`.
    ///
    /// A claim whose span does not lie on `text` is skipped with a warning;
    /// the rest are still verified.
    pub fn verify(
        &self,
        claims: &[ExtractedClaim],
        citations: &[CitationReference],
        text: &str,
    ) -> Vec<ClaimVerificationResult> {
        claims
            .iter()
            .filter(|claim| {
                let valid = span_is_valid(claim, text);
                if !valid {
                    tracing::warn!(
                        "Skipping claim {} with invalid span {}..{}",
                        claim.id,
                        claim.start_index,
                        claim.end_index
                    );
                }
                valid
            })
            .map(|claim| self.verify_claim(claim, citations))
            .collect()
    }

    fn verify_claim(
        &self,
        claim: &ExtractedClaim,
        citations: &[CitationReference],
    ) -> ClaimVerificationResult {
        let cfg = &self.config;
        let (start, end) = (claim.start_index, claim.end_index);

        let inline: Vec<&CitationReference> = citations
            .iter()
            .filter(|c| c.position >= start && c.position <= end)
            .collect();
        let nearby = citations.iter().filter(|c| {
            c.position.abs_diff(start) < cfg.nearby_window
                || c.position.abs_diff(end) < cfg.nearby_window
        });

        let mut seen = HashSet::new();
        let supporting: Vec<CitationReference> = inline
            .iter()
            .copied()
            .chain(nearby)
            .filter(|c| seen.insert(c.source_key()))
            .cloned()
            .collect();

        let mut issues = Vec::new();
        let mut score = 0.0;

        if supporting.is_empty() {
            issues.push(NO_CITATION_ISSUE.to_string());
        } else {
            score = cfg.base_score;
            if supporting.iter().any(|c| c.authority_level.is_authoritative()) {
                score += cfg.authority_bonus;
            }
            if !inline.is_empty() {
                score += cfg.inline_bonus;
            }
            if supporting.iter().all(|c| c.authority_level.is_low_authority()) {
                score -= cfg.low_authority_penalty;
                issues.push(LOW_AUTHORITY_ISSUE.to_string());
            }
        }

        score *= claim.confidence;

        ClaimVerificationResult {
            claim: claim.clone(),
            verified: !supporting.is_empty() && score >= cfg.verified_threshold,
            supporting_citations: supporting,
            verification_score: score.clamp(0.0, 1.0),
            issues,
        }
    }
}

fn span_is_valid(claim: &ExtractedClaim, text: &str) -> bool {
    claim.start_index <= claim.end_index
        && claim.end_index <= text.len()
        && text.is_char_boundary(claim.start_index)
        && text.is_char_boundary(claim.end_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::AuthorityLevel;
    use crate::types::SourceKind;
    use crate::verify::citations::CitationOrigin;
    use crate::verify::claims::ClaimKind;

    const TEXT: &str = "The CSRD requires that large companies disclose sustainability information [1].";

    fn claim(start: usize, end: usize, confidence: f64) -> ExtractedClaim {
        ExtractedClaim {
            id: "claim_1".to_string(),
            text: TEXT.get(start..end).unwrap_or_default().to_string(),
            start_index: start,
            end_index: end,
            kind: ClaimKind::Factual,
            confidence,
        }
    }

    fn citation(source_id: u64, level: AuthorityLevel, position: usize) -> CitationReference {
        CitationReference {
            id: 1,
            source_id,
            source_kind: SourceKind::Regulation,
            source_title: format!("Source {}", source_id),
            source_url: None,
            authority_level: level,
            position,
            origin: CitationOrigin::Marker,
        }
    }

    #[test]
    fn test_inline_official_citation_verifies() {
        let marker = TEXT.find("[1]").unwrap();
        let claim = claim(9, TEXT.len(), 0.7);
        let results = ClaimVerifier::default().verify(
            &[claim.clone()],
            &[citation(1, AuthorityLevel::Official, marker)],
            TEXT,
        );

        assert_eq!(results.len(), 1);
        assert!(results[0].verified);
        assert!(results[0].verification_score >= 0.8 * claim.confidence);
        assert!(results[0].issues.is_empty());
    }

    #[test]
    fn test_no_citation_is_unverified() {
        let results = ClaimVerifier::default().verify(&[claim(9, 40, 0.7)], &[], TEXT);

        assert!(!results[0].verified);
        assert_eq!(results[0].verification_score, 0.0);
        assert!(results[0].has_issue(NO_CITATION_ISSUE));
    }

    #[test]
    fn test_low_authority_penalty() {
        // nearby, not inline: (0.5 - 0.1) * 1.0
        let results = ClaimVerifier::default().verify(
            &[claim(0, 20, 1.0)],
            &[citation(1, AuthorityLevel::Industry, 60)],
            TEXT,
        );

        assert!((results[0].verification_score - 0.4).abs() < 1e-9);
        assert!(results[0].verified);
        assert!(results[0].has_issue(LOW_AUTHORITY_ISSUE));
    }

    #[test]
    fn test_far_citation_does_not_support() {
        let verifier = ClaimVerifier::new(VerificationConfig {
            nearby_window: 10,
            ..Default::default()
        });
        let results = verifier.verify(
            &[claim(0, 20, 1.0)],
            &[citation(1, AuthorityLevel::Official, 60)],
            TEXT,
        );
        assert!(results[0].supporting_citations.is_empty());
    }

    #[test]
    fn test_supporting_deduplicated_by_source() {
        let results = ClaimVerifier::default().verify(
            &[claim(0, 40, 1.0)],
            &[
                citation(1, AuthorityLevel::Official, 10),
                citation(1, AuthorityLevel::Official, 30),
                citation(2, AuthorityLevel::Guidance, 70),
            ],
            TEXT,
        );
        let ids: Vec<u64> = results[0]
            .supporting_citations
            .iter()
            .map(|c| c.source_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!((results[0].verification_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_span_skipped() {
        let bad = ExtractedClaim {
            start_index: 50,
            end_index: 500,
            ..claim(0, 20, 1.0)
        };
        let results = ClaimVerifier::default().verify(&[bad, claim(0, 20, 1.0)], &[], TEXT);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].claim.end_index, 20);
    }

    #[test]
    fn test_low_confidence_citation_not_verified() {
        // (0.5 + 0.3) * 0.35 = 0.28
        let results = ClaimVerifier::default().verify(
            &[claim(0, 20, 0.35)],
            &[citation(1, AuthorityLevel::Verified, 60)],
            TEXT,
        );
        assert!(!results[0].verified);
        assert!((results[0].verification_score - 0.28).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_window_counts_bytes() {
        // Twelve characters but twenty-two bytes between claim end and marker
        let text = "Companies must report emissions. éééééééééé [1]";
        let end = "Companies must report emissions.".len();
        let marker = text.find("[1]").unwrap();
        assert_eq!(marker - end, 22);
        assert_eq!(text[end..marker].chars().count(), 12);

        let claim = ExtractedClaim {
            text: text[..end].to_string(),
            start_index: 0,
            end_index: end,
            ..claim(0, 0, 1.0)
        };
        let citations = [citation(1, AuthorityLevel::Official, marker)];

        let narrow = ClaimVerifier::new(VerificationConfig {
            nearby_window: 15,
            ..Default::default()
        });
        assert!(narrow.verify(&[claim.clone()], &citations, text)[0]
            .supporting_citations
            .is_empty());

        let wide = ClaimVerifier::new(VerificationConfig {
            nearby_window: 23,
            ..Default::default()
        });
        assert_eq!(wide.verify(&[claim], &citations, text)[0].supporting_citations.len(), 1);
    }
}
