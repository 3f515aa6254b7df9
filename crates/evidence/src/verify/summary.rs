//! Rolls per-claim verification results up into answer-level statistics.

use super::claims::ClaimKind;
use super::verifier::{ClaimVerificationResult, LOW_AUTHORITY_ISSUE};
use serde::{Deserialize, Serialize};

pub const LOW_RATE_WARNING: &str = "Less than half of claims are verified by citations";
pub const NUMERICAL_WARNING: &str = "Some numerical claims lack citation support";
pub const TEMPORAL_WARNING: &str = "Some deadline/date claims lack citation support";
pub const OFFICIAL_SOURCE_RECOMMENDATION: &str =
    "Some claims could benefit from official source citations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub total_claims: usize,
    pub verified_claims: usize,
    pub unverified_claims: usize,
    /// verified / total, 1.0 when there are no claims
    pub verification_rate: f64,
    /// Confidence-weighted mean verification score, 1.0 when there are no claims
    pub overall_score: f64,
    pub claim_results: Vec<ClaimVerificationResult>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl VerificationSummary {
    pub fn summarize(claim_results: Vec<ClaimVerificationResult>) -> Self {
        let total_claims = claim_results.len();
        let verified_claims = claim_results.iter().filter(|r| r.verified).count();
        let unverified_claims = total_claims - verified_claims;

        let verification_rate = if total_claims > 0 {
            verified_claims as f64 / total_claims as f64
        } else {
            1.0
        };

        let total_weight: f64 = claim_results.iter().map(|r| r.claim.confidence).sum();
        let weighted: f64 = claim_results
            .iter()
            .map(|r| r.verification_score * r.claim.confidence)
            .sum();
        let overall_score = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            1.0
        };

        let unverified_of = |kind: ClaimKind| {
            claim_results
                .iter()
                .any(|r| r.claim.kind == kind && !r.verified)
        };

        let mut warnings = Vec::new();
        if verification_rate < 0.5 {
            warnings.push(LOW_RATE_WARNING.to_string());
        }
        if unverified_of(ClaimKind::Numerical) {
            warnings.push(NUMERICAL_WARNING.to_string());
        }
        if unverified_of(ClaimKind::Temporal) {
            warnings.push(TEMPORAL_WARNING.to_string());
        }

        let mut recommendations = Vec::new();
        if unverified_claims > 0 {
            recommendations.push(format!(
                "Consider adding citations for {} unverified claim(s)",
                unverified_claims
            ));
        }
        if claim_results.iter().any(|r| r.has_issue(LOW_AUTHORITY_ISSUE)) {
            recommendations.push(OFFICIAL_SOURCE_RECOMMENDATION.to_string());
        }

        Self {
            total_claims,
            verified_claims,
            unverified_claims,
            verification_rate,
            overall_score,
            claim_results,
            warnings,
            recommendations,
        }
    }

    pub fn is_fully_verified(&self) -> bool {
        self.unverified_claims == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::claims::ExtractedClaim;

    fn result(kind: ClaimKind, verified: bool, score: f64, confidence: f64) -> ClaimVerificationResult {
        ClaimVerificationResult {
            claim: ExtractedClaim {
                id: "claim_1".to_string(),
                text: "a claim long enough".to_string(),
                start_index: 0,
                end_index: 19,
                kind,
                confidence,
            },
            verified,
            supporting_citations: Vec::new(),
            verification_score: score,
            issues: Vec::new(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = VerificationSummary::summarize(Vec::new());
        assert_eq!(summary.total_claims, 0);
        assert_eq!(summary.verification_rate, 1.0);
        assert_eq!(summary.overall_score, 1.0);
        assert!(summary.warnings.is_empty());
        assert!(summary.recommendations.is_empty());
        assert!(summary.is_fully_verified());
    }

    #[test]
    fn test_half_verified() {
        let summary = VerificationSummary::summarize(vec![
            result(ClaimKind::Factual, true, 0.8, 1.0),
            result(ClaimKind::Factual, false, 0.0, 1.0),
        ]);
        assert_eq!(summary.verification_rate, 0.5);
        assert_eq!(summary.unverified_claims, 1);
        assert!((summary.overall_score - 0.4).abs() < 1e-9);
        // 0.5 is not below half
        assert!(summary.warnings.is_empty());
        assert_eq!(
            summary.recommendations,
            vec!["Consider adding citations for 1 unverified claim(s)".to_string()]
        );
    }

    #[test]
    fn test_overall_score_weighted_by_confidence() {
        let summary = VerificationSummary::summarize(vec![
            result(ClaimKind::Factual, true, 0.9, 0.9),
            result(ClaimKind::Factual, false, 0.0, 0.3),
        ]);
        // (0.9 * 0.9) / 1.2
        assert!((summary.overall_score - 0.675).abs() < 1e-9);
    }

    #[test]
    fn test_warnings_for_unverified_numbers_and_dates() {
        let summary = VerificationSummary::summarize(vec![
            result(ClaimKind::Numerical, false, 0.0, 0.6),
            result(ClaimKind::Temporal, false, 0.0, 0.5),
        ]);
        assert_eq!(
            summary.warnings,
            vec![
                LOW_RATE_WARNING.to_string(),
                NUMERICAL_WARNING.to_string(),
                TEMPORAL_WARNING.to_string(),
            ]
        );
        assert_eq!(summary.overall_score, 0.0);
    }

    #[test]
    fn test_low_authority_recommendation() {
        let mut weak = result(ClaimKind::Factual, true, 0.4, 1.0);
        weak.issues.push(LOW_AUTHORITY_ISSUE.to_string());

        let summary = VerificationSummary::summarize(vec![weak]);
        assert_eq!(
            summary.recommendations,
            vec![OFFICIAL_SOURCE_RECOMMENDATION.to_string()]
        );
    }
}
