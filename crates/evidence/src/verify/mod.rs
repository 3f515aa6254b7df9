//! Claim-citation verification of generated answers.
//!
//! The answer text is never modified: claims and citations are located by
//! byte offset, matched by proximity, scored, then summarised.

pub mod citations;
pub mod claims;
pub mod summary;
pub mod verifier;

pub use citations::{CitationExtractor, CitationOrigin, CitationReference, CitationSource};
pub use claims::{ClaimExtractor, ClaimKind, ExtractedClaim, ExtractionConfig};
pub use summary::VerificationSummary;
pub use verifier::{ClaimVerificationResult, ClaimVerifier, VerificationConfig};

use crate::authority::AuthorityClassifier;

/// Extraction, citation detection and verification in one pass.
#[derive(Debug, Clone, Default)]
pub struct AnswerVerifier {
    claims: ClaimExtractor,
    citations: CitationExtractor,
    verifier: ClaimVerifier,
}

impl AnswerVerifier {
    pub fn new(
        extraction: ExtractionConfig,
        verification: VerificationConfig,
        classifier: AuthorityClassifier,
    ) -> Self {
        Self {
            claims: ClaimExtractor::new(extraction),
            citations: CitationExtractor::new(classifier),
            verifier: ClaimVerifier::new(verification),
        }
    }

    pub fn verify(&self, answer: &str, sources: &[CitationSource]) -> VerificationSummary {
        let claims = self.claims.extract(answer);
        let citations = self.citations.extract(answer, sources);
        tracing::info!(
            "Verifying {} claims against {} citations",
            claims.len(),
            citations.len()
        );

        let results = self.verifier.verify(&claims, &citations, answer);
        let summary = VerificationSummary::summarize(results);

        tracing::info!(
            "Verification complete: {}/{} claims verified (score {:.2})",
            summary.verified_claims,
            summary.total_claims,
            summary.overall_score
        );
        summary
    }
}

/// Verify an answer with default extraction and scoring settings.
pub fn verify_answer(answer: &str, sources: &[CitationSource]) -> VerificationSummary {
    AnswerVerifier::default().verify(answer, sources)
}
