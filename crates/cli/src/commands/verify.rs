//! Verify command handler.
//!
//! Checks an answer's claims against the sources it cites.

use super::print_json;
use anyhow::{Context, Result};
use clap::Args;
use isa_core::config::AppConfig;
use isa_evidence::config::load_config;
use isa_evidence::verify::{AnswerVerifier, CitationSource};
use isa_evidence::AuthorityClassifier;
use std::path::PathBuf;

/// Verify an answer's claims against cited sources
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Answer text file
    #[arg(long)]
    pub answer: PathBuf,

    /// JSON array of sources in citation order (`[1]` is the first);
    /// sources without `authorityLevel` are classified
    #[arg(long)]
    pub sources: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl VerifyCommand {
    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        tracing::info!("Executing verify command");

        let answer = std::fs::read_to_string(&self.answer)
            .with_context(|| format!("Failed to read answer file {:?}", self.answer))?;
        let raw = std::fs::read_to_string(&self.sources)
            .with_context(|| format!("Failed to read sources file {:?}", self.sources))?;
        let sources: Vec<CitationSource> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse sources file {:?}", self.sources))?;

        let evidence = load_config(&config.workspace)?;
        let verifier = AnswerVerifier::new(
            evidence.extraction,
            evidence.verification,
            AuthorityClassifier::new(evidence.authority),
        );
        let summary = verifier.verify(&answer, &sources);

        if self.json {
            return print_json(&summary);
        }

        println!(
            "Claims: {} verified, {} unverified (rate {:.0}%, score {:.2})",
            summary.verified_claims,
            summary.unverified_claims,
            summary.verification_rate * 100.0,
            summary.overall_score
        );

        for result in &summary.claim_results {
            let mark = if result.verified { "✓" } else { "✗" };
            println!();
            println!(
                "{} [{}] {} ({:.2})",
                mark,
                result.claim.kind.as_str(),
                result.claim.text,
                result.verification_score
            );
            for citation in &result.supporting_citations {
                println!(
                    "    [{}] {} - {}",
                    citation.id,
                    citation.source_title,
                    citation.authority_level.label()
                );
            }
            for issue in &result.issues {
                println!("    ! {}", issue);
            }
        }

        for warning in &summary.warnings {
            tracing::warn!("{}", warning);
        }
        if !summary.recommendations.is_empty() {
            println!();
            for recommendation in &summary.recommendations {
                println!("- {}", recommendation);
            }
        }

        Ok(())
    }
}
