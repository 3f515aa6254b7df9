//! Eval command handler.
//!
//! Runs a file of queries through the full pipeline with bounded
//! concurrency and reports outcome counts.

use super::{build_search, print_json};
use anyhow::{Context, Result};
use clap::Args;
use isa_core::config::AppConfig;
use isa_evidence::config::load_config;
use isa_evidence::pipeline::{AskOutcome, EvidencePipeline, ExtractiveGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Evaluate many queries against a corpus
#[derive(Args, Debug)]
pub struct EvalCommand {
    /// Query file, one query per line (`#` starts a comment)
    #[arg(long)]
    pub queries: PathBuf,

    /// JSONL corpus, one source per line
    #[arg(long)]
    pub corpus: PathBuf,

    /// Skip the lexical index
    #[arg(long)]
    pub no_lexical: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Default)]
struct Tally {
    answered: usize,
    clarification: usize,
    no_evidence: usize,
    failed: usize,
    verification_rate_sum: f64,
}

impl EvalCommand {
    pub async fn execute(&self, config: &AppConfig, cancel: &CancellationToken) -> Result<()> {
        tracing::info!("Executing eval command");
        let start = Instant::now();

        let content = std::fs::read_to_string(&self.queries)
            .with_context(|| format!("Failed to read query file {:?}", self.queries))?;
        let queries: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        let evidence = load_config(&config.workspace)?;
        let search = build_search(config, &evidence, &self.corpus, self.no_lexical).await?;
        let pipeline = EvidencePipeline::new(search, Arc::new(ExtractiveGenerator::default()), &evidence);

        let items = pipeline
            .run_batch(queries, config.max_concurrency, cancel)
            .await;

        let mut tally = Tally::default();
        let mut rows = Vec::with_capacity(items.len());

        for item in &items {
            let label = item.outcome.as_ref().map_or("failed", AskOutcome::label);
            let row = match &item.outcome {
                Ok(AskOutcome::Answered(answer)) => {
                    tally.answered += 1;
                    tally.verification_rate_sum += answer.summary.verification_rate;
                    serde_json::json!({
                        "query": item.query,
                        "outcome": label,
                        "top": answer.results.first().map(|r| r.source.title.clone()),
                        "authority": answer.authority.level,
                        "verificationRate": answer.summary.verification_rate,
                        "mode": answer.mode.mode,
                    })
                }
                Ok(AskOutcome::NeedsClarification { analysis }) => {
                    tally.clarification += 1;
                    serde_json::json!({
                        "query": item.query,
                        "outcome": label,
                        "ambiguityScore": analysis.ambiguity_score,
                    })
                }
                Ok(AskOutcome::NoEvidence { .. }) => {
                    tally.no_evidence += 1;
                    serde_json::json!({ "query": item.query, "outcome": label })
                }
                Err(e) => {
                    tally.failed += 1;
                    serde_json::json!({
                        "query": item.query,
                        "outcome": label,
                        "error": e.to_string(),
                    })
                }
            };
            rows.push(row);
        }

        let mean_rate = if tally.answered > 0 {
            tally.verification_rate_sum / tally.answered as f64
        } else {
            0.0
        };
        let duration_secs = start.elapsed().as_secs_f64();

        if self.json {
            let output = serde_json::json!({
                "generatedAt": chrono::Utc::now().to_rfc3339(),
                "total": items.len(),
                "answered": tally.answered,
                "needsClarification": tally.clarification,
                "noEvidence": tally.no_evidence,
                "failed": tally.failed,
                "meanVerificationRate": mean_rate,
                "durationSecs": duration_secs,
                "items": rows,
            });
            return print_json(&output);
        }

        for row in &rows {
            println!(
                "{:<20} {}",
                row["outcome"].as_str().unwrap_or_default(),
                row["query"].as_str().unwrap_or_default()
            );
        }
        println!();
        println!(
            "{} queries in {:.2}s: {} answered, {} need clarification, {} without evidence, {} failed",
            items.len(),
            duration_secs,
            tally.answered,
            tally.clarification,
            tally.no_evidence,
            tally.failed
        );
        if tally.answered > 0 {
            println!("Mean verification rate: {:.0}%", mean_rate * 100.0);
        }

        Ok(())
    }
}
