//! Search command handler.
//!
//! Runs hybrid search over a JSONL corpus and prints the fused ranking.

use super::{build_search, print_json};
use anyhow::Result;
use clap::Args;
use isa_core::config::AppConfig;
use isa_evidence::authority::{format_authority_for_context, ContextSource};
use isa_evidence::clarity::{did_you_mean, ResultSignal};
use isa_evidence::config::load_config;
use isa_evidence::fusion::build_context;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Hybrid search over a corpus
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// JSONL corpus, one source per line
    #[arg(long)]
    pub corpus: PathBuf,

    /// Number of fused results
    #[arg(short = 'k', long)]
    pub limit: Option<usize>,

    /// Boost sources matching a sector's keywords (e.g. retail, healthcare)
    #[arg(long)]
    pub sector: Option<String>,

    /// Skip the lexical index and rank by vector similarity only
    #[arg(long)]
    pub no_lexical: bool,

    /// Print the numbered context block handed to answer generation
    #[arg(long)]
    pub context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig, cancel: &CancellationToken) -> Result<()> {
        tracing::info!("Executing search command");

        let evidence = load_config(&config.workspace)?;
        let mut fusion = evidence.fusion.clone();
        if let Some(limit) = self.limit {
            fusion = fusion.with_limit(limit);
        }
        if let Some(sector) = &self.sector {
            fusion = fusion.with_sector(sector.clone());
        }
        fusion.validate()?;

        let search = build_search(config, &evidence, &self.corpus, self.no_lexical).await?;
        let results = search.search(&self.query, &fusion, cancel).await?;

        let signals: Vec<ResultSignal> = results.iter().map(ResultSignal::from).collect();
        let suggestions = did_you_mean(&signals);

        if self.json {
            let output = serde_json::json!({
                "query": self.query,
                "results": results,
                "suggestions": suggestions,
            });
            return print_json(&output);
        }

        if results.is_empty() {
            println!("No results for {:?}", self.query);
            return Ok(());
        }

        if self.context {
            println!("{}", build_context(&results));
        } else {
            let sources: Vec<ContextSource<'_>> = results.iter().map(ContextSource::from).collect();
            println!("{}", format_authority_for_context(&sources));
            for result in &results {
                tracing::debug!(
                    "{}: fused={:.4} vector_rank={:?} bm25_rank={:?}",
                    result.key(),
                    result.fused_score,
                    result.vector_rank,
                    result.bm25_rank
                );
            }
        }

        if !suggestions.is_empty() {
            println!();
            println!("Did you mean:");
            for suggestion in &suggestions {
                println!("  - {}", suggestion);
            }
        }

        Ok(())
    }
}
