//! Analyze command handler.
//!
//! Scores a query for ambiguity and prints the clarifications it would get.

use super::print_json;
use anyhow::Result;
use clap::Args;
use isa_core::config::AppConfig;
use isa_evidence::clarity::{enhance_query, QueryAnalyzer};
use isa_evidence::config::load_config;

/// Analyze a query for ambiguity
#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// The query to analyze
    pub query: String,

    /// Industry to add to the query if it names none
    #[arg(long)]
    pub industry: Option<String>,

    /// Geographic scope to add to the query if it names none
    #[arg(long)]
    pub scope: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeCommand {
    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        tracing::info!("Executing analyze command");

        let evidence = load_config(&config.workspace)?;
        let analyzer = QueryAnalyzer::new(evidence.ambiguity);
        let analysis = analyzer.analyze(&self.query);
        let skip = analyzer.should_skip_retrieval(&analysis);

        let enhanced = (self.industry.is_some() || self.scope.is_some()).then(|| {
            enhance_query(&self.query, self.industry.as_deref(), self.scope.as_deref())
        });

        if self.json {
            let output = serde_json::json!({
                "analysis": analysis,
                "skipRetrieval": skip,
                "enhancedWithContext": enhanced,
            });
            return print_json(&output);
        }

        println!(
            "Ambiguous: {} (score {:.2}){}",
            if analysis.is_ambiguous { "yes" } else { "no" },
            analysis.ambiguity_score,
            if skip { ", clarification needed before search" } else { "" }
        );

        for clarification in &analysis.clarifications {
            println!();
            println!("? {}", clarification.message);
            for suggestion in &clarification.suggestions {
                println!("  - {}", suggestion);
            }
        }

        if !analysis.related_topics.is_empty() {
            println!();
            println!("Related topics: {}", analysis.related_topics.join(", "));
        }

        if let Some(enhanced) = enhanced {
            println!();
            println!("Enhanced query: {}", enhanced);
        }

        Ok(())
    }
}
