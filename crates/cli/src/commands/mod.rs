//! Command handlers for the ISA CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod analyze;
pub mod eval;
pub mod search;
pub mod verify;

// Re-export command types for convenience
pub use analyze::AnalyzeCommand;
pub use eval::EvalCommand;
pub use search::SearchCommand;
pub use verify::VerifyCommand;

use anyhow::{Context, Result};
use isa_core::config::AppConfig;
use isa_evidence::config::EvidenceConfig;
use isa_evidence::retrieval::{load_corpus, Bm25Index, HybridSearch, InMemoryVectorIndex, TrigramEmbedder};
use isa_evidence::AuthorityClassifier;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Load a corpus and index it for vector and (optionally) lexical search.
pub async fn build_search(
    config: &AppConfig,
    evidence: &EvidenceConfig,
    corpus: &Path,
    no_lexical: bool,
) -> Result<HybridSearch> {
    let sources = load_corpus(corpus).with_context(|| format!("Failed to load corpus {:?}", corpus))?;
    tracing::info!("Loaded {} sources from {:?}", sources.len(), corpus);

    let mut vector = InMemoryVectorIndex::new(Arc::new(TrigramEmbedder::default()));
    vector.index(sources.clone()).await?;

    let search = if no_lexical {
        HybridSearch::vector_only(Arc::new(vector))
    } else {
        HybridSearch::new(Arc::new(vector), Arc::new(Bm25Index::build(sources)))
    };

    Ok(search
        .with_timeout(config.retriever_timeout())
        .with_classifier(AuthorityClassifier::new(evidence.authority.clone())))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
