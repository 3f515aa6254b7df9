//! Hybrid retrieval fusion and evidence verification.
//!
//! - `clarity`: gate ambiguous queries before retrieval
//! - `retrieval`: vector and lexical retrievers, concurrent fan-out
//! - `fusion`: reciprocal rank fusion with authority attached
//! - `authority`: source trust classification and aggregation
//! - `verify`: claim extraction, citation detection, claim verification
//! - `pipeline`: the above wired together around an answer generator

pub mod authority;
pub mod clarity;
pub mod config;
pub mod fusion;
pub mod patterns;
pub mod pipeline;
pub mod retrieval;
pub mod types;
pub mod verify;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use authority::{AuthorityClassifier, AuthorityInfo, AuthorityLevel};
pub use clarity::{QueryAnalysis, QueryAnalyzer};
pub use config::EvidenceConfig;
pub use fusion::{build_context, fuse_ranked, FusionConfig, HybridResult};
pub use pipeline::{AnswerGenerator, AskOutcome, EvidencePipeline, ExtractiveGenerator};
pub use retrieval::{HybridSearch, LexicalRetriever, VectorRetriever};
pub use types::{Source, SourceKey, SourceKind};
pub use verify::{verify_answer, CitationSource, VerificationSummary};
