//! Retriever seams and the hybrid search fan-out.
//!
//! Vector and lexical retrievers are independent read-only collaborators,
//! queried concurrently and joined once both return. A failing or slow
//! retriever degrades to an empty list; both failing yields an empty fused
//! list, which is a normal outcome.

pub mod corpus;
pub mod embeddings;
pub mod lexical;
pub mod vector;

pub use corpus::load_corpus;
pub use embeddings::{EmbeddingProvider, TrigramEmbedder};
pub use lexical::{Bm25Index, Bm25Params};
pub use vector::{cosine_similarity, InMemoryVectorIndex};

use crate::authority::AuthorityClassifier;
use crate::fusion::{fuse_ranked, FusionConfig, HybridResult};
use crate::types::Source;
use isa_core::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Dense retriever: results sorted by descending `vector_similarity`.
#[async_trait::async_trait]
pub trait VectorRetriever: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Source>>;
}

/// Sparse retriever: results sorted by descending `lexical_score`.
#[async_trait::async_trait]
pub trait LexicalRetriever: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Source>>;

    fn is_ready(&self) -> bool;
}

pub const DEFAULT_RETRIEVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs both retrievers and fuses their results.
pub struct HybridSearch {
    vector: Arc<dyn VectorRetriever>,
    lexical: Option<Arc<dyn LexicalRetriever>>,
    classifier: AuthorityClassifier,
    timeout: Duration,
}

impl HybridSearch {
    pub fn new(vector: Arc<dyn VectorRetriever>, lexical: Arc<dyn LexicalRetriever>) -> Self {
        Self {
            vector,
            lexical: Some(lexical),
            classifier: AuthorityClassifier::default(),
            timeout: DEFAULT_RETRIEVER_TIMEOUT,
        }
    }

    /// Search without a lexical side; fusion always takes the vector-only path.
    pub fn vector_only(vector: Arc<dyn VectorRetriever>) -> Self {
        Self {
            vector,
            lexical: None,
            classifier: AuthorityClassifier::default(),
            timeout: DEFAULT_RETRIEVER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_classifier(mut self, classifier: AuthorityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Fan out to both retrievers, then fuse.
    ///
    /// Returns `AppError::Cancelled` as soon as `cancel` fires; in-flight
    /// retriever calls are dropped. Non-recoverable retriever errors such as
    /// a dimension mismatch propagate.
    pub async fn search(
        &self,
        query: &str,
        config: &FusionConfig,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<HybridResult>> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let limit = config.candidate_limit();
        let lexical = self.lexical.as_ref().filter(|l| l.is_ready());
        let lexical_ready = lexical.is_some();

        let vector_call = guarded("vector", self.timeout, self.vector.search(query, limit));
        let lexical_call = async {
            match lexical {
                Some(retriever) => guarded("lexical", self.timeout, retriever.search(query, limit)).await,
                None => Ok(Vec::new()),
            }
        };

        let (vector_results, lexical_results) = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!("Hybrid search cancelled, abandoning retriever calls");
                return Err(AppError::Cancelled);
            }
            joined = async { tokio::join!(vector_call, lexical_call) } => joined,
        };

        let vector_results = vector_results?;
        let lexical_results = lexical_results?;

        Ok(fuse_ranked(
            &vector_results,
            &lexical_results,
            lexical_ready,
            config,
            &self.classifier,
        ))
    }
}

/// Await a retriever call with a timeout. Timeouts and recoverable errors
/// become an empty list; anything else propagates.
async fn guarded<F>(name: &str, timeout: Duration, call: F) -> AppResult<Vec<Source>>
where
    F: Future<Output = AppResult<Vec<Source>>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(results)) => Ok(results),
        Ok(Err(e)) if e.is_recoverable() => {
            tracing::warn!("{} retriever failed, treating as empty: {}", name, e);
            Ok(Vec::new())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            tracing::warn!("{} retriever timed out after {:?}, treating as empty", name, timeout);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    struct FixedVector(Vec<Source>);

    #[async_trait::async_trait]
    impl VectorRetriever for FixedVector {
        async fn search(&self, _query: &str, limit: usize) -> AppResult<Vec<Source>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct FixedLexical {
        results: Vec<Source>,
        ready: bool,
    }

    #[async_trait::async_trait]
    impl LexicalRetriever for FixedLexical {
        async fn search(&self, _query: &str, limit: usize) -> AppResult<Vec<Source>> {
            Ok(self.results.iter().take(limit).cloned().collect())
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    struct FailingLexical;

    #[async_trait::async_trait]
    impl LexicalRetriever for FailingLexical {
        async fn search(&self, _query: &str, _limit: usize) -> AppResult<Vec<Source>> {
            Err(AppError::Retrieval("index offline".to_string()))
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    struct SlowVector;

    #[async_trait::async_trait]
    impl VectorRetriever for SlowVector {
        async fn search(&self, _query: &str, _limit: usize) -> AppResult<Vec<Source>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct MismatchedVector;

    #[async_trait::async_trait]
    impl VectorRetriever for MismatchedVector {
        async fn search(&self, _query: &str, _limit: usize) -> AppResult<Vec<Source>> {
            Err(AppError::DimensionMismatch {
                expected: 384,
                actual: 768,
            })
        }
    }

    fn vector_hits() -> Vec<Source> {
        vec![
            Source::new(1, SourceKind::Regulation, "CSRD Regulation").with_vector_similarity(0.9),
            Source::new(2, SourceKind::Regulation, "EUDR Regulation").with_vector_similarity(0.7),
        ]
    }

    fn lexical_hits() -> Vec<Source> {
        vec![
            Source::new(1, SourceKind::Regulation, "CSRD Regulation").with_lexical_score(15.5),
            Source::new(3, SourceKind::Standard, "GS1 GTIN").with_lexical_score(10.2),
        ]
    }

    #[tokio::test]
    async fn test_hybrid_search_fuses_both_lists() {
        let search = HybridSearch::new(
            Arc::new(FixedVector(vector_hits())),
            Arc::new(FixedLexical {
                results: lexical_hits(),
                ready: true,
            }),
        );

        let results = search
            .search("csrd", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source.id, 1);
        assert_eq!(results[0].bm25_rank, Some(1));
    }

    #[tokio::test]
    async fn test_not_ready_lexical_falls_back_to_vector() {
        let search = HybridSearch::new(
            Arc::new(FixedVector(vector_hits())),
            Arc::new(FixedLexical {
                results: lexical_hits(),
                ready: false,
            }),
        );

        let results = search
            .search("csrd", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].fused_score, 0.9);
        assert_eq!(results[1].fused_score, 0.7);
    }

    #[tokio::test]
    async fn test_failing_lexical_degrades() {
        let search = HybridSearch::new(Arc::new(FixedVector(vector_hits())), Arc::new(FailingLexical));

        let results = search
            .search("csrd", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.bm25_rank.is_none()));
    }

    #[tokio::test]
    async fn test_timed_out_vector_degrades() {
        let search = HybridSearch::new(
            Arc::new(SlowVector),
            Arc::new(FixedLexical {
                results: lexical_hits(),
                ready: true,
            }),
        )
        .with_timeout(Duration::from_millis(50));

        let results = search
            .search("gtin", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.vector_rank.is_none()));
    }

    #[tokio::test]
    async fn test_both_failing_is_empty_not_error() {
        let search = HybridSearch::new(
            Arc::new(FixedVector(Vec::new())),
            Arc::new(FailingLexical),
        );
        let results = search
            .search("anything", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_fast() {
        let search = HybridSearch::vector_only(Arc::new(MismatchedVector));
        let err = search
            .search("csrd", &FusionConfig::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_abandons_calls() {
        let search = HybridSearch::vector_only(Arc::new(SlowVector));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = search
            .search("csrd", &FusionConfig::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let search = HybridSearch::vector_only(Arc::new(FixedVector(vector_hits())));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = search.search("csrd", &FusionConfig::default(), &cancel).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
