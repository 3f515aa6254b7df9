//! In-memory cosine-similarity index.

use super::embeddings::EmbeddingProvider;
use super::VectorRetriever;
use crate::types::Source;
use isa_core::{AppError, AppResult};
use std::sync::Arc;

/// Cosine similarity of two equal-length vectors.
///
/// Differing lengths are a configuration error and fail immediately.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> AppResult<f32> {
    if a.len() != b.len() {
        return Err(AppError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

#[derive(Debug)]
struct Entry {
    source: Source,
    embedding: Vec<f32>,
}

/// Sources with their embeddings, searched by brute-force cosine.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: Vec<Entry>,
}

impl InMemoryVectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a source with a precomputed embedding.
    pub fn insert(&mut self, source: Source, embedding: Vec<f32>) -> AppResult<()> {
        if embedding.len() != self.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions(),
                actual: embedding.len(),
            });
        }
        self.entries.push(Entry { source, embedding });
        Ok(())
    }

    /// Embed and insert sources using their searchable text.
    pub async fn index(&mut self, sources: Vec<Source>) -> AppResult<()> {
        let texts: Vec<String> = sources.iter().map(|s| s.searchable_text()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != sources.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                sources.len(),
                embeddings.len()
            )));
        }

        for (source, embedding) in sources.into_iter().zip(embeddings) {
            self.insert(source, embedding)?;
        }

        tracing::info!(
            "Indexed {} sources with {} ({} dims)",
            self.entries.len(),
            self.embedder.model_name(),
            self.dimensions()
        );
        Ok(())
    }

    /// Top `limit` sources for a query embedding, similarity clamped to [0, 1].
    pub fn search_embedding(&self, query: &[f32], limit: usize) -> AppResult<Vec<Source>> {
        let mut scored = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let similarity = cosine_similarity(query, &entry.embedding)?;
            scored.push((entry, f64::from(similarity).clamp(0.0, 1.0)));
        }

        scored.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| a.source.key().cmp(&b.source.key()))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(entry, similarity)| entry.source.clone().with_vector_similarity(similarity))
            .collect())
    }
}

#[async_trait::async_trait]
impl VectorRetriever for InMemoryVectorIndex {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Source>> {
        let embedding = self.embedder.embed(query).await?;
        if embedding.len() != self.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions(),
                actual: embedding.len(),
            });
        }
        let results = self.search_embedding(&embedding, limit)?;
        tracing::debug!("Vector search returned {} results", results.len());
        Ok(results)
    }
}
