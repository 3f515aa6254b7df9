//! Embedding provider seam and a deterministic offline embedder.

use super::lexical::tokenize;
use isa_core::{AppError, AppResult};
use std::collections::HashMap;

/// Produces dense vectors for text.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Model identifier
    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

pub const DEFAULT_DIMENSIONS: usize = 384;

/// Character-trigram hashing embedder.
///
/// Each token contributes its trigrams and the whole token to hashed
/// buckets; the result is unit-normalised. Content-dependent and
/// reproducible, which is what offline search and tests need.
#[derive(Debug, Clone)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl Default for TrigramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl TrigramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, bytes: &[u8], seed: u64) -> usize {
        // FNV-1a
        let hash = bytes.iter().fold(0xcbf29ce484222325_u64 ^ seed, |acc, b| {
            (acc ^ *b as u64).wrapping_mul(0x100000001b3)
        });
        (hash % self.dimensions as u64) as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];

        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }

        for (token, count) in &counts {
            let weight = (*count as f32).sqrt();
            let padded: Vec<char> = format!(" {} ", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(trigram.as_bytes(), 0)] += weight;
            }
            vector[self.bucket(token.as_bytes(), 1)] += *count as f32;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unit_norm_and_dimensions() {
        let embedder = TrigramEmbedder::new(128);
        let embedding = embedder.embed("Corporate sustainability reporting").await.unwrap();

        assert_eq!(embedding.len(), 128);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = TrigramEmbedder::default();
        let a = embedder.embed("EUDR due diligence").await.unwrap();
        let b = embedder.embed("EUDR due diligence").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = TrigramEmbedder::new(16);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let embedder = TrigramEmbedder::new(64);
        let texts = vec!["csrd".to_string(), "gtin".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed("csrd").await.unwrap());
    }
}
