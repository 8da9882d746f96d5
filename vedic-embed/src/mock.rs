//! Deterministic embedding provider that needs no model files.
//!
//! Each lowercase alphanumeric token is hashed with FNV into one of
//! `dimension` buckets and the resulting bag-of-words vector is normalized.
//! Texts sharing vocabulary therefore score a positive cosine similarity,
//! texts with no shared tokens score zero. Useful for offline runs and tests.

use crate::error::Result;
use crate::provider::{EmbeddingProvider, EmbeddingResult, l2_normalize};
use async_trait::async_trait;
use fnv::FnvHasher;
use std::hash::Hasher;

/// Token-hashing embedding provider with a fixed dimension.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed synchronously; the async trait methods delegate here.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let mut hasher = FnvHasher::default();
            hasher.write(token.as_bytes());
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        l2_normalize(vector)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        Ok(EmbeddingResult::new(
            texts.iter().map(|text| self.embed_sync(text)).collect(),
        ))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let provider = MockEmbeddingProvider::new(64);
        let a = provider.embed_sync("Charm against fear");
        let b = provider.embed_sync("charm AGAINST fear!");

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let provider = MockEmbeddingProvider::new(384);
        let query = provider.embed_sync("protection from fear");
        let related = provider.embed_sync("May the gods protect us from all fear.");
        let unrelated = provider.embed_sync("hymn to the plough");

        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let provider = MockEmbeddingProvider::new(8);
        assert!(provider.embed_sync("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_trait_batch_matches_single() {
        let provider = MockEmbeddingProvider::new(32);
        let texts = vec!["one hymn".to_string(), "two hymns".to_string()];

        let batch = tokio_test::block_on(provider.embed_texts(&texts)).unwrap();
        let single = tokio_test::block_on(provider.embed_text("two hymns")).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.dimension, 32);
        assert_eq!(batch.embeddings[1], single);
        assert_eq!(provider.provider_name(), "mock");
    }
}
