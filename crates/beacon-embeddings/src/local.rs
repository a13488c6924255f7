/// Deterministic local embeddings: hashes text content into a fixed-size
/// unit vector. Not semantically meaningful, but stable run-to-run -- used
/// for tests and for the `local` vector/embeddings pairing that needs no
/// network access.
use crate::traits::{EmbeddingTask, EmbeddingsProvider};
use async_trait::async_trait;
use beacon_core::{BeaconError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub struct LocalEmbeddingsProvider {
    dimension: usize,
    model_id: String,
}

impl LocalEmbeddingsProvider {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(BeaconError::config_missing("embeddings dimension must be greater than 0"));
        }
        Ok(Self { dimension, model_id: format!("local-hash-{dimension}") })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let base = hasher.finish();

        let mut vector = vec![0.0f32; self.dimension];
        for (i, value) in vector.iter_mut().enumerate() {
            let mut h = DefaultHasher::new();
            base.hash(&mut h);
            i.hash(&mut h);
            let bits = h.finish();
            *value = ((bits % 2000) as f32 - 1000.0) / 1000.0;
        }

        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in vector.iter_mut() {
                *v /= magnitude;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingsProvider for LocalEmbeddingsProvider {
    async fn embed_texts(&self, texts: &[String], _task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn is_deterministic_and_order_preserving() {
        let provider = LocalEmbeddingsProvider::new(8).unwrap();
        let texts = vec!["alpha".to_string(), "beta".to_string(), "alpha".to_string()];
        let first = provider.embed_texts(&texts, EmbeddingTask::RetrievalPassage).await.unwrap();
        let second = provider.embed_texts(&texts, EmbeddingTask::RetrievalPassage).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn rejects_zero_dimension() {
        assert!(LocalEmbeddingsProvider::new(0).is_err());
    }
}
