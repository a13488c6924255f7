use async_trait::async_trait;
use beacon_core::Result;
use serde::{Deserialize, Serialize};

/// Which side of a retrieval pair a text is being embedded for. Some
/// providers use different instructions/prefixes for each (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingTask {
    RetrievalPassage,
    RetrievalQuery,
}

impl Default for EmbeddingTask {
    fn default() -> Self {
        EmbeddingTask::RetrievalPassage
    }
}

/// Batched, order-preserving text embedding (C8).
#[async_trait]
pub trait EmbeddingsProvider: Send + Sync {
    /// Returns one vector per input text, in positional correspondence with
    /// `texts`, regardless of how the provider batches requests internally.
    async fn embed_texts(&self, texts: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>>;

    /// Convenience wrapper for a single query embedding.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_texts(&[text.to_string()], EmbeddingTask::RetrievalQuery).await?;
        Ok(out.pop().unwrap_or_default())
    }

    fn model_id(&self) -> &str;
}
