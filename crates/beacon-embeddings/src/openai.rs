/// OpenAI-compatible HTTP embeddings adapter (§4.8). Works against any
/// provider that speaks the `/embeddings` wire format (OpenAI, most local
/// servers, many hosted rerouters).
use crate::traits::{EmbeddingTask, EmbeddingsProvider};
use async_trait::async_trait;
use beacon_core::{retry::Attempt, retry_with_backoff, BeaconError, Result, RetryPolicy};
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingsConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub batch_size: usize,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl OpenAiEmbeddingsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BeaconError::config_missing("embeddings.batchSize must be a positive integer"));
        }
        if self.concurrency == 0 {
            return Err(BeaconError::config_missing("embeddings.concurrency must be a positive integer"));
        }
        Ok(())
    }
}

pub struct OpenAiEmbeddingsProvider {
    config: OpenAiEmbeddingsConfig,
    client: Client,
}

impl OpenAiEmbeddingsProvider {
    pub fn new(config: OpenAiEmbeddingsConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BeaconError::embedding_provider_failed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn embed_batch(&self, batch: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        retry_with_backoff(self.config.retry, |_attempt| async move {
            let payload = EmbeddingsRequest {
                input: batch.to_vec(),
                model: self.config.model.clone(),
                task: Some(task_label(task)),
            };

            let response = match self
                .client
                .post(format!("{}/embeddings", self.config.api_base))
                .bearer_auth(&self.config.api_key)
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    return Attempt::Retryable(BeaconError::embedding_provider_failed(format!(
                        "transport error: {e}"
                    )))
                }
            };

            let status = response.status();
            if status.is_success() {
                match response.json::<EmbeddingsResponse>().await {
                    Ok(body) => {
                        let mut ordered: Vec<Option<Vec<f32>>> = vec![None; batch.len()];
                        for item in body.data {
                            if let Some(slot) = ordered.get_mut(item.index) {
                                *slot = Some(item.embedding);
                            }
                        }
                        match ordered.into_iter().collect::<Option<Vec<_>>>() {
                            Some(vectors) => Attempt::Success(vectors),
                            None => Attempt::Retryable(BeaconError::embedding_provider_failed(
                                "response missing embeddings for one or more inputs",
                            )),
                        }
                    }
                    Err(e) => Attempt::Retryable(BeaconError::embedding_provider_failed(format!(
                        "failed to parse response: {e}"
                    ))),
                }
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                Attempt::Retryable(BeaconError::embedding_provider_failed(format!(
                    "{{\"status\":{},\"body\":{:?}}}",
                    status.as_u16(),
                    body
                )))
            } else {
                let body = response.text().await.unwrap_or_default();
                Attempt::Fatal(BeaconError::embedding_provider_failed(format!(
                    "{{\"status\":{},\"body\":{:?}}}",
                    status.as_u16(),
                    body
                )))
            }
        })
        .await
    }
}

fn task_label(task: EmbeddingTask) -> &'static str {
    match task {
        EmbeddingTask::RetrievalPassage => "retrieval.passage",
        EmbeddingTask::RetrievalQuery => "retrieval.query",
    }
}

#[async_trait]
impl EmbeddingsProvider for OpenAiEmbeddingsProvider {
    async fn embed_texts(&self, texts: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batches: Vec<(usize, Vec<String>)> = texts
            .chunks(self.config.batch_size)
            .enumerate()
            .map(|(i, chunk)| (i * self.config.batch_size, chunk.to_vec()))
            .collect();

        let results = stream::iter(batches.into_iter().map(|(start, batch)| async move {
            let vectors = self.embed_batch(&batch, task).await?;
            Ok::<_, BeaconError>((start, vectors))
        }))
        .buffer_unordered(self.config.concurrency)
        .collect::<Vec<_>>()
        .await;

        let mut ordered: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for result in results {
            let (start, vectors) = result?;
            for (offset, vector) in vectors.into_iter().enumerate() {
                ordered[start + offset] = Some(vector);
            }
        }

        ordered
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| BeaconError::embedding_provider_failed("incomplete embedding results"))
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    input: Vec<String>,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'static str>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_batch_size() {
        let config = OpenAiEmbeddingsConfig {
            api_base: "http://localhost".into(),
            api_key: "k".into(),
            model: "m".into(),
            batch_size: 0,
            concurrency: 1,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
        };
        assert!(OpenAiEmbeddingsProvider::new(config).is_err());
    }
}
