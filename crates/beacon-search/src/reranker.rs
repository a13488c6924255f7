/// Reranker contract and adapters (C13, §4.6).
use async_trait::async_trait;
use beacon_core::{retry::Attempt, retry_with_backoff, BeaconError, Result, RetryPolicy};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RerankCandidate {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RerankHit {
    pub id: String,
    pub score: f32,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns hits sorted descending by score. Invalid candidate indices
    /// in the response are silently dropped; a malformed payload is an
    /// error.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[RerankCandidate],
        top_n: Option<usize>,
    ) -> Result<Vec<RerankHit>>;
}

/// `rerank.provider = none`: disabled, passes candidates through
/// unscored in their original order.
pub struct NoneReranker;

#[async_trait]
impl Reranker for NoneReranker {
    async fn rerank(
        &self,
        _query: &str,
        candidates: &[RerankCandidate],
        top_n: Option<usize>,
    ) -> Result<Vec<RerankHit>> {
        let mut hits: Vec<RerankHit> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| RerankHit {
                id: c.id.clone(),
                score: 1.0 - (i as f32 * f32::EPSILON),
            })
            .collect();
        if let Some(n) = top_n {
            hits.truncate(n);
        }
        Ok(hits)
    }
}

#[derive(Debug, Clone)]
pub struct JinaRerankerConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

/// `rerank.provider = jina`: HTTP adapter against Jina's `/rerank` wire
/// format (documents in, relevance scores and original indices out).
pub struct JinaReranker {
    config: JinaRerankerConfig,
    client: Client,
}

impl JinaReranker {
    pub fn new(config: JinaRerankerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BeaconError::rerank_failed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Reranker for JinaReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: &[RerankCandidate],
        top_n: Option<usize>,
    ) -> Result<Vec<RerankHit>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let top_n = top_n.unwrap_or(candidates.len());

        let response = retry_with_backoff(self.config.retry, |_attempt| async {
            let payload = RerankRequest {
                model: self.config.model.clone(),
                query: query.to_string(),
                documents: documents.clone(),
                top_n,
            };

            let response = match self
                .client
                .post(format!("{}/rerank", self.config.api_base))
                .bearer_auth(&self.config.api_key)
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => return Attempt::Retryable(BeaconError::rerank_failed(format!("transport error: {e}"))),
            };

            let status = response.status();
            if status.is_success() {
                match response.json::<RerankResponse>().await {
                    Ok(body) => Attempt::Success(body),
                    Err(e) => Attempt::Retryable(BeaconError::rerank_failed(format!("failed to parse response: {e}"))),
                }
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                Attempt::Retryable(BeaconError::rerank_failed(format!(
                    "{{\"status\":{},\"body\":{:?}}}",
                    status.as_u16(),
                    body
                )))
            } else {
                let body = response.text().await.unwrap_or_default();
                Attempt::Fatal(BeaconError::rerank_failed(format!(
                    "{{\"status\":{},\"body\":{:?}}}",
                    status.as_u16(),
                    body
                )))
            }
        })
        .await?;

        let hits = response
            .results
            .into_iter()
            .filter_map(|r| {
                candidates
                    .get(r.index)
                    .map(|c| RerankHit { id: c.id.clone(), score: r.relevance_score })
            })
            .collect();
        Ok(hits)
    }
}

#[derive(Serialize)]
struct RerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResultItem>,
}

#[derive(Deserialize)]
struct RerankResultItem {
    index: usize,
    relevance_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn none_reranker_preserves_order() {
        let reranker = NoneReranker;
        let candidates = vec![
            RerankCandidate { id: "a".into(), text: "x".into() },
            RerankCandidate { id: "b".into(), text: "y".into() },
        ];
        let hits = reranker.rerank("q", &candidates, None).await.unwrap();
        assert_eq!(hits.iter().map(|h| h.id.clone()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn none_reranker_respects_top_n() {
        let reranker = NoneReranker;
        let candidates = vec![
            RerankCandidate { id: "a".into(), text: "x".into() },
            RerankCandidate { id: "b".into(), text: "y".into() },
        ];
        let hits = reranker.rerank("q", &candidates, Some(1)).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
