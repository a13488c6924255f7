/// Shared plumbing every subcommand needs: load config, build the
/// embeddings/vector/reranker adapters, assemble a search engine.
use anyhow::{Context, Result};
use beacon_config::{BeaconConfig, ConfigResolver};
use beacon_core::BeaconError;
use beacon_embeddings::EmbeddingsProvider;
use beacon_pipeline::{build_embeddings_provider, build_reranker, build_vector_store};
use beacon_search::{SearchEngine, SearchEngineConfig};
use beacon_vector::VectorStore;
use std::sync::Arc;

pub fn to_anyhow(e: BeaconError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", e.kind_code, e.message)
}

pub fn load_config(resolver: ConfigResolver) -> Result<BeaconConfig> {
    resolver.load().context("failed to load configuration")
}

pub fn build_adapters(config: &BeaconConfig) -> Result<(Arc<dyn EmbeddingsProvider>, Arc<dyn VectorStore>)> {
    let embeddings = build_embeddings_provider(config).map_err(to_anyhow)?;
    let store = build_vector_store(config).map_err(to_anyhow)?;
    Ok((embeddings, store))
}

pub fn build_engine(
    config: &BeaconConfig,
    embeddings: Arc<dyn EmbeddingsProvider>,
    store: Arc<dyn VectorStore>,
) -> Result<SearchEngine> {
    let reranker = build_reranker(config).map_err(to_anyhow)?;
    let engine_config = SearchEngineConfig { max_displacement: config.rerank.max_displacement, rerank_top_n: config.rerank.top_n };
    Ok(SearchEngine::new(embeddings, store, reranker, engine_config))
}
