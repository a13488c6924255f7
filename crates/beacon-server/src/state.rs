/// Shared application state handed to every transport (HTTP, stdio, MCP).
use beacon_config::BeaconConfig;
use beacon_core::{Result, Scope};
use beacon_embeddings::EmbeddingsProvider;
use beacon_pipeline::IndexPipeline;
use beacon_search::SearchEngine;
use beacon_vector::VectorStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: BeaconConfig,
    pub engine: Arc<SearchEngine>,
    pub pipeline: Arc<IndexPipeline>,
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingsProvider>,
}

impl AppState {
    pub fn new(
        config: BeaconConfig,
        embeddings: Arc<dyn EmbeddingsProvider>,
        store: Arc<dyn VectorStore>,
        engine: SearchEngine,
    ) -> Self {
        let pipeline = IndexPipeline::new(config.clone(), embeddings.clone(), store.clone());
        Self { config, engine: Arc::new(engine), pipeline: Arc::new(pipeline), store, embeddings }
    }

    /// Resolves the scope for a request: an explicit override if given,
    /// otherwise whatever `scope.mode` in the loaded config resolves to.
    pub fn resolve_scope(&self, override_name: Option<&str>) -> Result<Scope> {
        match override_name {
            Some(name) => Ok(Scope::new(&self.config.project.id, name)),
            None => beacon_pipeline::resolve_scope(&self.config.project.id, &self.config.scope),
        }
    }
}
