pub mod cost;
pub mod factory;
pub mod pipeline;
pub mod routing;
pub mod scope;
pub mod sources_glue;

pub use factory::{build_embeddings_provider, build_reranker, build_vector_store};
pub use pipeline::{IndexPipeline, IndexStats, RunOptions};
pub use scope::resolve_scope;
