pub mod engine;
pub mod merge;
pub mod page;
pub mod reranker;

pub use engine::{
    GroupBy, SearchEngine, SearchEngineConfig, SearchEvent, SearchRequest, SearchResponse,
    SearchResponseMeta, SearchResultItem, TimingsMs,
};
pub use merge::{merge, MergeEntry};
pub use page::{get_page, write_page_mirror, PageMirrorRecord};
pub use reranker::{JinaReranker, JinaRerankerConfig, NoneReranker, RerankCandidate, RerankHit, Reranker};
