/// The search engine (C12, §4.7): validate, embed, query, optionally
/// rerank and merge, group, and report timings.
use crate::merge::{merge, MergeEntry};
use crate::reranker::{RerankCandidate, Reranker};
use beacon_core::{BeaconError, Result, Scope};
use beacon_embeddings::EmbeddingsProvider;
use beacon_vector::{QueryOptions, VectorHit, VectorStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const DEFAULT_TOP_K: usize = 10;
const DEFAULT_MAX_DISPLACEMENT: usize = 3;
const MAX_SIBLING_CHUNKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Chunk,
    Page,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub q: String,
    pub top_k: Option<usize>,
    pub scope: Scope,
    pub path_prefix: Option<String>,
    pub tags: Option<Vec<String>>,
    pub rerank: bool,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub score: f32,
    pub url: String,
    pub path: String,
    pub title: String,
    pub section_title: Option<String>,
    pub snippet: String,
    pub chunk_text: String,
    /// Populated only when `groupBy = page`: up to 3 next-best chunks
    /// on the same page.
    #[serde(default)]
    pub chunks: Vec<SearchResultItem>,
}

impl From<&VectorHit> for SearchResultItem {
    fn from(hit: &VectorHit) -> Self {
        Self {
            id: hit.id.clone(),
            score: hit.score,
            url: hit.metadata.url.clone(),
            path: hit.metadata.path.clone(),
            title: hit.metadata.title.clone(),
            section_title: hit.metadata.section_title.clone(),
            snippet: hit.metadata.snippet.clone(),
            chunk_text: hit.metadata.chunk_text.clone(),
            chunks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingsMs {
    pub embed: u64,
    pub vector: u64,
    pub rerank: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponseMeta {
    pub timings_ms: TimingsMs,
    pub used_rerank: bool,
    pub model_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub q: String,
    pub scope: Scope,
    pub results: Vec<SearchResultItem>,
    pub meta: SearchResponseMeta,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Initial(SearchResponse),
    Reranked(SearchResponse),
}

pub struct SearchEngineConfig {
    pub max_displacement: usize,
    pub rerank_top_n: usize,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self { max_displacement: DEFAULT_MAX_DISPLACEMENT, rerank_top_n: DEFAULT_TOP_K }
    }
}

pub struct SearchEngine {
    embeddings: Arc<dyn EmbeddingsProvider>,
    store: Arc<dyn VectorStore>,
    reranker: Option<Arc<dyn Reranker>>,
    config: SearchEngineConfig,
}

impl SearchEngine {
    pub fn new(
        embeddings: Arc<dyn EmbeddingsProvider>,
        store: Arc<dyn VectorStore>,
        reranker: Option<Arc<dyn Reranker>>,
        config: SearchEngineConfig,
    ) -> Self {
        Self { embeddings, store, reranker, config }
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();
        if request.q.trim().is_empty() {
            return Err(BeaconError::invalid_request("q must be non-empty"));
        }

        let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K);
        let want_rerank = request.rerank && self.reranker.is_some();
        let query_top_k = if want_rerank { top_k.max(self.config.rerank_top_n) } else { top_k };

        let embed_start = Instant::now();
        let query_vector = self.embeddings.embed_query(&request.q).await?;
        let embed_ms = embed_start.elapsed().as_millis() as u64;

        let vector_start = Instant::now();
        let hits = self
            .store
            .query(
                query_vector,
                QueryOptions { top_k: query_top_k, path_prefix: request.path_prefix.clone(), tags: request.tags.clone() },
                &request.scope,
            )
            .await?;
        let vector_ms = vector_start.elapsed().as_millis() as u64;

        let mut items: Vec<SearchResultItem> = hits.iter().map(SearchResultItem::from).collect();
        let mut rerank_ms = 0u64;
        let mut used_rerank = false;

        if want_rerank {
            let reranker = self.reranker.as_ref().unwrap();
            let candidates: Vec<RerankCandidate> =
                hits.iter().map(|h| RerankCandidate { id: h.id.clone(), text: h.metadata.chunk_text.clone() }).collect();

            let rerank_start = Instant::now();
            let reranked = reranker.rerank(&request.q, &candidates, Some(self.config.rerank_top_n)).await?;
            rerank_ms = rerank_start.elapsed().as_millis() as u64;

            // §4.6's displacement is computed per URL, not per chunk id, so
            // both sides of the merge carry the owning page's url alongside
            // the chunk id the score/identity is ultimately keyed on.
            let id_to_url: std::collections::HashMap<String, String> =
                hits.iter().map(|h| (h.id.clone(), h.metadata.url.clone())).collect();

            let initial_entries: Vec<MergeEntry> =
                items.iter().map(|i| MergeEntry { id: i.id.clone(), url: i.url.clone(), score: i.score }).collect();
            let reranked_entries: Vec<MergeEntry> = reranked
                .iter()
                .map(|h| MergeEntry {
                    id: h.id.clone(),
                    url: id_to_url.get(&h.id).cloned().unwrap_or_else(|| h.id.clone()),
                    score: h.score,
                })
                .collect();
            let merged = merge(&initial_entries, &reranked_entries, self.config.max_displacement);

            let by_id: std::collections::HashMap<String, SearchResultItem> =
                items.into_iter().map(|i| (i.id.clone(), i)).collect();
            items = merged
                .into_iter()
                .filter_map(|entry| {
                    by_id.get(&entry.id).map(|item| {
                        let mut item = item.clone();
                        item.score = entry.score;
                        item
                    })
                })
                .collect();
            used_rerank = true;
        }

        items.truncate(top_k);
        let results = group_results(items, request.group_by);

        let total_ms = start.elapsed().as_millis() as u64;
        Ok(SearchResponse {
            q: request.q,
            scope: request.scope,
            results,
            meta: SearchResponseMeta {
                timings_ms: TimingsMs { embed: embed_ms, vector: vector_ms, rerank: rerank_ms, total: total_ms },
                used_rerank,
                model_id: self.embeddings.model_id().to_string(),
            },
        })
    }

    /// Streaming variant: emits `Initial` (pre-rerank) strictly before
    /// `Reranked` (final) when reranking runs; callers that don't care
    /// about the intermediate event can just drain to the last one.
    pub async fn search_streaming(&self, request: SearchRequest) -> Result<mpsc::Receiver<SearchEvent>> {
        let (tx, rx) = mpsc::channel(2);

        if !request.rerank || self.reranker.is_none() {
            let response = self.search(request).await?;
            let _ = tx.send(SearchEvent::Reranked(response)).await;
            return Ok(rx);
        }

        let mut without_rerank = request.clone();
        without_rerank.rerank = false;
        let initial = self.search(without_rerank).await?;
        let _ = tx.send(SearchEvent::Initial(initial)).await;

        let reranked = self.search(request).await?;
        let _ = tx.send(SearchEvent::Reranked(reranked)).await;

        Ok(rx)
    }
}

fn group_results(items: Vec<SearchResultItem>, group_by: GroupBy) -> Vec<SearchResultItem> {
    if group_by == GroupBy::Chunk {
        return items;
    }

    let mut by_url: Vec<(String, Vec<SearchResultItem>)> = Vec::new();
    for item in items {
        if let Some(entry) = by_url.iter_mut().find(|(url, _)| *url == item.url) {
            entry.1.push(item);
        } else {
            by_url.push((item.url.clone(), vec![item]));
        }
    }

    let mut grouped: Vec<SearchResultItem> = by_url
        .into_iter()
        .map(|(_, mut chunks)| {
            chunks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            let mut representative = chunks.remove(0);
            chunks.truncate(MAX_SIBLING_CHUNKS);
            representative.chunks = chunks;
            representative
        })
        .collect();

    grouped.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, score: f32) -> SearchResultItem {
        SearchResultItem {
            id: format!("{url}#0"),
            score,
            url: url.to_string(),
            path: url.to_string(),
            title: url.to_string(),
            section_title: None,
            snippet: String::new(),
            chunk_text: String::new(),
            chunks: Vec::new(),
        }
    }

    #[test]
    fn chunk_grouping_passes_through_unchanged() {
        let items = vec![item("/a", 0.9), item("/a", 0.5)];
        let grouped = group_results(items.clone(), GroupBy::Chunk);
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn page_grouping_picks_best_representative_and_attaches_siblings() {
        let items = vec![item("/a", 0.5), item("/a", 0.9), item("/b", 0.7)];
        let grouped = group_results(items, GroupBy::Page);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].url, "/a");
        assert_eq!(grouped[0].score, 0.9);
        assert_eq!(grouped[0].chunks.len(), 1);
        assert_eq!(grouped[0].chunks[0].score, 0.5);
    }
}
