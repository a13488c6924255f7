/// The index pipeline (C11, §4.2): resolve scope, load, extract, map
/// routes, chunk, diff, embed, upsert/delete, record scope.
use crate::cost::{estimate_cost_usd, estimate_tokens};
use crate::routing::{build_route_mapper, resolve_route};
use crate::scope;
use crate::sources_glue::resolve_loader_config;
use beacon_chunking::chunk_page;
use beacon_config::BeaconConfig;
use beacon_core::model::{Chunk, ExtractedPage, IndexedPage};
use beacon_core::{BeaconError, Result, Scope};
use beacon_embeddings::{EmbeddingTask, EmbeddingsProvider};
use beacon_extract::{extract_html, extract_markdown, ExtractOutcome};
use beacon_search::page::{write_page_mirror, PageMirrorRecord};
use beacon_vector::{ScopeInfo, VectorRecord, VectorStore};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

static PIPELINE_RUNNING: AtomicBool = AtomicBool::new(false);

struct RunGuard;

impl RunGuard {
    fn acquire() -> Result<Self> {
        if PIPELINE_RUNNING.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(BeaconError::invalid_request("a pipeline run is already in progress for this process"));
        }
        Ok(Self)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        PIPELINE_RUNNING.store(false, Ordering::SeqCst);
    }
}

const UPSERT_BATCH_SIZE: usize = 100;
const STORE_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub scope_override: Option<String>,
    pub changed_only: bool,
    pub force: bool,
    pub dry_run: bool,
    pub source_override: Option<String>,
    pub max_pages: Option<i64>,
    pub max_chunks: Option<i64>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexStats {
    pub scope_name: String,
    pub pages_loaded: usize,
    pub pages_extracted: usize,
    pub chunks_total: usize,
    pub chunks_changed: usize,
    pub deletes: usize,
    pub estimated_tokens: u64,
    pub estimated_cost_usd: f64,
    pub dry_run: bool,
    pub warnings: Vec<String>,
}

pub struct IndexPipeline {
    config: BeaconConfig,
    embeddings: Arc<dyn EmbeddingsProvider>,
    store: Arc<dyn VectorStore>,
    http_client: reqwest::Client,
}

impl IndexPipeline {
    pub fn new(config: BeaconConfig, embeddings: Arc<dyn EmbeddingsProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { config, embeddings, store, http_client: reqwest::Client::new() }
    }

    pub async fn run(&self, options: RunOptions, cancel: CancellationToken) -> Result<IndexStats> {
        let _guard = RunGuard::acquire()?;
        let mut warnings = Vec::new();

        // Phase 1: resolve scope.
        let scope = match &options.scope_override {
            Some(name) => Scope::new(&self.config.project.id, name.clone()),
            None => scope::resolve_scope(&self.config.project.id, &self.config.scope)?,
        };

        if cancel.is_cancelled() {
            return Err(BeaconError::cancelled("pipeline run cancelled before loading sources"));
        }

        // Phase 2: load sources.
        let loader = resolve_loader_config(&self.config.source, options.source_override.as_deref())?;
        let mut pages = loader.load(&self.http_client).await?;
        if let Some(max_pages) = options.max_pages {
            let cap = max_pages.max(0) as usize;
            pages.truncate(cap);
        }

        // Phase 3: extract, drop noindex/empty, dedupe by url (first wins).
        let mut extracted: Vec<ExtractedPage> = Vec::new();
        let mut seen_urls = HashSet::new();
        for page in &pages {
            if !seen_urls.insert(page.url.clone()) {
                continue;
            }
            let outcome = if let Some(html) = &page.html {
                extract_html(&page.url, html, &self.config.extract, &self.config.transform)
            } else if let Some(markdown) = &page.markdown {
                extract_markdown(&page.url, markdown, None)
            } else {
                warnings.push(format!("page {} has neither html nor markdown, skipping", page.url));
                continue;
            };

            match outcome {
                ExtractOutcome::Page(extracted_page) => {
                    extracted.push(extracted_page);
                }
                ExtractOutcome::Dropped => {}
            }
        }

        // Phase 4: link graph.
        let incoming_links = compute_incoming_links(&extracted);

        // Phase 5: route mapping (fail-fast before any embedding call).
        let route_mapper = build_route_mapper(&self.config.source);
        let generated_at = Utc::now();
        let mut indexed_pages = Vec::with_capacity(extracted.len());
        for page in extracted {
            let (route_file, route_resolution) =
                resolve_route(route_mapper.as_ref(), &page.url, self.config.source.strict_route_mapping)?;
            let links_in = *incoming_links.get(&page.url).unwrap_or(&0);
            indexed_pages.push(IndexedPage::from_extracted(page, scope.clone(), route_file, route_resolution, links_in, generated_at));
        }

        if cancel.is_cancelled() {
            return Err(BeaconError::cancelled("pipeline run cancelled before chunking"));
        }

        // Optional page mirror (§5, §6): content-addressed, not consulted by diff.
        if !options.dry_run && !self.config.state.dir.is_empty() {
            let state_dir = std::path::Path::new(&self.config.state.dir);
            for page in &indexed_pages {
                let record = PageMirrorRecord {
                    url: page.url.clone(),
                    title: page.title.clone(),
                    scope: scope.scope_name.clone(),
                    route_file: page.route_file.clone(),
                    route_resolution: match page.route_resolution {
                        beacon_core::model::RouteResolution::Exact => "exact".to_string(),
                        beacon_core::model::RouteResolution::BestEffort => "best-effort".to_string(),
                    },
                    generated_at: page.generated_at,
                    incoming_links: page.incoming_links,
                    outgoing_links: page.outgoing_links.clone(),
                    depth: page.depth,
                    tags: page.tags.clone(),
                    body: page.markdown.clone(),
                };
                if let Err(e) = write_page_mirror(state_dir, &record) {
                    warnings.push(format!("failed to write page mirror for {}: {e}", page.url));
                }
            }
        }

        // Phase 6: chunk.
        let mut chunks: Vec<Chunk> = indexed_pages.iter().flat_map(|p| chunk_page(p, &self.config.chunking)).collect();
        if let Some(max_chunks) = options.max_chunks {
            let cap = max_chunks.max(0) as usize;
            chunks.truncate(cap);
        }

        // Phase 7: diff.
        let remote_hashes = self.store.get_content_hashes(&scope).await?;
        let new_hashes: HashMap<String, String> =
            chunks.iter().map(|c| (c.chunk_key.clone(), c.content_hash.clone())).collect();

        let (to_upsert, to_delete): (Vec<Chunk>, Vec<String>) = if options.force {
            let deletes = remote_hashes.keys().filter(|k| !new_hashes.contains_key(*k)).cloned().collect();
            (chunks, deletes)
        } else {
            let deletes = remote_hashes.keys().filter(|k| !new_hashes.contains_key(*k)).cloned().collect();
            if options.changed_only {
                let upserts = chunks
                    .into_iter()
                    .filter(|c| remote_hashes.get(&c.chunk_key) != Some(&c.content_hash))
                    .collect();
                (upserts, deletes)
            } else {
                (chunks, deletes)
            }
        };

        if cancel.is_cancelled() {
            return Err(BeaconError::cancelled("pipeline run cancelled before embedding"));
        }

        // Cost estimation (reported even in dry-run).
        let estimated_tokens: u64 = to_upsert.iter().map(|c| estimate_tokens(&c.chunk_text)).sum();
        let estimated_cost_usd = estimate_cost_usd(estimated_tokens, self.embeddings.model_id());

        let mut stats = IndexStats {
            scope_name: scope.scope_name.clone(),
            pages_loaded: pages.len(),
            pages_extracted: indexed_pages.len(),
            chunks_total: new_hashes.len(),
            chunks_changed: to_upsert.len(),
            deletes: to_delete.len(),
            estimated_tokens,
            estimated_cost_usd,
            dry_run: options.dry_run,
            warnings,
        };

        if options.dry_run {
            return Ok(stats);
        }

        // Phase 8: embed changed chunks only.
        if !to_upsert.is_empty() {
            let texts: Vec<String> = to_upsert.iter().map(|c| c.chunk_text.clone()).collect();
            let vectors = self.embeddings.embed_texts(&texts, EmbeddingTask::RetrievalPassage).await?;
            if vectors.len() != to_upsert.len() {
                return Err(BeaconError::embedding_provider_failed("embedding count did not match chunk count"));
            }

            let records: Vec<VectorRecord> = to_upsert
                .iter()
                .zip(vectors.into_iter())
                .map(|(chunk, vector)| VectorRecord::from_chunk(chunk, vector, &scope, self.embeddings.model_id()))
                .collect();

            // Phase 9: upsert, batched ≤100, bounded parallelism ≤4.
            let batches: Vec<Vec<VectorRecord>> =
                records.chunks(UPSERT_BATCH_SIZE).map(|c| c.to_vec()).collect();
            let store = &self.store;
            let scope_ref = &scope;
            stream::iter(batches.into_iter().map(|batch| async move { store.upsert(batch, scope_ref).await }))
                .buffer_unordered(STORE_CONCURRENCY)
                .collect::<Vec<Result<()>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<()>>>()?;
        }

        // Phase 10: delete stale, batched similarly.
        if !to_delete.is_empty() {
            let batches: Vec<Vec<String>> = to_delete.chunks(UPSERT_BATCH_SIZE).map(|c| c.to_vec()).collect();
            let store = &self.store;
            let scope_ref = &scope;
            stream::iter(batches.into_iter().map(|batch| async move { store.delete_by_ids(&batch, scope_ref).await }))
                .buffer_unordered(STORE_CONCURRENCY)
                .collect::<Vec<Result<()>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<()>>>()?;
        }

        // Phase 11: record scope. Updated last so a crash before this
        // point is safe; the next run converges (§5).
        let mut scope_info = ScopeInfo::new(&scope, self.embeddings.model_id());
        scope_info.vector_count = Some(new_hashes.len() as u64);
        scope_info.last_estimate_tokens = Some(estimated_tokens);
        scope_info.last_estimate_cost_usd = Some(estimated_cost_usd);
        scope_info.last_estimate_changed_chunks = Some(stats.chunks_changed as u64);
        self.store.record_scope(scope_info).await?;

        stats.dry_run = false;
        Ok(stats)
    }
}

fn compute_incoming_links(pages: &[ExtractedPage]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for page in pages {
        let mut seen_targets = HashSet::new();
        for link in &page.outgoing_links {
            let target = beacon_core::url::normalize(link);
            if target == page.url || !seen_targets.insert(target.clone()) {
                continue;
            }
            *counts.entry(target).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_links_counts_distinct_referencing_pages() {
        let pages = vec![
            ExtractedPage {
                url: "/a".into(),
                title: "A".into(),
                markdown: String::new(),
                outgoing_links: vec!["/b".into(), "/b".into()],
                noindex: false,
                tags: vec![],
                description: None,
                keywords: None,
                weight: None,
            },
            ExtractedPage {
                url: "/c".into(),
                title: "C".into(),
                markdown: String::new(),
                outgoing_links: vec!["/b".into()],
                noindex: false,
                tags: vec![],
                description: None,
                keywords: None,
                weight: None,
            },
        ];
        let counts = compute_incoming_links(&pages);
        assert_eq!(counts.get("/b"), Some(&2));
    }
}
