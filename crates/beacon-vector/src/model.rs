use beacon_core::{Chunk, DateTime, Scope, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chunk plus its embedding, ready for upsert into a vector backend (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// All `Chunk` fields plus the model id and scope identifiers, denormalized
/// so a query result is self-describing without a join back to a page
/// table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub project_id: String,
    pub scope_name: String,
    pub model_id: String,
    pub url: String,
    pub path: String,
    pub title: String,
    pub section_title: Option<String>,
    pub heading_path: Vec<String>,
    pub chunk_text: String,
    pub snippet: String,
    pub ordinal: usize,
    pub depth: usize,
    pub incoming_links: usize,
    pub route_file: String,
    pub tags: Vec<String>,
    pub content_hash: String,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl VectorRecord {
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>, scope: &Scope, model_id: &str) -> Self {
        Self {
            id: chunk.chunk_key.clone(),
            vector,
            metadata: VectorMetadata {
                project_id: scope.project_id.clone(),
                scope_name: scope.scope_name.clone(),
                model_id: model_id.to_string(),
                url: chunk.url.clone(),
                path: chunk.path.clone(),
                title: chunk.title.clone(),
                section_title: chunk.section_title.clone(),
                heading_path: chunk.heading_path.clone(),
                chunk_text: chunk.chunk_text.clone(),
                snippet: chunk.snippet.clone(),
                ordinal: chunk.ordinal,
                depth: chunk.depth,
                incoming_links: chunk.incoming_links,
                route_file: chunk.route_file.clone(),
                tags: chunk.tags.clone(),
                content_hash: chunk.content_hash.clone(),
                description: chunk.description.clone(),
                keywords: chunk.keywords.clone(),
            },
        }
    }
}

/// A scored query result (score is cosine similarity in `[-1, 1]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
    pub metadata: VectorMetadata,
}

/// Query options (§4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    pub top_k: usize,
    pub path_prefix: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Per-scope registry metadata (C15, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub project_id: String,
    pub scope_name: String,
    pub model_id: String,
    pub last_indexed_at: DateTime<Utc>,
    pub vector_count: Option<u64>,
    pub last_estimate_tokens: Option<u64>,
    pub last_estimate_cost_usd: Option<f64>,
    pub last_estimate_changed_chunks: Option<u64>,
}

impl ScopeInfo {
    pub fn new(scope: &Scope, model_id: impl Into<String>) -> Self {
        Self {
            project_id: scope.project_id.clone(),
            scope_name: scope.scope_name.clone(),
            model_id: model_id.into(),
            last_indexed_at: Utc::now(),
            vector_count: None,
            last_estimate_tokens: None,
            last_estimate_cost_usd: None,
            last_estimate_changed_chunks: None,
        }
    }
}

/// Health probe result (§4.5 `health()`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub details: Option<HashMap<String, String>>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            details: None,
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        let mut details = HashMap::new();
        details.insert("reason".to_string(), detail.into());
        Self {
            ok: false,
            details: Some(details),
        }
    }
}
