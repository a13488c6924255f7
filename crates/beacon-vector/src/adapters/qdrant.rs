/// Qdrant-flavored HTTP vector store adapter.
///
/// Each `(projectId, scopeName)` maps to its own Qdrant collection so that
/// scope isolation is enforced by the backend rather than by a shared-filter
/// convention. Points carry the full `VectorMetadata` as payload; filters for
/// `path_prefix` and `tags` are pushed down to Qdrant's payload `must` clauses
/// where possible, but `path_prefix` still needs a client-side check because
/// Qdrant has no native prefix-match operator (§4.5) -- we use the dir-bucket
/// fields as a coarse pre-filter and confirm with `matches_prefix` afterward.
use crate::model::{HealthStatus, QueryOptions, ScopeInfo, VectorHit, VectorMetadata, VectorRecord};
use crate::traits::VectorStore;
use crate::util::dir_buckets;
use async_trait::async_trait;
use beacon_core::{BeaconError, Result, Scope};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const DIR_BUCKET_DEPTH: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

pub struct QdrantAdapter {
    config: QdrantConfig,
    client: Client,
}

impl QdrantAdapter {
    pub fn new(config: QdrantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                BeaconError::vector_backend_unavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { config, client })
    }

    fn collection_name(scope: &Scope) -> String {
        format!("beacon__{}__{}", scope.project_id, scope.scope_name)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.url, path);
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.config.api_key {
            req = req.header("api-key", key);
        }
        req
    }

    async fn ensure_collection(&self, scope: &Scope, vector_size: usize) -> Result<()> {
        let name = Self::collection_name(scope);
        let check = self
            .request(reqwest::Method::GET, &format!("/collections/{name}"))
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if check.status().is_success() {
            return Ok(());
        }
        let body = serde_json::json!({
            "vectors": { "size": vector_size, "distance": "Cosine" }
        });
        let resp = self
            .request(reqwest::Method::PUT, &format!("/collections/{name}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BeaconError::vector_backend_unavailable(format!(
                "failed to create collection {name}: {status} {text}"
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Point {
    id: String,
    vector: Vec<f32>,
    payload: PointPayload,
}

#[derive(Serialize, Deserialize, Clone)]
struct PointPayload {
    #[serde(flatten)]
    metadata: VectorMetadata,
    dir_buckets: Vec<Option<String>>,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: serde_json::Value,
    score: f32,
    payload: PointPayload,
}

#[derive(Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
    next_page_offset: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ScrollPoint {
    id: serde_json::Value,
    payload: PointPayload,
}

fn id_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl VectorStore for QdrantAdapter {
    async fn upsert(&self, records: Vec<VectorRecord>, scope: &Scope) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.ensure_collection(scope, records[0].vector.len()).await?;
        let name = Self::collection_name(scope);
        let points: Vec<Point> = records
            .into_iter()
            .map(|r| {
                let dir_buckets = dir_buckets(&r.metadata.path, DIR_BUCKET_DEPTH);
                Point {
                    id: r.id,
                    vector: r.vector,
                    payload: PointPayload {
                        metadata: r.metadata,
                        dir_buckets,
                    },
                }
            })
            .collect();
        let body = serde_json::json!({ "points": points });
        let resp = self
            .request(reqwest::Method::PUT, &format!("/collections/{name}/points?wait=true"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BeaconError::vector_backend_unavailable(format!(
                "upsert failed: {status} {text}"
            )));
        }
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, opts: QueryOptions, scope: &Scope) -> Result<Vec<VectorHit>> {
        let name = Self::collection_name(scope);
        let mut must = Vec::new();
        if let Some(tags) = &opts.tags {
            for tag in tags {
                must.push(serde_json::json!({ "key": "tags", "match": { "value": tag } }));
            }
        }
        // Coarse pre-filter on the first dir-bucket; the final prefix check
        // still runs client-side below since buckets alone can't express
        // "starts with" across arbitrary depth.
        if let Some(prefix) = &opts.path_prefix {
            if let Some(first) = prefix.trim_start_matches('/').split('/').find(|s| !s.is_empty()) {
                must.push(serde_json::json!({ "key": "dir_buckets[0]", "match": { "value": first } }));
            }
        }
        let over_fetch = opts.top_k.saturating_mul(4).max(opts.top_k).max(1);
        let mut body = serde_json::json!({
            "vector": vector,
            "limit": over_fetch,
            "with_payload": true,
        });
        if !must.is_empty() {
            body["filter"] = serde_json::json!({ "must": must });
        }
        let resp = self
            .request(reqwest::Method::POST, &format!("/collections/{name}/points/search"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BeaconError::vector_backend_unavailable(format!(
                "search failed: {status} {text}"
            )));
        }
        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(format!("bad search response: {e}")))?;

        let mut hits: Vec<VectorHit> = parsed
            .result
            .into_iter()
            .filter(|r| {
                opts.path_prefix
                    .as_ref()
                    .map(|p| beacon_core::url::matches_prefix(&r.payload.metadata.path, p))
                    .unwrap_or(true)
            })
            .map(|r| VectorHit {
                id: id_to_string(&r.id),
                score: r.score,
                metadata: r.payload.metadata,
            })
            .collect();
        hits.truncate(opts.top_k);
        Ok(hits)
    }

    async fn delete_by_ids(&self, ids: &[String], scope: &Scope) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let name = Self::collection_name(scope);
        let body = serde_json::json!({ "points": ids });
        let resp = self
            .request(reqwest::Method::POST, &format!("/collections/{name}/points/delete?wait=true"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BeaconError::vector_backend_unavailable(format!(
                "delete failed: {status} {text}"
            )));
        }
        Ok(())
    }

    async fn delete_scope(&self, scope: &Scope) -> Result<()> {
        let name = Self::collection_name(scope);
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/collections/{name}"))
            .send()
            .await
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            let status = resp.status();
            return Err(BeaconError::vector_backend_unavailable(format!(
                "failed to drop collection {name}: {status}"
            )));
        }
        Ok(())
    }

    async fn list_scopes(&self, project_id: &str) -> Result<Vec<ScopeInfo>> {
        // Qdrant has no registry of our scope metadata; collections alone
        // can't recover last_indexed_at/estimates, so this adapter relies on
        // the caller pairing it with a registry-capable store for C15. An
        // empty result here is a deliberate limitation, not a bug.
        let _ = project_id;
        Ok(Vec::new())
    }

    async fn record_scope(&self, _info: ScopeInfo) -> Result<()> {
        Ok(())
    }

    async fn get_content_hashes(&self, scope: &Scope) -> Result<HashMap<String, String>> {
        let name = Self::collection_name(scope);
        let mut out = HashMap::new();
        let mut offset: Option<serde_json::Value> = None;
        loop {
            let mut body = serde_json::json!({
                "limit": 256,
                "with_payload": true,
                "with_vector": false,
            });
            if let Some(o) = &offset {
                body["offset"] = o.clone();
            }
            let resp = self
                .request(reqwest::Method::POST, &format!("/collections/{name}/points/scroll"))
                .json(&body)
                .send()
                .await;
            let resp = match resp {
                Ok(r) => r,
                Err(_) => break, // collection doesn't exist yet: scope has no vectors
            };
            if !resp.status().is_success() {
                break;
            }
            let parsed: ScrollResponse = resp
                .json()
                .await
                .map_err(|e| BeaconError::vector_backend_unavailable(format!("bad scroll response: {e}")))?;
            for point in parsed.result.points {
                out.insert(id_to_string(&point.id), point.payload.metadata.content_hash);
            }
            offset = parsed.result.next_page_offset;
            if offset.is_none() || matches!(offset, Some(serde_json::Value::Null)) {
                break;
            }
        }
        Ok(out)
    }

    async fn health(&self) -> Result<HealthStatus> {
        match self.request(reqwest::Method::GET, "/healthz").send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::healthy()),
            Ok(resp) => Ok(HealthStatus::unhealthy(format!("status {}", resp.status()))),
            Err(e) => Ok(HealthStatus::unhealthy(e.to_string())),
        }
    }
}
