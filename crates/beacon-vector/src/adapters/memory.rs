/// In-memory vector store adapter.
///
/// A reference implementation of `VectorStore`: not durable, but exercises
/// the full scope-isolation and filter contract, and is fast enough to back
/// unit tests for the pipeline and search engine without a network backend.
use crate::model::{HealthStatus, QueryOptions, ScopeInfo, VectorHit, VectorRecord};
use crate::traits::VectorStore;
use crate::util::cosine_similarity;
use async_trait::async_trait;
use beacon_core::{Result, Scope};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct ScopeData {
    records: HashMap<String, VectorRecord>,
    info: Option<ScopeInfo>,
}

pub struct InMemoryVectorStore {
    scopes: RwLock<HashMap<String, ScopeData>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>, scope: &Scope) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        let data = scopes.entry(scope.scope_id()).or_default();
        for record in records {
            data.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, opts: QueryOptions, scope: &Scope) -> Result<Vec<VectorHit>> {
        let scopes = self.scopes.read().await;
        let Some(data) = scopes.get(&scope.scope_id()) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<VectorHit> = data
            .records
            .values()
            .filter(|r| {
                if let Some(prefix) = &opts.path_prefix {
                    if !beacon_core::url::matches_prefix(&r.metadata.path, prefix) {
                        return false;
                    }
                }
                if let Some(tags) = &opts.tags {
                    if !tags.iter().all(|t| r.metadata.tags.contains(t)) {
                        return false;
                    }
                }
                true
            })
            .map(|r| VectorHit {
                id: r.id.clone(),
                score: cosine_similarity(&vector, &r.vector),
                metadata: r.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.top_k);
        Ok(hits)
    }

    async fn delete_by_ids(&self, ids: &[String], scope: &Scope) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        if let Some(data) = scopes.get_mut(&scope.scope_id()) {
            for id in ids {
                data.records.remove(id);
            }
        }
        Ok(())
    }

    async fn delete_scope(&self, scope: &Scope) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        scopes.remove(&scope.scope_id());
        Ok(())
    }

    async fn list_scopes(&self, project_id: &str) -> Result<Vec<ScopeInfo>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .values()
            .filter_map(|d| d.info.clone())
            .filter(|i| i.project_id == project_id)
            .collect())
    }

    async fn record_scope(&self, info: ScopeInfo) -> Result<()> {
        let key = format!("{}:{}", info.project_id, info.scope_name);
        let mut scopes = self.scopes.write().await;
        let data = scopes.entry(key).or_default();
        data.info = Some(info);
        Ok(())
    }

    async fn get_content_hashes(&self, scope: &Scope) -> Result<HashMap<String, String>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(&scope.scope_id())
            .map(|data| {
                data.records
                    .values()
                    .map(|r| (r.id.clone(), r.metadata.content_hash.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VectorMetadata;

    fn record(id: &str, path: &str, vector: Vec<f32>, tags: Vec<String>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector,
            metadata: VectorMetadata {
                project_id: "p".into(),
                scope_name: "main".into(),
                model_id: "m".into(),
                url: path.to_string(),
                path: path.to_string(),
                title: "t".into(),
                section_title: None,
                heading_path: vec![],
                chunk_text: "text".into(),
                snippet: "text".into(),
                ordinal: 0,
                depth: 1,
                incoming_links: 0,
                route_file: "+page.svelte".into(),
                tags,
                content_hash: format!("hash-{id}"),
                description: None,
                keywords: None,
            },
        }
    }

    #[tokio::test]
    async fn scope_isolation() {
        let store = InMemoryVectorStore::new();
        let s1 = Scope::new("p", "s1");
        let s2 = Scope::new("p", "s2");

        store
            .upsert(vec![record("a", "/docs", vec![1.0, 0.0], vec![])], &s1)
            .await
            .unwrap();
        store
            .upsert(vec![record("b", "/docs", vec![1.0, 0.0], vec![])], &s2)
            .await
            .unwrap();

        let hits = store
            .query(vec![1.0, 0.0], QueryOptions { top_k: 10, ..Default::default() }, &s1)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn path_prefix_and_tag_filters() {
        let store = InMemoryVectorStore::new();
        let scope = Scope::new("p", "main");
        store
            .upsert(
                vec![
                    record("a", "/docs/intro", vec![1.0, 0.0], vec!["guide".into()]),
                    record("b", "/blog/post", vec![1.0, 0.0], vec!["news".into()]),
                ],
                &scope,
            )
            .await
            .unwrap();

        let hits = store
            .query(
                vec![1.0, 0.0],
                QueryOptions {
                    top_k: 10,
                    path_prefix: Some("/docs".into()),
                    tags: None,
                },
                &scope,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let hits = store
            .query(
                vec![1.0, 0.0],
                QueryOptions {
                    top_k: 10,
                    path_prefix: None,
                    tags: Some(vec!["news".into()]),
                },
                &scope,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[tokio::test]
    async fn content_hashes_reflect_current_state() {
        let store = InMemoryVectorStore::new();
        let scope = Scope::new("p", "main");
        store
            .upsert(vec![record("a", "/docs", vec![1.0], vec![])], &scope)
            .await
            .unwrap();

        let hashes = store.get_content_hashes(&scope).await.unwrap();
        assert_eq!(hashes.get("a"), Some(&"hash-a".to_string()));

        store.delete_by_ids(&["a".to_string()], &scope).await.unwrap();
        let hashes = store.get_content_hashes(&scope).await.unwrap();
        assert!(hashes.is_empty());
    }
}
