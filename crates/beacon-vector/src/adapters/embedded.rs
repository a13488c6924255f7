/// Embedded local vector store backed by SQLite (§4.5 "embedded" backend).
///
/// No external service required: vectors are stored as `bincode`-encoded
/// BLOBs in a single `vectors` table keyed by `(scope_id, id)`, and
/// similarity is computed client-side at query time with
/// [`crate::util::cosine_similarity`]. `dir0..dirN` columns hold
/// [`crate::util::dir_buckets`] so a path-prefix query can use an indexed
/// equality predicate on the first segment before falling back to the exact
/// `matches_prefix` check, instead of a full scan plus a `LIKE`.
use crate::model::{HealthStatus, QueryOptions, ScopeInfo, VectorHit, VectorMetadata, VectorRecord};
use crate::traits::VectorStore;
use crate::util::{cosine_similarity, dir_buckets};
use async_trait::async_trait;
use beacon_core::{BeaconError, Result, Scope};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

const DIR_BUCKET_DEPTH: usize = 4;

pub struct EmbeddedVectorStore {
    conn: Mutex<Connection>,
}

impl EmbeddedVectorStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| BeaconError::vector_backend_unavailable(format!("failed to open database: {e}")))?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init(conn: &Connection) -> Result<()> {
        let dir_columns: String = (0..DIR_BUCKET_DEPTH)
            .map(|i| format!("dir{i} TEXT"))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS vectors (
                scope_id TEXT NOT NULL,
                id TEXT NOT NULL,
                vector BLOB NOT NULL,
                metadata TEXT NOT NULL,
                tags TEXT NOT NULL,
                path TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                {dir_columns},
                PRIMARY KEY (scope_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_vectors_scope_dir0 ON vectors(scope_id, dir0);
            CREATE TABLE IF NOT EXISTS scopes (
                project_id TEXT NOT NULL,
                scope_name TEXT NOT NULL,
                model_id TEXT NOT NULL,
                last_indexed_at TEXT NOT NULL,
                vector_count INTEGER,
                last_estimate_tokens INTEGER,
                last_estimate_cost_usd REAL,
                last_estimate_changed_chunks INTEGER,
                PRIMARY KEY (project_id, scope_name)
            );"
        ))
        .map_err(|e| BeaconError::vector_backend_unavailable(format!("failed to initialize schema: {e}")))?;
        Ok(())
    }
}

fn encode_vector(vector: &[f32]) -> Result<Vec<u8>> {
    bincode::serialize(vector).map_err(|e| BeaconError::internal(format!("failed to encode vector: {e}")))
}

fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>> {
    bincode::deserialize(bytes).map_err(|e| BeaconError::internal(format!("failed to decode vector: {e}")))
}

#[async_trait]
impl VectorStore for EmbeddedVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>, scope: &Scope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let scope_id = scope.scope_id();
        for record in records {
            let buckets = dir_buckets(&record.metadata.path, DIR_BUCKET_DEPTH);
            let vector_bytes = encode_vector(&record.vector)?;
            let metadata_json = serde_json::to_string(&record.metadata)?;
            let tags_json = serde_json::to_string(&record.metadata.tags)?;
            conn.execute(
                "INSERT INTO vectors (scope_id, id, vector, metadata, tags, path, content_hash, dir0, dir1, dir2, dir3)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(scope_id, id) DO UPDATE SET
                    vector = excluded.vector,
                    metadata = excluded.metadata,
                    tags = excluded.tags,
                    path = excluded.path,
                    content_hash = excluded.content_hash,
                    dir0 = excluded.dir0, dir1 = excluded.dir1, dir2 = excluded.dir2, dir3 = excluded.dir3",
                params![
                    scope_id,
                    record.id,
                    vector_bytes,
                    metadata_json,
                    tags_json,
                    record.metadata.path,
                    record.metadata.content_hash,
                    buckets[0],
                    buckets[1],
                    buckets[2],
                    buckets[3],
                ],
            )
            .map_err(|e| BeaconError::vector_backend_unavailable(format!("upsert failed: {e}")))?;
        }
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, opts: QueryOptions, scope: &Scope) -> Result<Vec<VectorHit>> {
        let conn = self.conn.lock().unwrap();
        let scope_id = scope.scope_id();

        let first_bucket = opts
            .path_prefix
            .as_deref()
            .and_then(|p| p.trim_start_matches('/').split('/').find(|s| !s.is_empty()));

        let mut stmt = conn
            .prepare(
                "SELECT id, vector, metadata, tags, path FROM vectors
                 WHERE scope_id = ?1 AND (?2 IS NULL OR dir0 = ?2)",
            )
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;

        let rows = stmt
            .query_map(params![scope_id, first_bucket], |row| {
                let id: String = row.get(0)?;
                let vector_bytes: Vec<u8> = row.get(1)?;
                let metadata_json: String = row.get(2)?;
                let tags_json: String = row.get(3)?;
                let path: String = row.get(4)?;
                Ok((id, vector_bytes, metadata_json, tags_json, path))
            })
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;

        let mut hits = Vec::new();
        for row in rows {
            let (id, vector_bytes, metadata_json, tags_json, path) =
                row.map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;

            if let Some(prefix) = &opts.path_prefix {
                if !beacon_core::url::matches_prefix(&path, prefix) {
                    continue;
                }
            }
            if let Some(tags) = &opts.tags {
                let row_tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
                if !tags.iter().all(|t| row_tags.contains(t)) {
                    continue;
                }
            }

            let stored_vector = decode_vector(&vector_bytes)?;
            let metadata: VectorMetadata = serde_json::from_str(&metadata_json)?;
            hits.push(VectorHit {
                id,
                score: cosine_similarity(&vector, &stored_vector),
                metadata,
            });
        }

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.top_k);
        Ok(hits)
    }

    async fn delete_by_ids(&self, ids: &[String], scope: &Scope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let scope_id = scope.scope_id();
        for id in ids {
            conn.execute(
                "DELETE FROM vectors WHERE scope_id = ?1 AND id = ?2",
                params![scope_id, id],
            )
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete_scope(&self, scope: &Scope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let scope_id = scope.scope_id();
        conn.execute("DELETE FROM vectors WHERE scope_id = ?1", params![scope_id])
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        conn.execute(
            "DELETE FROM scopes WHERE project_id = ?1 AND scope_name = ?2",
            params![scope.project_id, scope.scope_name],
        )
        .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn list_scopes(&self, project_id: &str) -> Result<Vec<ScopeInfo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT project_id, scope_name, model_id, last_indexed_at, vector_count,
                        last_estimate_tokens, last_estimate_cost_usd, last_estimate_changed_chunks
                 FROM scopes WHERE project_id = ?1",
            )
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                let last_indexed_at: String = row.get(3)?;
                Ok(ScopeInfo {
                    project_id: row.get(0)?,
                    scope_name: row.get(1)?,
                    model_id: row.get(2)?,
                    last_indexed_at: last_indexed_at
                        .parse::<DateTime<Utc>>()
                        .unwrap_or_else(|_| Utc::now()),
                    vector_count: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
                    last_estimate_tokens: row.get::<_, Option<i64>>(5)?.map(|v| v as u64),
                    last_estimate_cost_usd: row.get(6)?,
                    last_estimate_changed_chunks: row.get::<_, Option<i64>>(7)?.map(|v| v as u64),
                })
            })
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?);
        }
        Ok(out)
    }

    async fn record_scope(&self, info: ScopeInfo) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scopes (project_id, scope_name, model_id, last_indexed_at, vector_count,
                                  last_estimate_tokens, last_estimate_cost_usd, last_estimate_changed_chunks)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(project_id, scope_name) DO UPDATE SET
                model_id = excluded.model_id,
                last_indexed_at = excluded.last_indexed_at,
                vector_count = excluded.vector_count,
                last_estimate_tokens = excluded.last_estimate_tokens,
                last_estimate_cost_usd = excluded.last_estimate_cost_usd,
                last_estimate_changed_chunks = excluded.last_estimate_changed_chunks",
            params![
                info.project_id,
                info.scope_name,
                info.model_id,
                info.last_indexed_at.to_rfc3339(),
                info.vector_count.map(|v| v as i64),
                info.last_estimate_tokens.map(|v| v as i64),
                info.last_estimate_cost_usd,
                info.last_estimate_changed_chunks.map(|v| v as i64),
            ],
        )
        .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn get_content_hashes(&self, scope: &Scope) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock().unwrap();
        let scope_id = scope.scope_id();
        let mut stmt = conn
            .prepare("SELECT id, content_hash FROM vectors WHERE scope_id = ?1")
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        let rows = stmt
            .query_map(params![scope_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
        let mut out = HashMap::new();
        for row in rows {
            let (id, hash) = row.map_err(|e| BeaconError::vector_backend_unavailable(e.to_string()))?;
            out.insert(id, hash);
        }
        Ok(out)
    }

    async fn health(&self) -> Result<HealthStatus> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).optional() {
            Ok(Some(_)) => Ok(HealthStatus::healthy()),
            Ok(None) => Ok(HealthStatus::healthy()),
            Err(e) => Ok(HealthStatus::unhealthy(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::Scope;

    fn record(id: &str, path: &str, vector: Vec<f32>) -> VectorRecord {
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
                tags: vec![],
                content_hash: format!("hash-{id}"),
                description: None,
                keywords: None,
            },
        }
    }

    #[tokio::test]
    async fn roundtrips_vectors_and_hashes() {
        let store = EmbeddedVectorStore::open_in_memory().unwrap();
        let scope = Scope::new("p", "main");
        store
            .upsert(vec![record("a", "/docs/intro", vec![1.0, 0.0])], &scope)
            .await
            .unwrap();

        let hits = store
            .query(vec![1.0, 0.0], QueryOptions { top_k: 10, ..Default::default() }, &scope)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert!((hits[0].score - 1.0).abs() < 1e-6);

        let hashes = store.get_content_hashes(&scope).await.unwrap();
        assert_eq!(hashes.get("a"), Some(&"hash-a".to_string()));

        store.delete_by_ids(&["a".to_string()], &scope).await.unwrap();
        assert!(store.get_content_hashes(&scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn path_prefix_uses_dir_bucket_prefilter() {
        let store = EmbeddedVectorStore::open_in_memory().unwrap();
        let scope = Scope::new("p", "main");
        store
            .upsert(
                vec![
                    record("a", "/docs/intro", vec![1.0, 0.0]),
                    record("b", "/blog/post", vec![1.0, 0.0]),
                ],
                &scope,
            )
            .await
            .unwrap();

        let hits = store
            .query(
                vec![1.0, 0.0],
                QueryOptions { top_k: 10, path_prefix: Some("/docs".into()), tags: None },
                &scope,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn scope_registry_roundtrip() {
        let store = EmbeddedVectorStore::open_in_memory().unwrap();
        let scope = Scope::new("p", "main");
        store.record_scope(ScopeInfo::new(&scope, "model-a")).await.unwrap();
        let scopes = store.list_scopes("p").await.unwrap();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].model_id, "model-a");
    }
}
