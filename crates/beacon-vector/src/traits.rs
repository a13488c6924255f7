use crate::model::{HealthStatus, QueryOptions, ScopeInfo, VectorHit, VectorRecord};
use async_trait::async_trait;
use beacon_core::{Result, Scope};
use std::collections::HashMap;

/// Vector storage operations, all scoped by `(projectId, scopeName)` (C9).
///
/// Adapters must preserve scope isolation: `query` under one scope must
/// never surface records upserted under a different scope.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// At-least-once, idempotent on `id`.
    async fn upsert(&self, records: Vec<VectorRecord>, scope: &Scope) -> Result<()>;

    /// ANN recall sorted by descending score, truncated to `opts.top_k`.
    async fn query(&self, vector: Vec<f32>, opts: QueryOptions, scope: &Scope) -> Result<Vec<VectorHit>>;

    /// Idempotent.
    async fn delete_by_ids(&self, ids: &[String], scope: &Scope) -> Result<()>;

    /// Removes all records and the registry entry for the scope.
    async fn delete_scope(&self, scope: &Scope) -> Result<()>;

    async fn list_scopes(&self, project_id: &str) -> Result<Vec<ScopeInfo>>;

    /// Upsert by `(projectId, scopeName)`.
    async fn record_scope(&self, info: ScopeInfo) -> Result<()>;

    /// The sole source of truth for diffing (§4.2 phase 7).
    async fn get_content_hashes(&self, scope: &Scope) -> Result<HashMap<String, String>>;

    async fn health(&self) -> Result<HealthStatus>;
}
