/// The HTTP surface (§6 "Search request"): `POST /api/search`,
/// `POST /api/index`, `GET /api/status`, `GET /api/health`.
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use beacon_core::BeaconError;
use beacon_pipeline::RunOptions;
use beacon_search::{GroupBy, SearchRequest, SearchResponse};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Unmounted REST routes, state applied by the caller — lets `lib.rs` graft
/// the MCP endpoint onto the same router before `with_state`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/index", post(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/health", get(health_handler))
        .route("/", get(root_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn router(state: AppState) -> Router {
    routes().with_state(state)
}

pub struct ApiError(BeaconError);

impl From<BeaconError> for ApiError {
    fn from(e: BeaconError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": { "code": self.0.kind_code, "message": self.0.message }
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequestBody {
    q: String,
    top_k: Option<usize>,
    scope: Option<String>,
    path_prefix: Option<String>,
    tags: Option<Vec<String>>,
    #[serde(default)]
    rerank: bool,
    group_by: Option<String>,
}

async fn search_handler(
    State(state): State<AppState>,
    Json(body): Json<SearchRequestBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let scope = state.resolve_scope(body.scope.as_deref())?;
    let group_by = match body.group_by.as_deref() {
        Some("page") => GroupBy::Page,
        _ => GroupBy::Chunk,
    };

    let request = SearchRequest {
        q: body.q,
        top_k: body.top_k,
        scope,
        path_prefix: body.path_prefix,
        tags: body.tags,
        rerank: body.rerank,
        group_by,
    };

    info!(q = %request.q, "search request");
    let response = state.engine.search(request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct IndexRequestBody {
    scope: Option<String>,
    #[serde(default)]
    changed_only: bool,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    dry_run: bool,
    source: Option<String>,
    max_pages: Option<i64>,
    max_chunks: Option<i64>,
}

#[derive(Debug, Serialize)]
struct IndexResponseBody {
    stats: beacon_pipeline::IndexStats,
}

async fn index_handler(
    State(state): State<AppState>,
    Json(body): Json<IndexRequestBody>,
) -> Result<Json<IndexResponseBody>, ApiError> {
    let options = RunOptions {
        scope_override: body.scope,
        changed_only: body.changed_only,
        force: body.force,
        dry_run: body.dry_run,
        source_override: body.source,
        max_pages: body.max_pages,
        max_chunks: body.max_chunks,
    };

    let cancel = tokio_util::sync::CancellationToken::new();
    let stats = state.pipeline.run(options, cancel).await.map_err(|e| {
        error!(error = %e, "index run failed");
        e
    })?;
    Ok(Json(IndexResponseBody { stats }))
}

#[derive(Debug, Serialize)]
struct StatusResponseBody {
    project_id: String,
    scopes: Vec<beacon_vector::ScopeInfo>,
}

async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponseBody>, ApiError> {
    let scopes = state.store.list_scopes(&state.config.project.id).await?;
    Ok(Json(StatusResponseBody { project_id: state.config.project.id.clone(), scopes }))
}

async fn health_handler(State(state): State<AppState>) -> Result<Json<beacon_vector::HealthStatus>, ApiError> {
    let health = state.store.health().await?;
    Ok(Json(health))
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "beacon",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/api/search", "/api/index", "/api/status", "/api/health"],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use beacon_config::BeaconConfig;
    use beacon_embeddings::LocalEmbeddingsProvider;
    use beacon_search::{SearchEngine, SearchEngineConfig};
    use beacon_vector::adapters::memory::InMemoryVectorStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut config = BeaconConfig::default();
        config.project.id = "test-project".to_string();

        let embeddings = Arc::new(LocalEmbeddingsProvider::new(8).unwrap());
        let store: Arc<dyn beacon_vector::VectorStore> = Arc::new(InMemoryVectorStore::new());
        let engine = SearchEngine::new(embeddings.clone(), store.clone(), None, SearchEngineConfig::default());
        AppState::new(config, embeddings, store, engine)
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_rejects_blank_query() {
        let app = router(test_state());
        let body = serde_json::json!({ "q": "   " }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/search")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
