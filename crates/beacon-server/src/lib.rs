pub mod http;
pub mod jsonrpc;
pub mod mcp;
pub mod state;
pub mod stdio;

pub use state::AppState;

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;

/// Mounts the MCP JSON-RPC endpoint (`mcp.http.path`, default `/mcp`)
/// alongside the plain REST surface for `mcp.transport = http`.
pub fn router_with_mcp(state: AppState, mcp_path: &str) -> Router {
    http::routes().route(mcp_path, post(mcp_handler)).with_state(state)
}

async fn mcp_handler(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<JsonRpcResponse> {
    let request = match serde_json::from_value::<JsonRpcRequest>(payload) {
        Ok(r) => r,
        Err(_) => return Json(JsonRpcResponse::error(None, JsonRpcError::parse_error())),
    };

    let response = mcp::route_method(&request.method, request.params, request.id, &state).await;
    Json(response)
}
