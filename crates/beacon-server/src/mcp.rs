/// MCP tool surface (C14, §6 `mcp.*`): `tools/list` and `tools/call`,
/// wrapping the search engine and index pipeline as named tools.
use crate::jsonrpc::{JsonRpcError, JsonRpcResponse};
use crate::state::AppState;
use beacon_pipeline::RunOptions;
use beacon_search::{GroupBy, SearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

#[derive(Serialize)]
struct ListToolsResult {
    tools: Vec<Tool>,
}

#[derive(Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn available_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "search_docs".to_string(),
            description: "Semantic search over indexed documentation".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "q": { "type": "string", "description": "Search query" },
                    "topK": { "type": "integer", "description": "Maximum results", "default": 10 },
                    "scope": { "type": "string", "description": "Scope override" },
                    "pathPrefix": { "type": "string", "description": "Restrict to a path prefix" },
                    "rerank": { "type": "boolean", "default": false },
                },
                "required": ["q"],
            }),
        },
        Tool {
            name: "index_docs".to_string(),
            description: "Run the index pipeline for the configured project".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "scope": { "type": "string" },
                    "changedOnly": { "type": "boolean", "default": false },
                    "force": { "type": "boolean", "default": false },
                    "dryRun": { "type": "boolean", "default": false },
                },
            }),
        },
        Tool {
            name: "get_status".to_string(),
            description: "List indexed scopes and their last run statistics".to_string(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        },
    ]
}

pub async fn route_method(method: &str, params: Option<Value>, id: Option<Value>, state: &AppState) -> JsonRpcResponse {
    match method {
        "tools/list" => {
            let result = ListToolsResult { tools: available_tools() };
            JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
        }
        "tools/call" => handle_tools_call(params, id, state).await,
        other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
    }
}

async fn handle_tools_call(params: Option<Value>, id: Option<Value>, state: &AppState) -> JsonRpcResponse {
    let params_value = match params {
        Some(v) => v,
        None => return JsonRpcResponse::error(id, JsonRpcError::invalid_params("tools/call requires params")),
    };

    let call_params: CallToolParams = match serde_json::from_value(params_value) {
        Ok(p) => p,
        Err(e) => return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string())),
    };

    match call_params.name.as_str() {
        "search_docs" => call_search_docs(call_params.arguments, id, state).await,
        "index_docs" => call_index_docs(call_params.arguments, id, state).await,
        "get_status" => call_get_status(id, state).await,
        other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    q: String,
    top_k: Option<usize>,
    scope: Option<String>,
    path_prefix: Option<String>,
    #[serde(default)]
    rerank: bool,
}

async fn call_search_docs(arguments: Value, id: Option<Value>, state: &AppState) -> JsonRpcResponse {
    let args: SearchArgs = match serde_json::from_value(arguments) {
        Ok(a) => a,
        Err(e) => return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string())),
    };

    let scope = match state.resolve_scope(args.scope.as_deref()) {
        Ok(s) => s,
        Err(e) => return JsonRpcResponse::error(id, JsonRpcError::from_beacon_error(&e)),
    };

    let request = SearchRequest {
        q: args.q,
        top_k: args.top_k,
        scope,
        path_prefix: args.path_prefix,
        tags: None,
        rerank: args.rerank,
        group_by: GroupBy::Chunk,
    };

    match state.engine.search(request).await {
        Ok(response) => JsonRpcResponse::success(id, serde_json::to_value(response).unwrap_or(Value::Null)),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::from_beacon_error(&e)),
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct IndexArgs {
    scope: Option<String>,
    #[serde(default)]
    changed_only: bool,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    dry_run: bool,
}

async fn call_index_docs(arguments: Value, id: Option<Value>, state: &AppState) -> JsonRpcResponse {
    let args: IndexArgs = if arguments.is_null() { IndexArgs::default() } else {
        match serde_json::from_value(arguments) {
            Ok(a) => a,
            Err(e) => return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string())),
        }
    };

    let options = RunOptions {
        scope_override: args.scope,
        changed_only: args.changed_only,
        force: args.force,
        dry_run: args.dry_run,
        source_override: None,
        max_pages: None,
        max_chunks: None,
    };

    let cancel = tokio_util::sync::CancellationToken::new();
    match state.pipeline.run(options, cancel).await {
        Ok(stats) => JsonRpcResponse::success(id, serde_json::to_value(stats).unwrap_or(Value::Null)),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::from_beacon_error(&e)),
    }
}

async fn call_get_status(id: Option<Value>, state: &AppState) -> JsonRpcResponse {
    match state.store.list_scopes(&state.config.project.id).await {
        Ok(scopes) => JsonRpcResponse::success(id, serde_json::json!({ "scopes": scopes })),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::from_beacon_error(&e)),
    }
}
