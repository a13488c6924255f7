/// Serves the MCP tool surface (§6 `mcp [--transport --port --path]`).
use crate::setup::{build_adapters, build_engine, load_config};
use anyhow::{Context, Result};
use beacon_config::ConfigResolver;
use beacon_server::{stdio::StdioServer, AppState};
use clap::Args;

#[derive(Args)]
pub struct McpCommand {
    /// Transport to serve on
    #[arg(long, value_parser = ["stdio", "http"])]
    pub transport: Option<String>,
    /// Port for the http transport
    #[arg(long)]
    pub port: Option<u16>,
    /// URL path for the http transport
    #[arg(long)]
    pub path: Option<String>,
}

pub async fn run(cmd: &McpCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (embeddings, store) = build_adapters(&config)?;
    let engine = build_engine(&config, embeddings.clone(), store.clone())?;
    let state = AppState::new(config.clone(), embeddings, store, engine);

    let transport = cmd.transport.clone().unwrap_or_else(|| match config.mcp.transport {
        beacon_config::McpTransport::Stdio => "stdio".to_string(),
        beacon_config::McpTransport::Http => "http".to_string(),
    });

    match transport.as_str() {
        "stdio" => {
            StdioServer::new(state).run().await.context("stdio MCP transport failed")?;
            Ok(0)
        }
        "http" => {
            let port = cmd.port.unwrap_or(config.mcp.http.port);
            let path = cmd.path.clone().unwrap_or_else(|| config.mcp.http.path.clone());
            let router = beacon_server::router_with_mcp(state, &path);

            let addr = format!("127.0.0.1:{port}");
            tracing::info!(addr = %addr, path = %path, "starting MCP http transport");
            println!("MCP listening on http://{addr}{path}");

            let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
            axum::serve(listener, router).await.context("HTTP server error")?;
            Ok(0)
        }
        other => {
            eprintln!("ERROR: unrecognized transport {other:?}, expected stdio or http");
            Ok(1)
        }
    }
}
