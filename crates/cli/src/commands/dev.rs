use crate::setup::{build_adapters, build_engine, load_config};
use anyhow::{Context, Result};
use beacon_config::ConfigResolver;
use beacon_server::AppState;
use clap::Args;

#[derive(Args)]
pub struct DevCommand {
    /// Port to bind the HTTP server to
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

pub async fn run(cmd: &DevCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (embeddings, store) = build_adapters(&config)?;
    let engine = build_engine(&config, embeddings.clone(), store.clone())?;
    let state = AppState::new(config.clone(), embeddings, store, engine);

    let router = if config.mcp.enable {
        beacon_server::router_with_mcp(state, &config.mcp.http.path)
    } else {
        beacon_server::http::router(state)
    };

    let addr = format!("127.0.0.1:{}", cmd.port);
    tracing::info!(addr = %addr, "starting dev server");
    println!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await.context("HTTP server error")?;
    Ok(0)
}
