/// Ad-hoc single query against the search engine (§6 `search --q [...]`).
use crate::setup::{build_adapters, build_engine, load_config, to_anyhow};
use anyhow::Result;
use beacon_config::ConfigResolver;
use beacon_search::{GroupBy, SearchRequest};
use clap::Args;
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

#[derive(Args)]
pub struct SearchCommand {
    /// Query text
    #[arg(long)]
    pub q: String,
    /// Scope override
    #[arg(long)]
    pub scope: Option<String>,
    /// Maximum number of results
    #[arg(long)]
    pub top_k: Option<usize>,
    /// Restrict results to this path prefix
    #[arg(long)]
    pub path_prefix: Option<String>,
    /// Rerank the initial recall set
    #[arg(long)]
    pub rerank: bool,
    /// Print the raw response as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cmd: &SearchCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (embeddings, store) = build_adapters(&config)?;
    let engine = build_engine(&config, embeddings, store)?;

    let scope = match &cmd.scope {
        Some(name) => beacon_core::Scope::new(&config.project.id, name),
        None => beacon_pipeline::resolve_scope(&config.project.id, &config.scope).map_err(to_anyhow)?,
    };

    let request = SearchRequest {
        q: cmd.q.clone(),
        top_k: cmd.top_k,
        scope,
        path_prefix: cmd.path_prefix.clone(),
        tags: None,
        rerank: cmd.rerank,
        group_by: GroupBy::Chunk,
    };

    let response = engine.search(request).await.map_err(to_anyhow)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(0);
    }

    if response.results.is_empty() {
        println!("no results for {:?}", response.q);
        return Ok(0);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic).set_header(vec![
        Cell::new("score"),
        Cell::new("title"),
        Cell::new("path"),
        Cell::new("snippet"),
    ]);
    for result in &response.results {
        let color = if result.score > 0.8 { Color::Green } else if result.score > 0.5 { Color::Yellow } else { Color::Red };
        table.add_row(vec![
            Cell::new(format!("{:.3}", result.score)).fg(color),
            Cell::new(&result.title),
            Cell::new(&result.path),
            Cell::new(&result.snippet),
        ]);
    }
    println!("{table}");
    println!(
        "{} {} results in {}ms (rerank: {})",
        "\u{2713}".green(),
        response.results.len(),
        response.meta.timings_ms.total,
        response.meta.used_rerank
    );
    Ok(0)
}
