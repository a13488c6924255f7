use crate::setup::{build_adapters, load_config, to_anyhow};
use anyhow::Result;
use beacon_config::ConfigResolver;
use beacon_pipeline::{IndexPipeline, RunOptions};
use clap::Args;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct IndexCommand {
    /// Override the resolved scope name for this run
    #[arg(long)]
    pub scope: Option<String>,
    /// Only upsert chunks whose content hash changed
    #[arg(long)]
    pub changed_only: bool,
    /// Re-upsert every chunk regardless of content hash
    #[arg(long)]
    pub force: bool,
    /// Report what would change without writing to the vector store
    #[arg(long)]
    pub dry_run: bool,
    /// Override source.mode for this run
    #[arg(long)]
    pub source: Option<String>,
    /// Cap the number of pages loaded from the source
    #[arg(long)]
    pub max_pages: Option<i64>,
    /// Cap the number of chunks produced
    #[arg(long)]
    pub max_chunks: Option<i64>,
    /// Emit debug-level logs
    #[arg(short, long)]
    pub verbose: bool,
    /// Emit stats as a single JSON object and logs as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cmd: &IndexCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (embeddings, store) = build_adapters(&config)?;
    let pipeline = IndexPipeline::new(config, embeddings, store);

    let options = RunOptions {
        scope_override: cmd.scope.clone(),
        changed_only: cmd.changed_only,
        force: cmd.force,
        dry_run: cmd.dry_run,
        source_override: cmd.source.clone(),
        max_pages: cmd.max_pages,
        max_chunks: cmd.max_chunks,
    };

    let stats = pipeline.run(options, CancellationToken::new()).await.map_err(to_anyhow)?;

    if cmd.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        print_summary(&stats);
    }

    for warning in &stats.warnings {
        eprintln!("WARN: {warning}");
    }

    Ok(0)
}

fn print_summary(stats: &beacon_pipeline::IndexStats) {
    let heading = if stats.dry_run { "index (dry run)".yellow() } else { "index".green() };
    println!("{} scope={}", heading, stats.scope_name);
    println!("  pages loaded:     {}", stats.pages_loaded);
    println!("  pages extracted:  {}", stats.pages_extracted);
    println!("  chunks total:     {}", stats.chunks_total);
    println!("  chunks changed:   {}", stats.chunks_changed);
    println!("  deletes:          {}", stats.deletes);
    println!("  estimated tokens: {}", stats.estimated_tokens);
    println!("  estimated cost:   ${:.4}", stats.estimated_cost_usd);
}
