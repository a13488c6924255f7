use crate::setup::{build_adapters, load_config, to_anyhow};
use anyhow::Result;
use beacon_config::ConfigResolver;
use clap::Args;
use comfy_table::{Cell, ContentArrangement, Table};

#[derive(Args)]
pub struct StatusCommand {
    /// Print the raw scope records as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cmd: &StatusCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (_, store) = build_adapters(&config)?;
    let scopes = store.list_scopes(&config.project.id).await.map_err(to_anyhow)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&scopes)?);
        return Ok(0);
    }

    if scopes.is_empty() {
        println!("no scopes indexed yet for project {}", config.project.id);
        return Ok(0);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic).set_header(vec![
        Cell::new("scope"),
        Cell::new("model"),
        Cell::new("vectors"),
        Cell::new("last indexed"),
    ]);
    for scope in &scopes {
        table.add_row(vec![
            Cell::new(&scope.scope_name),
            Cell::new(&scope.model_id),
            Cell::new(scope.vector_count.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(scope.last_indexed_at.to_rfc3339()),
        ]);
    }
    println!("{table}");
    Ok(0)
}
