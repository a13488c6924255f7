/// Removes a scope's local page mirror and, with `--remote`, its vector
/// store records too (§6 `clean [--remote]`).
use crate::setup::{build_adapters, load_config, to_anyhow};
use anyhow::Result;
use beacon_config::ConfigResolver;
use beacon_core::Scope;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct CleanCommand {
    /// Scope to clean (defaults to the resolved scope for this run)
    #[arg(long)]
    pub scope: Option<String>,
    /// Also delete the scope's records from the vector store
    #[arg(long)]
    pub remote: bool,
}

pub async fn run(cmd: &CleanCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let scope = match &cmd.scope {
        Some(name) => Scope::new(&config.project.id, name),
        None => beacon_pipeline::resolve_scope(&config.project.id, &config.scope).map_err(to_anyhow)?,
    };

    let mirror_dir = Path::new(&config.state.dir).join("pages").join(&scope.scope_name);
    if mirror_dir.exists() {
        std::fs::remove_dir_all(&mirror_dir)?;
        println!("{} removed local page mirror at {}", "\u{2713}".green(), mirror_dir.display());
    } else {
        println!("no local page mirror for scope {}", scope.scope_name);
    }

    if cmd.remote {
        let (_, store) = build_adapters(&config)?;
        store.delete_scope(&scope).await.map_err(to_anyhow)?;
        println!("{} removed remote records for scope {}", "\u{2713}".green(), scope.scope_name);
    }

    Ok(0)
}
