/// Lists (and, with `--apply`, deletes) scopes that haven't been indexed
/// recently (§6 `prune [--apply --scopes-file --older-than]`).
use crate::setup::{build_adapters, load_config, to_anyhow};
use anyhow::{bail, Result};
use beacon_config::ConfigResolver;
use beacon_core::Scope;
use chrono::{Duration, Utc};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct PruneCommand {
    /// Actually delete candidates instead of only listing them
    #[arg(long)]
    pub apply: bool,
    /// Restrict candidates to the scope names listed in this file (one per line)
    #[arg(long)]
    pub scopes_file: Option<PathBuf>,
    /// Only scopes last indexed more than this long ago are candidates, e.g. "30d", "12h"
    #[arg(long)]
    pub older_than: Option<String>,
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (number, unit) = raw.split_at(raw.len().saturating_sub(1));
    let amount: i64 = number.parse().map_err(|_| anyhow::anyhow!("invalid duration: {raw}"))?;
    match unit {
        "d" => Ok(Duration::days(amount)),
        "h" => Ok(Duration::hours(amount)),
        "m" => Ok(Duration::minutes(amount)),
        _ => bail!("unrecognized duration unit in {raw:?}, expected a trailing d/h/m"),
    }
}

pub async fn run(cmd: &PruneCommand, resolver: ConfigResolver) -> Result<i32> {
    let config = load_config(resolver)?;
    let (_, store) = build_adapters(&config)?;
    let scopes = store.list_scopes(&config.project.id).await.map_err(to_anyhow)?;

    let allowed_names: Option<Vec<String>> = match &cmd.scopes_file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Some(contents.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
        }
        None => None,
    };

    let cutoff = match &cmd.older_than {
        Some(raw) => Some(Utc::now() - parse_duration(raw)?),
        None => None,
    };

    let candidates: Vec<_> = scopes
        .into_iter()
        .filter(|s| allowed_names.as_ref().map(|names| names.contains(&s.scope_name)).unwrap_or(true))
        .filter(|s| cutoff.map(|cutoff| s.last_indexed_at < cutoff).unwrap_or(true))
        .collect();

    if candidates.is_empty() {
        println!("no scopes to prune");
        return Ok(0);
    }

    for scope in &candidates {
        println!("{} {} (last indexed {})", "-".dimmed(), scope.scope_name, scope.last_indexed_at.to_rfc3339());
    }

    if !cmd.apply {
        println!("{} candidates listed, re-run with --apply to delete", candidates.len());
        return Ok(0);
    }

    for scope in &candidates {
        let target = Scope::from_sanitized(config.project.id.clone(), scope.scope_name.clone());
        store.delete_scope(&target).await.map_err(to_anyhow)?;
    }
    println!("{} pruned {} scopes", "\u{2713}".green(), candidates.len());
    Ok(0)
}
