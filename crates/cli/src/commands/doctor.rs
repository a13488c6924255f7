/// Validates configuration and adapter connectivity (§6 `doctor`). Exits 1
/// if any check fails.
use crate::setup::{build_adapters, load_config};
use anyhow::Result;
use beacon_config::ConfigResolver;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct DoctorCommand {}

struct CheckResult {
    name: &'static str,
    ok: bool,
    detail: String,
}

pub async fn run(_cmd: &DoctorCommand, resolver: ConfigResolver) -> Result<i32> {
    let mut checks = Vec::new();

    let config = match load_config(resolver) {
        Ok(config) => {
            checks.push(CheckResult { name: "configuration", ok: true, detail: format!("project.id = {}", config.project.id) });
            Some(config)
        }
        Err(e) => {
            checks.push(CheckResult { name: "configuration", ok: false, detail: e.to_string() });
            None
        }
    };

    if let Some(config) = &config {
        match build_adapters(config) {
            Ok((_, store)) => match store.health().await {
                Ok(health) if health.ok => {
                    checks.push(CheckResult { name: "vector store", ok: true, detail: "reachable".to_string() })
                }
                Ok(health) => checks.push(CheckResult {
                    name: "vector store",
                    ok: false,
                    detail: health.details.map(|d| format!("{d:?}")).unwrap_or_else(|| "unhealthy".to_string()),
                }),
                Err(e) => checks.push(CheckResult { name: "vector store", ok: false, detail: e.to_string() }),
            },
            Err(e) => checks.push(CheckResult { name: "vector store", ok: false, detail: e.to_string() }),
        }
    }

    let mut all_ok = true;
    for check in &checks {
        all_ok &= check.ok;
        let mark = if check.ok { "\u{2713}".green() } else { "\u{2717}".red() };
        println!("{mark} {}: {}", check.name, check.detail);
    }

    Ok(if all_ok { 0 } else { 1 })
}
