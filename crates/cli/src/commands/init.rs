use anyhow::{Context, Result};
use beacon_config::BeaconConfig;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitCommand {
    /// Project id to scaffold (defaults to the current directory name)
    #[arg(long)]
    pub project_id: Option<String>,
}

pub fn run(cmd: &InitCommand) -> Result<i32> {
    let path = PathBuf::from("beacon.toml");
    if path.exists() {
        eprintln!("ERROR: {} already exists", path.display());
        return Ok(1);
    }

    let project_id = cmd.project_id.clone().unwrap_or_else(default_project_id);

    let mut config = BeaconConfig::default();
    config.project.id = project_id;
    config.source.static_output_dir = Some("build".to_string());

    let rendered = toml::to_string_pretty(&config).context("failed to serialize default configuration")?;
    std::fs::write(&path, rendered).with_context(|| format!("failed to write {}", path.display()))?;

    println!("{} wrote {}", "\u{2713}".green(), path.display());
    println!("Edit {} to set source.mode and its mode-specific fields, then run `beacon index`.", path.display());
    Ok(0)
}

fn default_project_id() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "my-project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_overwrite_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        std::fs::write("beacon.toml", "project.id = \"x\"").unwrap();

        let code = run(&InitCommand { project_id: None }).unwrap();
        assert_eq!(code, 1);

        std::env::set_current_dir(prev).unwrap();
    }
}
