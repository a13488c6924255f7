use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;
mod setup;

use commands::{clean, dev, doctor, index, init, mcp, prune, search, status};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Semantic documentation indexing and search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run as if invoked from this directory
    #[arg(short = 'C', long, global = true)]
    cwd: Option<PathBuf>,

    /// Path to an explicit configuration file (default: search for beacon.toml/.beacon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a default beacon.toml in the current directory
    Init(init::InitCommand),
    /// Run the index pipeline
    Index(index::IndexCommand),
    /// List indexed scopes and their last run statistics
    Status(status::StatusCommand),
    /// Run the HTTP search/index server in the foreground
    Dev(dev::DevCommand),
    /// Remove local and/or remote state for a scope
    Clean(clean::CleanCommand),
    /// Remove scopes that haven't been indexed recently
    Prune(prune::PruneCommand),
    /// Validate configuration and adapter connectivity
    Doctor(doctor::DoctorCommand),
    /// Serve the MCP tool surface (stdio or HTTP)
    Mcp(mcp::McpCommand),
    /// Run a single ad-hoc search
    Search(search::SearchCommand),
}

impl Commands {
    /// `(verbose, json_logs)`; only `index` exposes these on the wire per
    /// the stable CLI surface, everything else logs at the default level.
    fn logging_flags(&self) -> (bool, bool) {
        match self {
            Commands::Index(cmd) => (cmd.verbose, cmd.json),
            _ => (false, false),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Some(dir) = &cli.cwd {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("ERROR: failed to change directory to {}: {e}", dir.display());
            std::process::exit(1);
        }
    }

    let (verbose, json_logs) = cli.command.logging_flags();
    logging::init(verbose, json_logs);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("ERROR: failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let resolver = match &cli.config {
        Some(path) => beacon_config::ConfigResolver::with_file(path.clone()),
        None => beacon_config::ConfigResolver::new(),
    };

    match cli.command {
        Commands::Init(cmd) => init::run(&cmd),
        Commands::Index(cmd) => index::run(&cmd, resolver).await,
        Commands::Status(cmd) => status::run(&cmd, resolver).await,
        Commands::Dev(cmd) => dev::run(&cmd, resolver).await,
        Commands::Clean(cmd) => clean::run(&cmd, resolver).await,
        Commands::Prune(cmd) => prune::run(&cmd, resolver).await,
        Commands::Doctor(cmd) => doctor::run(&cmd, resolver).await,
        Commands::Mcp(cmd) => mcp::run(&cmd, resolver).await,
        Commands::Search(cmd) => search::run(&cmd, resolver).await,
    }
}
