//! CLI definition and entry point

use crate::config::Config;
use crate::pipeline;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Corank - rank source files by graph centrality
///
/// Mines a repository's commit history and import structure into one directed
/// graph (authorship, co-change, and dependency edges) and ranks every source
/// file by Katz centrality and PageRank.
#[derive(Parser, Debug)]
#[command(name = "corank")]
#[command(
    version,
    about = "Rank source files by graph centrality over commit history and import dependencies",
    after_help = "\
Examples:
  corank .                             Analyze the clone in the current directory
  corank /path/to/repo                 Analyze a specific clone
  corank . --remote octo/app           Read history via the GitHub API (GITHUB_TOKEN)
  corank . --log-level debug           Verbose progress logging

Interrupted runs resume from the checkpoints under the state directory;
delete that directory for a clean rebuild."
)]
pub struct Cli {
    /// Path to the repository to analyze (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Read commit history from the GitHub REST API for this owner/repo slug
    /// instead of the local clone
    #[arg(long)]
    pub remote: Option<String>,

    /// Directory for persisted artifacts and the output table
    /// (default: <path>/.corank)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

/// Build the run configuration from parsed arguments.
pub fn config_from(cli: &Cli) -> Config {
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(|| cli.path.join(".corank"));
    let mut config = Config::new(&cli.path, state_dir);
    if let Some(slug) = &cli.remote {
        config = config.with_remote(slug.clone());
    }
    config
}

pub fn run(cli: Cli) -> Result<()> {
    let config = config_from(&cli);
    pipeline::run(&config)
}
