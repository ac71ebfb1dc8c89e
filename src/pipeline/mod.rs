//! Pipeline orchestration
//!
//! Runs the stages in order: class index, commit graph, dependency edges,
//! centrality, ranked output. Every stage persists its artifact under the
//! state directory and resumes from it on restart, so an interrupted run can
//! simply be launched again.

mod commits;
mod deps;

pub use commits::CommitGraphBuilder;
pub use deps::DependencyExtender;

use crate::centrality;
use crate::config::Config;
use crate::git::{CommitSource, GitHubHistory, LocalHistory};
use crate::graph::CodeGraph;
use crate::index::ClassIndex;
use crate::reporters;
use anyhow::{Context, Result};
use std::fs;
use tracing::{error, info};

/// Run the full analysis for `config`.
pub fn run(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("Failed to create {}", config.state_dir.display()))?;

    let index = ClassIndex::load_or_build(config)?;

    let graph = if let Some(slug) = &config.remote {
        info!("Reading commit history for {} via the GitHub API", slug);
        let source = GitHubHistory::new(slug.clone());
        build_commit_graph(config, &source)?
    } else {
        let source = LocalHistory::open(&config.root)?;
        build_commit_graph(config, &source)?
    };

    let graph = DependencyExtender::new(config, &index).run(graph)?;

    score_and_report(config, &graph);
    info!("Analysis completed successfully");
    Ok(())
}

fn build_commit_graph(config: &Config, source: &dyn CommitSource) -> Result<CodeGraph> {
    CommitGraphBuilder::new(config).run(source)
}

/// Compute centrality and write the ranked table. A failed write loses the
/// output file but not the run; the top rows still go to the log.
fn score_and_report(config: &Config, graph: &CodeGraph) {
    let rows = centrality::rank_files(graph);
    let csv_path = config.output_csv_path();
    match reporters::write_csv(&csv_path, &rows) {
        Ok(()) => info!("Saved centrality results to {}", csv_path.display()),
        Err(e) => error!("Error saving {}: {e:#}", csv_path.display()),
    }
    reporters::log_top(&rows);
}
