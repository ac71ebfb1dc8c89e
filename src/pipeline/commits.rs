//! Commit graph construction with checkpointed, resumable processing
//!
//! Walks a bounded window of commits and records, per commit, one authorship
//! edge per changed source file plus a symmetric co-change pair for every two
//! files touched together. Progress is checkpointed every
//! `checkpoint_interval` commits; a crash rolls back to the last checkpoint
//! and a restart resumes strictly after it, so no commit is applied twice.

use crate::config::Config;
use crate::git::{CommitSource, RawCommit};
use crate::graph::{CodeGraph, Snapshot};
use anyhow::Result;
use chrono::Utc;
use indicatif::ProgressBar;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct CommitGraphBuilder<'a> {
    config: &'a Config,
}

impl<'a> CommitGraphBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build (or resume building) the commit graph from `source`.
    ///
    /// A failure to fetch the commit list is logged and yields the graph as
    /// loaded; per-commit problems never abort the walk.
    pub fn run(&self, source: &dyn CommitSource) -> Result<CodeGraph> {
        let snapshot_path = self.config.commit_graph_path();
        let (mut graph, mut last_done) = if snapshot_path.exists() {
            match Snapshot::load(&snapshot_path) {
                Ok(snap) => {
                    let (graph, last, _) = snap.restore();
                    info!(
                        "Loaded commit graph ({} nodes), resuming after index {:?}",
                        graph.node_count(),
                        last
                    );
                    (graph, last)
                }
                Err(e) => {
                    warn!("Could not load commit graph snapshot: {e:#}. Starting from scratch.");
                    (CodeGraph::new(), None)
                }
            }
        } else {
            (CodeGraph::new(), None)
        };
        let start = last_done.map_or(0, |i| i + 1);

        let commits = match source.commits(self.config.max_commits) {
            Ok(commits) => commits,
            Err(e) => {
                error!("Error fetching commits: {e:#}");
                return Ok(graph);
            }
        };
        let total = commits.len();
        info!("Processing up to {} commits (starting at {})", total, start);

        let bar = ProgressBar::new(total as u64);
        bar.set_position(start.min(total) as u64);

        for (i, commit) in commits.iter().enumerate().skip(start) {
            if i % self.config.checkpoint_interval == 0 {
                self.wait_for_quota(source);
            }

            self.apply_commit(&mut graph, commit, i);
            last_done = Some(i);
            bar.inc(1);

            if (i + 1) % self.config.checkpoint_interval == 0 {
                self.checkpoint(&graph, last_done);
                info!("Processed {} commits, saved checkpoint", i + 1);
            }
        }
        bar.finish_and_clear();

        self.checkpoint(&graph, last_done);
        info!("Completed commit processing and saved final graph");
        Ok(graph)
    }

    fn apply_commit(&self, graph: &mut CodeGraph, commit: &RawCommit, index: usize) {
        let Some(author) = commit.author.as_deref() else {
            warn!("Commit {} has no resolvable author. Skipping.", index);
            return;
        };

        // Restrict to files still present in the working tree; files deleted
        // later in history carry no signal for the current codebase.
        let files: Vec<&str> = commit
            .files
            .iter()
            .map(String::as_str)
            .filter(|f| self.config.root.join(f).exists())
            .collect();

        for file in &files {
            graph.add_authored(author, file);
        }
        for (j, f1) in files.iter().enumerate() {
            for f2 in &files[j + 1..] {
                graph.add_cochange(f1, f2);
            }
        }
    }

    fn checkpoint(&self, graph: &CodeGraph, last_done: Option<usize>) {
        let mut snap = Snapshot::capture(graph);
        snap.last_processed = last_done;
        if let Err(e) = snap.save(&self.config.commit_graph_path()) {
            error!("Error saving commit checkpoint: {e:#}");
        } else {
            debug!("Saved commit checkpoint at index {:?}", last_done);
        }
    }

    /// Blocking wait until the quota window resets when it is nearly
    /// exhausted. Local sources report no quota and never wait.
    fn wait_for_quota(&self, source: &dyn CommitSource) {
        match source.rate_limit() {
            Ok(Some(limit)) if limit.remaining < self.config.rate_limit_floor => {
                let secs = limit.seconds_until_reset(Utc::now().timestamp());
                info!(
                    "Rate limit low ({} remaining). Sleeping for {} seconds.",
                    limit.remaining, secs
                );
                thread::sleep(Duration::from_secs(secs));
            }
            Ok(_) => {}
            Err(e) => error!("Error checking rate limit: {e:#}"),
        }
    }
}
