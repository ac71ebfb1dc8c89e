//! Local commit history using libgit2

use super::{CommitSource, RawCommit};
use crate::config::Config;
use anyhow::{Context, Result};
use git2::{Repository, Sort};
use std::path::Path;
use tracing::{debug, warn};

/// Commit source backed by a local clone.
pub struct LocalHistory {
    repo: Repository,
}

impl LocalHistory {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {:?}", path))?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    fn raw_commit(&self, commit: &git2::Commit) -> Result<RawCommit> {
        let author = {
            let sig = commit.author();
            sig.name()
                .filter(|n| !n.is_empty())
                .or_else(|| sig.email().filter(|e| !e.is_empty()))
                .map(str::to_string)
        };

        // Diff against the first parent; a root commit diffs against empty.
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                if let Some(path) = delta.new_file().path() {
                    if Config::is_source_file(path) {
                        files.push(path.to_string_lossy().to_string());
                    }
                }
                true
            },
            None,
            None,
            None,
        )?;

        Ok(RawCommit { author, files })
    }
}

impl CommitSource for LocalHistory {
    /// The most recent `max` commits from HEAD, oldest first.
    fn commits(&self, max: usize) -> Result<Vec<RawCommit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut oids = Vec::new();
        for oid_result in revwalk {
            if oids.len() >= max {
                break;
            }
            oids.push(oid_result?);
        }
        // Revwalk yields newest first; the builder wants chronological order.
        oids.reverse();

        let mut commits = Vec::with_capacity(oids.len());
        for oid in oids {
            let commit = self.repo.find_commit(oid)?;
            match self.raw_commit(&commit) {
                Ok(raw) => commits.push(raw),
                Err(e) => {
                    warn!("Skipping commit {}: {e:#}", oid);
                    commits.push(RawCommit {
                        author: None,
                        files: Vec::new(),
                    });
                }
            }
        }
        Ok(commits)
    }
}
