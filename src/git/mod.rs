//! Commit history sources
//!
//! The commit graph builder only needs two things from history: commits in
//! chronological order with author and changed source files, and (for remote
//! sources) the current API quota. [`CommitSource`] abstracts over reading a
//! local clone via libgit2 and reading the GitHub REST API.

mod github;
mod local;

pub use github::GitHubHistory;
pub use local::LocalHistory;

use anyhow::Result;

/// A commit as retrieved from a history source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// Author identity, `None` when it cannot be resolved.
    pub author: Option<String>,
    /// Repo-relative changed source files.
    pub files: Vec<String>,
}

/// Remaining API quota and its reset time (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    pub reset: i64,
}

impl RateLimit {
    /// Seconds to sleep until just past the reset time.
    pub fn seconds_until_reset(&self, now: i64) -> u64 {
        (self.reset - now + 1).max(0) as u64
    }
}

pub trait CommitSource {
    /// Up to `max` of the most recent commits, oldest first.
    fn commits(&self, max: usize) -> Result<Vec<RawCommit>>;

    /// Current quota; `None` for sources without one.
    fn rate_limit(&self) -> Result<Option<RateLimit>> {
        Ok(None)
    }
}
