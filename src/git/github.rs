//! GitHub REST commit source
//!
//! Sync HTTP via ureq, no async runtime. Credentials come from `GITHUB_TOKEN`;
//! unauthenticated use works but with a much smaller quota, which is why the
//! builder polls [`rate_limit`](super::CommitSource::rate_limit) between
//! batches.

use super::{CommitSource, RawCommit, RateLimit};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

/// Commit source backed by the GitHub REST API for one `owner/repo`.
pub struct GitHubHistory {
    slug: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl GitHubHistory {
    /// Create a source for `owner/repo`, reading `GITHUB_TOKEN` if set.
    pub fn new(slug: impl Into<String>) -> Self {
        Self::with_token(slug, env::var("GITHUB_TOKEN").ok())
    }

    pub fn with_token(slug: impl Into<String>, token: Option<String>) -> Self {
        Self {
            slug: slug.into(),
            token,
            agent: make_agent(),
        }
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let mut req = self
            .agent
            .get(url)
            .header("User-Agent", "corank")
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let response = req.call().with_context(|| format!("GET {} failed", url))?;
        let status = response.status().as_u16();
        if status >= 400 {
            bail!("GET {} returned HTTP {}", url, status);
        }
        response
            .into_body()
            .read_json()
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

impl CommitSource for GitHubHistory {
    /// The most recent `max` commits on the default branch, oldest first.
    ///
    /// The listing endpoint does not include changed files, so each commit
    /// needs a second request. A failed detail fetch degrades that commit to
    /// an author-less placeholder so positions stay stable across runs.
    fn commits(&self, max: usize) -> Result<Vec<RawCommit>> {
        let mut heads: Vec<(String, Option<String>)> = Vec::new();
        let mut page = 1;
        while heads.len() < max {
            let url = format!(
                "{}/repos/{}/commits?per_page={}&page={}",
                API_ROOT, self.slug, PER_PAGE, page
            );
            let batch = self.get_json(&url)?;
            let Some(items) = batch.as_array() else {
                bail!("Unexpected commit list payload from {}", self.slug);
            };
            if items.is_empty() {
                break;
            }
            for item in items {
                if heads.len() >= max {
                    break;
                }
                let Some(sha) = item["sha"].as_str() else {
                    continue;
                };
                heads.push((sha.to_string(), author_login(item)));
            }
            page += 1;
        }
        // The API lists newest first; the builder wants chronological order.
        heads.reverse();
        debug!("Fetched {} commit heads from {}", heads.len(), self.slug);

        let mut commits = Vec::with_capacity(heads.len());
        for (sha, author) in heads {
            let url = format!("{}/repos/{}/commits/{}", API_ROOT, self.slug, sha);
            match self.get_json(&url) {
                Ok(detail) => commits.push(RawCommit {
                    author,
                    files: changed_source_files(&detail),
                }),
                Err(e) => {
                    warn!("Skipping commit {}: {e:#}", sha);
                    commits.push(RawCommit {
                        author: None,
                        files: Vec::new(),
                    });
                }
            }
        }
        Ok(commits)
    }

    fn rate_limit(&self) -> Result<Option<RateLimit>> {
        let payload = self.get_json(&format!("{}/rate_limit", API_ROOT))?;
        let core = &payload["resources"]["core"];
        match (core["remaining"].as_u64(), core["reset"].as_i64()) {
            (Some(remaining), Some(reset)) => Ok(Some(RateLimit { remaining, reset })),
            _ => bail!("Unexpected rate limit payload"),
        }
    }
}

/// GitHub login of the commit's author, when the commit maps to a user.
fn author_login(item: &Value) -> Option<String> {
    item["author"]["login"].as_str().map(str::to_string)
}

/// Changed source files from a commit detail payload.
fn changed_source_files(detail: &Value) -> Vec<String> {
    detail["files"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|f| f["filename"].as_str())
        .filter(|name| Config::is_source_file(Path::new(name)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_author_login() {
        let item = json!({"sha": "abc", "author": {"login": "alice"}});
        assert_eq!(author_login(&item), Some("alice".to_string()));

        // Commits not linked to a GitHub account have a null author.
        let orphan = json!({"sha": "abc", "author": null});
        assert_eq!(author_login(&orphan), None);
    }

    #[test]
    fn test_changed_source_files() {
        let detail = json!({
            "files": [
                {"filename": "src/A.java"},
                {"filename": "README.md"},
                {"filename": "src/B.java"},
            ]
        });
        assert_eq!(changed_source_files(&detail), vec!["src/A.java", "src/B.java"]);
    }

    #[test]
    fn test_changed_source_files_missing_field() {
        assert!(changed_source_files(&json!({"sha": "abc"})).is_empty());
    }
}
