//! Run configuration
//!
//! All algorithm tunables are fixed constants, collected here so every stage
//! receives them through an explicit [`Config`] rather than ambient globals.

use std::path::{Path, PathBuf};

/// Maximum number of commits walked by the commit graph builder.
pub const MAX_COMMITS: usize = 1000;

/// Commits (or files, in the dependency stage) processed between checkpoints.
pub const CHECKPOINT_INTERVAL: usize = 100;

/// Worker pool size for the parallel class index scan.
pub const INDEX_WORKERS: usize = 4;

/// Remaining-quota threshold below which the builder sleeps until reset.
pub const RATE_LIMIT_FLOOR: u64 = 10;

/// Katz centrality: iteration cap, convergence tolerance, base attraction.
pub const KATZ_MAX_ITER: usize = 1000;
pub const KATZ_TOL: f64 = 1e-6;
pub const KATZ_BETA: f64 = 1.0;

/// PageRank: damping factor, iteration cap, convergence tolerance.
pub const PAGERANK_DAMPING: f64 = 0.85;
pub const PAGERANK_MAX_ITER: usize = 100;
pub const PAGERANK_TOL: f64 = 1e-6;

/// Persisted artifact names, all placed under the state directory.
pub const CLASS_INDEX_FILE: &str = "class_index.json";
pub const COMMIT_GRAPH_FILE: &str = "commit_graph.json";
pub const FULL_GRAPH_FILE: &str = "full_graph.json";
pub const OUTPUT_CSV_FILE: &str = "centrality.csv";

/// Extension identifying source files in the analyzed tree.
pub const SOURCE_EXT: &str = "java";

/// Import prefixes treated as standard library / test scaffolding and never
/// resolved against the class index.
pub const IMPORT_SKIP_PREFIXES: &[&str] = &["java.", "javax.", "org.junit", "org.mockito"];

/// Configuration handed to each pipeline stage at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the analyzed source tree (also the git working directory).
    pub root: PathBuf,
    /// Directory holding all persisted artifacts and the output table.
    pub state_dir: PathBuf,
    /// Optional `owner/repo` slug; when set, history is read from the GitHub
    /// REST API instead of the local repository.
    pub remote: Option<String>,
    pub max_commits: usize,
    pub checkpoint_interval: usize,
    pub index_workers: usize,
    pub rate_limit_floor: u64,
}

impl Config {
    /// Build a config for the given source root and state directory.
    pub fn new(root: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state_dir: state_dir.into(),
            remote: None,
            max_commits: MAX_COMMITS,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            index_workers: INDEX_WORKERS,
            rate_limit_floor: RATE_LIMIT_FLOOR,
        }
    }

    /// Read commit history from the GitHub REST API for `owner/repo`.
    pub fn with_remote(mut self, slug: impl Into<String>) -> Self {
        self.remote = Some(slug.into());
        self
    }

    pub fn class_index_path(&self) -> PathBuf {
        self.state_dir.join(CLASS_INDEX_FILE)
    }

    pub fn commit_graph_path(&self) -> PathBuf {
        self.state_dir.join(COMMIT_GRAPH_FILE)
    }

    pub fn full_graph_path(&self) -> PathBuf {
        self.state_dir.join(FULL_GRAPH_FILE)
    }

    pub fn output_csv_path(&self) -> PathBuf {
        self.state_dir.join(OUTPUT_CSV_FILE)
    }

    /// Whether a repo-relative path counts as a source file.
    pub fn is_source_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT)
    }
}
