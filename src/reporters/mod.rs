//! Ranked output table

use crate::centrality::CentralityScore;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// How many of the leading rows to echo into the log.
const TOP_ROWS: usize = 5;

/// Write the ranked table as CSV. Rows arrive already sorted by Katz
/// centrality descending.
pub fn write_csv(path: &Path, rows: &[CentralityScore]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut out = String::from("file,katz_centrality,pagerank\n");
    for row in rows {
        // Paths come from the graph as repo-relative slash paths; no quoting
        // needed for the characters they can contain.
        let _ = writeln!(out, "{},{},{}", row.path, row.katz, row.pagerank);
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Log the highest-ranked rows.
pub fn log_top(rows: &[CentralityScore]) {
    info!("Top {} high-centrality files:", TOP_ROWS.min(rows.len()));
    for row in rows.iter().take(TOP_ROWS) {
        info!(
            "  {}  katz={:.6}  pagerank={:.6}",
            row.path, row.katz, row.pagerank
        );
    }
}
