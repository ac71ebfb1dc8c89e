//! Durable graph snapshots
//!
//! Each pipeline stage persists its graph together with its progress marker in
//! a single JSON document, written via temp-file-and-rename so a crash can
//! never leave the graph and the marker out of step. A reloaded snapshot
//! restores nodes in their original insertion order, so resumed runs produce
//! output identical to uninterrupted ones.

use super::{CodeGraph, Node};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Nodes in insertion order; positions are the edge endpoints below.
    pub nodes: Vec<Node>,
    pub edges: Vec<(u32, u32)>,
    /// Commit stage: index of the last fully-processed commit.
    #[serde(default)]
    pub last_processed: Option<usize>,
    /// Dependency stage: file nodes whose imports are already in the graph.
    #[serde(default)]
    pub processed_files: Vec<String>,
}

impl Snapshot {
    /// Capture the graph structure; progress markers start empty.
    pub fn capture(graph: &CodeGraph) -> Self {
        let nodes = graph
            .node_indices()
            .map(|idx| graph.node(idx).clone())
            .collect();
        let edges = graph
            .edges()
            .map(|(a, b)| (a.index() as u32, b.index() as u32))
            .collect();
        Self {
            nodes,
            edges,
            last_processed: None,
            processed_files: Vec::new(),
        }
    }

    /// Rebuild the graph and hand back the progress markers.
    pub fn restore(self) -> (CodeGraph, Option<usize>, HashSet<String>) {
        let mut graph = CodeGraph::new();
        let indices: Vec<_> = self
            .nodes
            .into_iter()
            .map(|node| graph.intern(node))
            .collect();
        for (a, b) in self.edges {
            if let (Some(&from), Some(&to)) =
                (indices.get(a as usize), indices.get(b as usize))
            {
                let from = graph.node(from).clone();
                let to = graph.node(to).clone();
                graph.add_edge(from, to);
            }
        }
        (graph, self.last_processed, self.processed_files.into_iter().collect())
    }

    /// Write atomically: serialize to a sibling temp file, then rename over
    /// the destination.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec(self).context("Failed to serialize graph snapshot")?;
        fs::write(&tmp, data).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into place at {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_graph() -> CodeGraph {
        let mut g = CodeGraph::new();
        g.add_authored("alice", "A.java");
        g.add_cochange("A.java", "B.java");
        g.add_import("B.java", "C.java");
        g
    }

    #[test]
    fn test_round_trip_preserves_structure_and_order() {
        let graph = sample_graph();
        let mut snap = Snapshot::capture(&graph);
        snap.last_processed = Some(41);
        snap.processed_files = vec!["A.java".to_string()];

        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        snap.save(&path).unwrap();

        let (restored, last, processed) = Snapshot::load(&path).unwrap().restore();
        assert_eq!(restored.node_count(), graph.node_count());
        assert_eq!(restored.edge_count(), graph.edge_count());
        assert_eq!(last, Some(41));
        assert!(processed.contains("A.java"));

        let original: Vec<&str> = graph.file_nodes().map(|(_, n)| n).collect();
        let reloaded: Vec<&str> = restored.file_nodes().map(|(_, n)| n).collect();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        Snapshot::capture(&sample_graph()).save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Snapshot::load(&dir.path().join("absent.json")).is_err());
    }
}
