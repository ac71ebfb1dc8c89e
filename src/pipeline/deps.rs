//! Dependency edges from import statements
//!
//! Extends the commit graph with one directed edge per resolved import,
//! from the importing file to the file declaring the imported type. Imports
//! that do not resolve through the class index are external libraries and
//! are dropped. The processed-file set persisted with the graph makes the
//! stage resumable: repeated runs skip completed files.

use crate::config::Config;
use crate::graph::{CodeGraph, Snapshot};
use crate::index::ClassIndex;
use crate::parsers::java;
use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use tracing::{debug, error, info, warn};

pub struct DependencyExtender<'a> {
    config: &'a Config,
    index: &'a ClassIndex,
}

impl<'a> DependencyExtender<'a> {
    pub fn new(config: &'a Config, index: &'a ClassIndex) -> Self {
        Self { config, index }
    }

    /// Add import edges for every file node not yet marked processed.
    ///
    /// When a snapshot from an earlier run exists it supersedes `graph`:
    /// it already contains everything `graph` does plus the dependency edges
    /// added before the interruption.
    pub fn run(&self, graph: CodeGraph) -> Result<CodeGraph> {
        let snapshot_path = self.config.full_graph_path();
        let (mut graph, mut processed) = if snapshot_path.exists() {
            match Snapshot::load(&snapshot_path) {
                Ok(snap) => {
                    let (mut resumed, _, processed) = snap.restore();
                    // Keep anything the commit stage added since the snapshot.
                    resumed.merge_from(&graph);
                    info!(
                        "Resuming dependency stage, {} files already processed",
                        processed.len()
                    );
                    (resumed, processed)
                }
                Err(e) => {
                    warn!("Could not load full graph snapshot: {e:#}. Starting from scratch.");
                    (graph, HashSet::new())
                }
            }
        } else {
            (graph, HashSet::new())
        };

        let files: Vec<String> = graph.file_nodes().map(|(_, n)| n.to_string()).collect();
        info!("Processing dependencies for {} files", files.len());

        let mut added = 0usize;
        for name in &files {
            if processed.contains(name) {
                continue;
            }

            match fs::read_to_string(self.config.root.join(name)) {
                Ok(source) => {
                    for import in java::imports(&source) {
                        let Some(dep) = self.index.resolve(&import) else {
                            continue;
                        };
                        let dep = dep.to_string_lossy();
                        if self.config.root.join(dep.as_ref()).exists() {
                            graph.add_import(name, &dep);
                        }
                    }
                }
                Err(e) => warn!("Skipping unreadable file {}: {e}", name),
            }

            processed.insert(name.clone());
            added += 1;
            if added % self.config.checkpoint_interval == 0 {
                self.checkpoint(&graph, &processed);
                info!("Processed {} files for dependencies, saved checkpoint", added);
            }
        }

        self.checkpoint(&graph, &processed);
        info!("Completed dependency processing and saved final graph");
        Ok(graph)
    }

    fn checkpoint(&self, graph: &CodeGraph, processed: &HashSet<String>) {
        let mut snap = Snapshot::capture(graph);
        let mut files: Vec<String> = processed.iter().cloned().collect();
        files.sort();
        snap.processed_files = files;
        if let Err(e) = snap.save(&self.config.full_graph_path()) {
            error!("Error saving dependency checkpoint: {e:#}");
        } else {
            debug!("Saved dependency checkpoint, {} files processed", processed.len());
        }
    }
}
