//! The combined authorship / co-change / dependency graph
//!
//! One directed graph over two node populations: author identities and source
//! file paths. Edge provenance (authored, co-changed, imports) is not stored;
//! the centrality stage only cares about structure. The graph only ever grows:
//! stages add edges, nothing removes them.

mod snapshot;

pub use snapshot::Snapshot;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Discriminates the two node populations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Author,
    File,
}

/// A graph node: an author identity or a repo-relative file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
}

impl Node {
    pub fn author(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Author,
            name: name.into(),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::File,
            name: name.into(),
        }
    }
}

/// Directed graph with idempotent edge insertion.
#[derive(Debug, Default, Clone)]
pub struct CodeGraph {
    graph: DiGraph<Node, ()>,
    lookup: HashMap<Node, NodeIndex>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the index for a node.
    pub fn intern(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.lookup.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.lookup.insert(node, idx);
        idx
    }

    /// Add a directed edge, creating nodes as needed. Duplicate insertions
    /// are no-ops, which keeps repeated runs from inflating edge counts.
    pub fn add_edge(&mut self, from: Node, to: Node) {
        let a = self.intern(from);
        let b = self.intern(to);
        self.graph.update_edge(a, b, ());
    }

    /// author -> file authorship edge.
    pub fn add_authored(&mut self, author: &str, file: &str) {
        self.add_edge(Node::author(author), Node::file(file));
    }

    /// Symmetric co-change pair between two files.
    pub fn add_cochange(&mut self, f1: &str, f2: &str) {
        self.add_edge(Node::file(f1), Node::file(f2));
        self.add_edge(Node::file(f2), Node::file(f1));
    }

    /// importing file -> imported file dependency edge.
    pub fn add_import(&mut self, from: &str, to: &str) {
        self.add_edge(Node::file(from), Node::file(to));
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_edge(&self, from: &Node, to: &Node) -> bool {
        match (self.lookup.get(from), self.lookup.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// File nodes in insertion order. Insertion order is what makes the
    /// ranked output's tie-break stable across runs.
    pub fn file_nodes(&self) -> impl Iterator<Item = (NodeIndex, &str)> + '_ {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].kind == NodeKind::File)
            .map(|idx| (idx, self.graph[idx].name.as_str()))
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    pub fn max_out_degree(&self) -> usize {
        self.graph
            .node_indices()
            .map(|idx| self.out_degree(idx))
            .max()
            .unwrap_or(0)
    }

    /// Add every node and edge of `other` into this graph. Existing nodes
    /// and edges are untouched, so merging is idempotent.
    pub fn merge_from(&mut self, other: &CodeGraph) {
        for idx in other.node_indices() {
            self.intern(other.node(idx).clone());
        }
        for (a, b) in other.edges() {
            self.add_edge(other.node(a).clone(), other.node(b).clone());
        }
    }

    /// All edges as (source, target) index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }
}
