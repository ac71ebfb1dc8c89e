//! Centrality measures over the combined graph
//!
//! Two independent measures, both plain power iteration over the frozen
//! graph. Neither is allowed to abort the run: a measure that fails to
//! converge degrades to all-zero scores with an error log.

use crate::config::{
    KATZ_BETA, KATZ_MAX_ITER, KATZ_TOL, PAGERANK_DAMPING, PAGERANK_MAX_ITER, PAGERANK_TOL,
};
use crate::graph::CodeGraph;
use std::cmp::Ordering;
use tracing::{error, info};

/// Per-file scores, one row of the ranked output table.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityScore {
    pub path: String,
    pub katz: f64,
    pub pagerank: f64,
}

/// Score every file node and return rows sorted descending by Katz
/// centrality. The sort is stable, so ties keep graph insertion order.
pub fn rank_files(graph: &CodeGraph) -> Vec<CentralityScore> {
    let katz = match katz_centrality(graph) {
        Some(scores) => {
            info!("Computed Katz centrality");
            scores
        }
        None => {
            error!("Katz centrality failed to converge. Using zero centrality.");
            vec![0.0; graph.node_count()]
        }
    };

    let pagerank = match pagerank(graph) {
        Some(scores) => {
            info!("Computed PageRank");
            scores
        }
        None => {
            error!("PageRank failed to converge. Using zero centrality.");
            vec![0.0; graph.node_count()]
        }
    };

    let mut rows: Vec<CentralityScore> = graph
        .file_nodes()
        .map(|(idx, name)| CentralityScore {
            path: name.to_string(),
            katz: katz[idx.index()],
            pagerank: pagerank[idx.index()],
        })
        .collect();
    rows.sort_by(|a, b| b.katz.partial_cmp(&a.katz).unwrap_or(Ordering::Equal));
    rows
}

/// Katz centrality by power iteration: `x' = alpha * A^T x + beta`.
///
/// The attenuation factor is derived from the maximum out-degree
/// (`0.9 / max_out_degree`) so the series is guaranteed to converge; a graph
/// with no edges gets 1.0, where the choice is irrelevant. Scores are indexed
/// by node index. `None` on non-convergence.
pub fn katz_centrality(graph: &CodeGraph) -> Option<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Some(Vec::new());
    }

    let max_out = graph.max_out_degree();
    let alpha = if max_out == 0 {
        1.0
    } else {
        0.9 / max_out as f64
    };

    let mut x = vec![0.0; n];
    for _ in 0..KATZ_MAX_ITER {
        let mut next = vec![0.0; n];
        for (src, dst) in graph.edges() {
            next[dst.index()] += x[src.index()];
        }
        for v in next.iter_mut() {
            *v = alpha * *v + KATZ_BETA;
        }

        let err: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if err < n as f64 * KATZ_TOL {
            let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for v in x.iter_mut() {
                    *v /= norm;
                }
            }
            return Some(x);
        }
    }
    None
}

/// PageRank by power iteration with damping 0.85, uniform teleport, and
/// dangling-node mass spread uniformly. Scores are indexed by node index and
/// sum to 1. `None` on non-convergence.
pub fn pagerank(graph: &CodeGraph) -> Option<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Some(Vec::new());
    }

    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.out_degree(idx))
        .collect();

    let uniform = 1.0 / n as f64;
    let mut x = vec![uniform; n];
    for _ in 0..PAGERANK_MAX_ITER {
        let mut next = vec![0.0; n];
        for (src, dst) in graph.edges() {
            next[dst.index()] += PAGERANK_DAMPING * x[src.index()] / out_degree[src.index()] as f64;
        }

        let dangling: f64 = x
            .iter()
            .zip(&out_degree)
            .filter(|(_, &d)| d == 0)
            .map(|(v, _)| v)
            .sum();
        let base = (1.0 - PAGERANK_DAMPING) * uniform + PAGERANK_DAMPING * dangling * uniform;
        for v in next.iter_mut() {
            *v += base;
        }

        let err: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if err < n as f64 * PAGERANK_TOL {
            return Some(x);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph_scores_nothing() {
        let graph = CodeGraph::new();
        assert_eq!(katz_centrality(&graph), Some(Vec::new()));
        assert_eq!(pagerank(&graph), Some(Vec::new()));
        assert!(rank_files(&graph).is_empty());
    }

    #[test]
    fn test_hub_file_ranks_highest() {
        // B and C both import A; A should lead on both measures.
        let mut graph = CodeGraph::new();
        graph.add_import("B.java", "A.java");
        graph.add_import("C.java", "A.java");

        let rows = rank_files(&graph);
        assert_eq!(rows[0].path, "A.java");
        assert!(rows[0].katz > rows[1].katz);
        assert!(rows[0].pagerank > rows[1].pagerank);
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let mut graph = CodeGraph::new();
        graph.add_import("A.java", "B.java");
        graph.add_import("B.java", "C.java");
        graph.add_cochange("A.java", "C.java");

        let scores = pagerank(&graph).unwrap();
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "total was {}", total);
    }

    #[test]
    fn test_edgeless_graph_does_not_panic() {
        let mut graph = CodeGraph::new();
        graph.intern(crate::graph::Node::file("A.java"));
        graph.intern(crate::graph::Node::file("B.java"));

        let rows = rank_files(&graph);
        assert_eq!(rows.len(), 2);
        assert!((rows[0].katz - rows[1].katz).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        // Two isolated files score identically; the earlier node stays first.
        let mut graph = CodeGraph::new();
        graph.intern(crate::graph::Node::file("Z.java"));
        graph.intern(crate::graph::Node::file("A.java"));

        let rows = rank_files(&graph);
        assert_eq!(rows[0].path, "Z.java");
        assert_eq!(rows[1].path, "A.java");
    }

    #[test]
    fn test_authors_contribute_but_are_not_reported() {
        let mut graph = CodeGraph::new();
        graph.add_authored("alice", "A.java");
        graph.add_authored("bob", "A.java");

        let rows = rank_files(&graph);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "A.java");
    }
}
