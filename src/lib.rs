//! Corank - rank source files by graph centrality
//!
//! Builds one directed graph over a repository from three edge sources:
//! commit authorship (author -> file), co-change (files touched by the same
//! commit, symmetric), and import dependencies (importing file -> declaring
//! file). Katz centrality and PageRank over that graph rank every source
//! file by structural importance.
//!
//! Every stage checkpoints its state to disk and resumes from it, so long
//! runs against rate-limited remote history can be interrupted and relaunched.

pub mod centrality;
pub mod cli;
pub mod config;
pub mod git;
pub mod graph;
pub mod index;
pub mod parsers;
pub mod pipeline;
pub mod reporters;
