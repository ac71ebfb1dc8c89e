//! Source file scanners
//!
//! Lightweight, pattern-based extraction. The point of these scanners is to
//! pull out the handful of declarations the graph stages need (packages, type
//! names, imports) without the cost or fragility of a full parser.

pub mod java;
