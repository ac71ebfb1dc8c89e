//! Java source scanning using line-anchored patterns
//!
//! Extracts the package declaration, top-level type declarations, and import
//! statements. Deliberately not a parser: declarations inside comments or
//! string literals can slip through, which is acceptable for graph building.

use crate::config::IMPORT_SKIP_PREFIXES;
use regex::Regex;
use std::sync::OnceLock;

static PACKAGE_RE: OnceLock<Regex> = OnceLock::new();
static TYPE_RE: OnceLock<Regex> = OnceLock::new();
static IMPORT_RE: OnceLock<Regex> = OnceLock::new();

fn package_re() -> &'static Regex {
    PACKAGE_RE.get_or_init(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").expect("valid regex"))
}

fn type_re() -> &'static Regex {
    TYPE_RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:public|private|protected)?\s*(?:class|interface|enum|@interface)\s+(\w+)")
            .expect("valid regex")
    })
}

fn import_re() -> &'static Regex {
    IMPORT_RE.get_or_init(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)\s*;").expect("valid regex"))
}

/// The declared package, if any.
pub fn package(source: &str) -> Option<String> {
    package_re()
        .captures(source)
        .map(|c| c[1].to_string())
}

/// Fully-qualified names of the types declared in `source`.
///
/// Types are qualified with the file's package declaration; files without a
/// package yield bare names.
pub fn qualified_types(source: &str) -> Vec<String> {
    let pkg = package(source);
    type_re()
        .captures_iter(source)
        .map(|c| match &pkg {
            Some(p) => format!("{}.{}", p, &c[1]),
            None => c[1].to_string(),
        })
        .collect()
}

/// Imported qualified names, with standard-library and test-framework
/// prefixes filtered out.
pub fn imports(source: &str) -> Vec<String> {
    import_re()
        .captures_iter(source)
        .map(|c| c[1].to_string())
        .filter(|imp| !IMPORT_SKIP_PREFIXES.iter().any(|p| imp.starts_with(p)))
        .collect()
}
