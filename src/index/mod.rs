//! Class index: fully-qualified type name -> declaring file
//!
//! Built once by scanning the source tree, persisted as JSON, and reused
//! read-only by the dependency stage. A persisted index is trusted over a
//! rescan; delete the artifact to force a rebuild.

use crate::config::Config;
use crate::parsers::java;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ClassIndex {
    map: HashMap<String, PathBuf>,
}

impl ClassIndex {
    /// Look up the repo-relative file declaring a qualified type name.
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.map.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Load the persisted index if one exists and parses; otherwise scan the
    /// tree, persist the result, and return it. A persistence failure is
    /// logged but does not fail the run.
    pub fn load_or_build(config: &Config) -> Result<Self> {
        let path = config.class_index_path();
        if path.exists() {
            match Self::load(&path) {
                Ok(index) => {
                    info!(
                        "Loaded class index with {} entries from {}",
                        index.len(),
                        path.display()
                    );
                    return Ok(index);
                }
                Err(e) => warn!("Could not load {}: {e:#}. Rebuilding index.", path.display()),
            }
        }

        let index = Self::build(config)?;
        if let Err(e) = index.save(&path) {
            error!("Failed to persist class index: {e:#}");
        } else {
            info!("Saved class index to {}", path.display());
        }
        Ok(index)
    }

    /// Scan the source tree on a fixed-size worker pool.
    ///
    /// Extraction runs per file with no shared state; the merge into the map
    /// happens on this thread, in walk order. On duplicate declarations the
    /// later file wins, with a warning naming both.
    pub fn build(config: &Config) -> Result<Self> {
        let files = source_files(&config.root);
        info!("Found {} source files to index", files.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.index_workers)
            .build()
            .context("Failed to build index worker pool")?;

        let root = config.root.clone();
        let extracted: Vec<(PathBuf, Vec<String>)> = pool.install(|| {
            files
                .par_iter()
                .map(|rel| {
                    let names = match fs::read_to_string(root.join(rel)) {
                        Ok(source) => java::qualified_types(&source),
                        Err(e) => {
                            warn!("Skipping unreadable file {}: {e}", rel.display());
                            Vec::new()
                        }
                    };
                    (rel.clone(), names)
                })
                .collect()
        });

        let mut map = HashMap::new();
        for (path, names) in extracted {
            for name in names {
                if let Some(prev) = map.insert(name.clone(), path.clone()) {
                    if prev != path {
                        warn!(
                            "Type {} declared in both {} and {}; keeping {}",
                            name,
                            prev.display(),
                            path.display(),
                            path.display()
                        );
                    }
                }
            }
        }

        Ok(Self { map })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read class index {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse class index {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_vec(self).context("Failed to serialize class index")?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write class index {}", path.display()))?;
        Ok(())
    }
}

/// Repo-relative source files under `root`, gitignore-aware, in sorted order
/// so the duplicate-declaration policy is deterministic.
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    let walker = ignore::WalkBuilder::new(root).git_ignore(true).build();
    let mut files: Vec<PathBuf> = walker
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| Config::is_source_file(e.path()))
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_config(root: &Path) -> Config {
        Config::new(root, root.join(".corank"))
    }

    #[test]
    fn test_build_maps_qualified_names_to_files() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "src/com/example/Foo.java",
            "package com.example;\npublic class Foo {}\n",
        );
        write_file(
            dir.path(),
            "src/com/example/Bar.java",
            "package com.example;\ninterface Bar {}\n",
        );
        write_file(dir.path(), "notes/readme.txt", "not java");

        let index = ClassIndex::build(&test_config(dir.path())).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.resolve("com.example.Foo"),
            Some(Path::new("src/com/example/Foo.java"))
        );
        assert_eq!(
            index.resolve("com.example.Bar"),
            Some(Path::new("src/com/example/Bar.java"))
        );
        assert_eq!(index.resolve("com.example.Missing"), None);
    }

    #[test]
    fn test_duplicate_declaration_last_write_wins() {
        let dir = tempdir().unwrap();
        // Walk order is sorted, so b/Dup.java is merged after a/Dup.java.
        write_file(
            dir.path(),
            "a/Dup.java",
            "package com.example;\nclass Dup {}\n",
        );
        write_file(
            dir.path(),
            "b/Dup.java",
            "package com.example;\nclass Dup {}\n",
        );

        let index = ClassIndex::build(&test_config(dir.path())).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.resolve("com.example.Dup"),
            Some(Path::new("b/Dup.java"))
        );
    }

    #[test]
    fn test_load_or_build_prefers_persisted_index() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "Foo.java",
            "package com.example;\nclass Foo {}\n",
        );

        let config = test_config(dir.path());
        let built = ClassIndex::load_or_build(&config).unwrap();
        assert_eq!(built.len(), 1);

        // Add a file after the first build; the persisted index wins.
        write_file(
            dir.path(),
            "Bar.java",
            "package com.example;\nclass Bar {}\n",
        );
        let reloaded = ClassIndex::load_or_build(&config).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_corrupt_persisted_index_is_rebuilt() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "Foo.java",
            "package com.example;\nclass Foo {}\n",
        );

        let config = test_config(dir.path());
        fs::create_dir_all(&config.state_dir).unwrap();
        fs::write(config.class_index_path(), b"not json").unwrap();

        let index = ClassIndex::load_or_build(&config).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "Good.java",
            "package com.example;\nclass Good {}\n",
        );
        // Invalid UTF-8 makes read_to_string fail for this file.
        fs::write(dir.path().join("Bad.java"), [0xff, 0xfe, 0x00]).unwrap();

        let index = ClassIndex::build(&test_config(dir.path())).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.resolve("com.example.Good").is_some());
    }
}
