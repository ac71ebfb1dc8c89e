//! End-to-end pipeline tests over real git repositories
//!
//! Each test builds an isolated repository with libgit2, runs the full
//! pipeline, and inspects the persisted artifacts and the ranked table.

use corank::config::Config;
use corank::pipeline;
use git2::Repository;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn init_repo() -> (TempDir, Repository) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let repo = Repository::init(dir.path()).expect("Failed to init repo");
    let mut config = repo.config().expect("Failed to open repo config");
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    (dir, repo)
}

fn commit_files(repo: &Repository, message: &str, files: &[(&str, &str)]) {
    let workdir = repo.workdir().unwrap();
    let sig = repo.signature().unwrap();
    let mut index = repo.index().unwrap();
    for (rel, content) in files {
        let path = workdir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        index.add_path(Path::new(rel)).unwrap();
    }
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

fn run_config(root: &Path) -> Config {
    Config::new(root, root.join(".corank"))
}

fn read_csv(config: &Config) -> Vec<String> {
    fs::read_to_string(config.output_csv_path())
        .expect("centrality.csv should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_full_pipeline_ranks_the_import_hub_first() {
    let (dir, repo) = init_repo();
    commit_files(
        &repo,
        "add core",
        &[
            ("A.java", "package app;\npublic class A {}\n"),
            (
                "B.java",
                "package app;\nimport java.util.List;\npublic class B {}\n",
            ),
        ],
    );
    commit_files(
        &repo,
        "add consumer",
        &[(
            "C.java",
            "package app;\nimport app.A;\npublic class C {}\n",
        )],
    );

    let config = run_config(dir.path());
    pipeline::run(&config).unwrap();

    // All artifacts in place.
    assert!(config.class_index_path().exists());
    assert!(config.commit_graph_path().exists());
    assert!(config.full_graph_path().exists());

    let lines = read_csv(&config);
    assert_eq!(lines[0], "file,katz_centrality,pagerank");
    assert_eq!(lines.len(), 4, "one row per source file: {:?}", lines);

    // A is co-changed with B, authored, and imported by C; it leads the table.
    assert!(
        lines[1].starts_with("A.java,"),
        "expected A.java first, got {:?}",
        lines
    );
}

#[test]
fn test_empty_repository_yields_empty_table() {
    let (dir, _repo) = init_repo();

    let config = run_config(dir.path());
    pipeline::run(&config).unwrap();

    let lines = read_csv(&config);
    assert_eq!(lines, vec!["file,katz_centrality,pagerank"]);
}

#[test]
fn test_rerun_reuses_checkpoints_and_is_stable() {
    let (dir, repo) = init_repo();
    commit_files(
        &repo,
        "add pair",
        &[
            ("X.java", "package app;\nclass X {}\n"),
            ("Y.java", "package app;\nimport app.X;\nclass Y {}\n"),
        ],
    );

    let config = run_config(dir.path());
    pipeline::run(&config).unwrap();
    let first = fs::read_to_string(config.output_csv_path()).unwrap();

    pipeline::run(&config).unwrap();
    let second = fs::read_to_string(config.output_csv_path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_non_source_files_never_appear_in_output() {
    let (dir, repo) = init_repo();
    commit_files(
        &repo,
        "mixed commit",
        &[
            ("Main.java", "package app;\nclass Main {}\n"),
            ("README.md", "# docs\n"),
            ("build.gradle", "plugins {}\n"),
        ],
    );

    let config = run_config(dir.path());
    pipeline::run(&config).unwrap();

    let lines = read_csv(&config);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Main.java,"));
}
