//! End-to-end smoke test for `fimforge generate`.

use std::fs;

use assert_cmd::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn copy_fixtures(dest: &std::path::Path) {
    for name in ["impl_trait.rs", "multiline_sig.rs", "callgraph.rs", "crlf.rs"] {
        let src = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
        fs::copy(&src, dest.join(name)).unwrap();
    }
}

#[test]
fn generate_writes_train_and_metadata() {
    let project = TempDir::new().unwrap();
    copy_fixtures(project.path());

    let out = TempDir::new().unwrap();

    Command::cargo_bin("fimforge")
        .expect("bin")
        .args([
            "generate",
            project.path().to_str().unwrap(),
            "--output",
            out.path().to_str().unwrap(),
            "--language",
            "rust",
            "--seed",
            "7",
        ])
        .assert()
        .success();

    let train = out.path().join("train.jsonl");
    let metadata = out.path().join("metadata.json");
    assert!(train.exists() || out.path().join("val.jsonl").exists());
    assert!(metadata.exists());

    let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(metadata).unwrap()).unwrap();
    assert_eq!(meta["language"], "rust");
}

#[test]
fn preview_prints_without_writing_output() {
    let project = TempDir::new().unwrap();
    copy_fixtures(project.path());
    let out = TempDir::new().unwrap();

    Command::cargo_bin("fimforge")
        .expect("bin")
        .args(["generate", project.path().to_str().unwrap(), "--output", out.path().to_str().unwrap(), "--preview", "1"])
        .assert()
        .success();

    assert!(!out.path().join("train.jsonl").exists());
}
