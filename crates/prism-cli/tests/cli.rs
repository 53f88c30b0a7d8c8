//! CLI command integration tests.
//! Each test uses a temp directory via PRISM_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn prism_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("prism").unwrap();
    cmd.env("PRISM_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn history_fresh_db() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no traces recorded)"));
}

#[test]
fn concepts_lists_catalog() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["concepts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stem-mathematics"))
        .stdout(predicate::str::contains("arts-philosophy"))
        .stdout(predicate::str::contains("synthesis-meta"));
}

#[test]
fn project_then_history() {
    let dir = TempDir::new().unwrap();

    prism_cmd(&dir)
        .args(["project", "explain quantum physics", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("projected \"explain quantum physics\""))
        .stdout(predicate::str::contains("memory:"));

    prism_cmd(&dir)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("explain quantum physics"));
}

#[test]
fn project_json_output() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["project", "history of rome", "--seed", "3", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"samples\""))
        .stdout(predicate::str::contains("\"value_field\""));
}

#[test]
fn project_accumulates_memory() {
    let dir = TempDir::new().unwrap();

    prism_cmd(&dir)
        .args(["project", "first prompt about math", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 edges"));

    prism_cmd(&dir)
        .args(["project", "second prompt about art", "--seed", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 edges"));
}

#[test]
fn project_custom_summary_in_history() {
    let dir = TempDir::new().unwrap();

    prism_cmd(&dir)
        .args([
            "project",
            "philosophy of mind",
            "--seed",
            "5",
            "--summary",
            "discussed dualism",
        ])
        .assert()
        .success();

    prism_cmd(&dir)
        .args(["history", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("discussed dualism"));
}

#[test]
fn strongest_pixels() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["strongest", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("energy"));
}

#[test]
fn pixels_for_concept() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["pixels", "stem-mathematics", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pixels tagged stem-mathematics"));
}

#[test]
fn pixels_unknown_concept_fails() {
    let dir = TempDir::new().unwrap();
    prism_cmd(&dir)
        .args(["pixels", "no-such-concept"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown concept"));
}

#[test]
fn export_import_roundtrip() {
    let dir = TempDir::new().unwrap();

    prism_cmd(&dir)
        .args(["project", "neural networks and learning", "--seed", "9"])
        .assert()
        .success();

    let export_path = dir.path().join("memory.json");
    prism_cmd(&dir)
        .args(["export"])
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));
    assert!(export_path.exists(), "export file should exist");

    // import into a fresh data dir
    let other = TempDir::new().unwrap();
    prism_cmd(&other)
        .args(["import"])
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported from"))
        .stdout(predicate::str::contains("edges=1"));

    prism_cmd(&other)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("neural networks and learning"));
}

#[test]
fn import_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json at all").unwrap();

    prism_cmd(&dir)
        .args(["import"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse memory JSON"));
}

#[test]
fn missing_required_args() {
    let dir = TempDir::new().unwrap();

    prism_cmd(&dir)
        .args(["project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    prism_cmd(&dir)
        .args(["export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    prism_cmd(&dir)
        .args(["import"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn data_dir_isolation() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();

    prism_cmd(&dir_a)
        .args(["project", "isolated content", "--seed", "4"])
        .assert()
        .success();

    prism_cmd(&dir_a)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("isolated content"));

    prism_cmd(&dir_b)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no traces recorded)"));
}
