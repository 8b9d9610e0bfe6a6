// Command-line integration tests for the grindgraph binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// ============================================================================
// Text Output Tests
// ============================================================================

#[test]
fn test_text_call_tree() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg(fixture("s1.cachegrind"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== Call Tree (Time) ==="))
        .stdout(predicate::str::contains(
            "{main} (/var/www/html/index.php) Time=15000303 self=10",
        ))
        .stdout(predicate::str::contains("  -> fun1 [line 3] Time=15000293"))
        .stdout(predicate::str::contains("    -> fun2 [line 9] Time=5000093"));
}

#[test]
fn test_text_event_selection() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("-e").arg("Memory").arg(fixture("s1.cachegrind"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== Functions by inclusive Memory ==="))
        .stdout(predicate::str::contains("Memory=32 self=0"));
}

#[test]
fn test_text_depth_limit() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--depth").arg("1").arg(fixture("s1.cachegrind"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("-> fun1"))
        .stdout(predicate::str::contains("-> fun2").not());
}

#[test]
fn test_text_without_entry_point() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("no_main.out");
    fs::write(&dump, "events: Ir\nfl=(1) /a.c\nfn=(1) helper\n3 40\n").unwrap();

    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg(&dump);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("No entry point found"))
        .stdout(predicate::str::contains("helper"))
        .stdout(predicate::str::contains("=== Call Tree").not());
}

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_json_output() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--format").arg("json").arg(fixture("s1.cachegrind"));

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "grindgraph-json-v1");
    assert_eq!(json["events"], serde_json::json!(["Time", "Memory"]));

    let main = json["main"].as_u64().unwrap() as usize;
    let main_fn = &json["functions"][main];
    assert_eq!(main_fn["name"], "{main}");
    assert_eq!(main_fn["inclusive"], serde_json::json!([15000303, 32]));
    assert_eq!(main_fn["calls"][0]["target_name"], "fun1");
}

#[test]
fn test_json_valgrind_with_overrides() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--format")
        .arg("json")
        .arg("--main-marker")
        .arg("main")
        .arg("--resolve-forward-calls")
        .arg(fixture("valgrind_callgrind.out"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"target_name\": \"compute(int, int)\""))
        .stdout(predicate::str::contains("\"cmd\": \"./demo\""));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("grindgraph.toml");
    fs::write(&config, "main_marker = \"main\"\nresolve_forward_calls = true\n").unwrap();

    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("-c").arg(&config).arg(fixture("valgrind_callgrind.out"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("main (/src/demo.c) Ir=1300 self=10"))
        .stdout(predicate::str::contains("-> compute(int, int) [line 5] Ir=1200"));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "main_marker = \"\"\n").unwrap();

    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--config").arg(&config).arg(fixture("s1.cachegrind"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("main_marker must not be empty"));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_unknown_event_fails() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--event").arg("Cycles").arg(fixture("s1.cachegrind"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown event 'Cycles'"))
        .stderr(predicate::str::contains("Time, Memory"));
}

#[test]
fn test_missing_file_fails() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("/nonexistent/cachegrind.out.0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse profile"));
}

#[test]
fn test_missing_file_argument() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.assert().failure();
}

#[test]
fn test_debug_tracing_to_stderr() {
    let mut cmd = Command::cargo_bin("grindgraph").unwrap();
    cmd.arg("--debug").arg(fixture("s1.cachegrind"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("profile parsed"));
}
