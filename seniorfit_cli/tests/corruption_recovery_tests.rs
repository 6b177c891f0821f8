//! Corruption recovery tests for the seniorfit binary.
//!
//! These tests verify the system can handle:
//! - Corrupted progress log lines
//! - Partial writes at the end of the log
//! - Corrupted user documents
//! - Legacy frequency data in user documents

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("seniorfit"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn create_user(temp_dir: &TempDir) -> String {
    let output = cli(temp_dir)
        .args(["--json", "user", "create", "--name", "Erika"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let user: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    user["id"].as_str().unwrap().to_string()
}

#[test]
fn test_corrupted_progress_lines_skipped() {
    let temp_dir = setup_test_dir();
    let user = create_user(&temp_dir);

    let log_path = temp_dir.path().join("data/progress.jsonl");
    fs::write(&log_path, "{ invalid json }\n{ more invalid }\n").unwrap();

    cli(&temp_dir)
        .args(["submit", "--user", user.as_str(), "--exercise", "po_heben", "--completed"])
        .assert()
        .success();

    // Only the valid record is exported
    let output = cli(&temp_dir)
        .args(["export", "--user", user.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let csv = String::from_utf8(output.stdout).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("po_heben"));
}

#[test]
fn test_partial_progress_line() {
    let temp_dir = setup_test_dir();
    let user = create_user(&temp_dir);

    cli(&temp_dir)
        .args(["submit", "--user", user.as_str(), "--exercise", "bauch_atmung", "--completed"])
        .assert()
        .success();

    // Simulate a crash during an append: no trailing newline
    let log_path = temp_dir.path().join("data/progress.jsonl");
    let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    write!(file, r#"{{"id":"partial"#).unwrap();
    drop(file);

    // The broken tail does not block reads
    let output = cli(&temp_dir)
        .args(["--json", "recommend", "--user", user.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rec["exercise"]["muscle_group"], "Po");
}

#[test]
fn test_reset_drops_corrupted_lines() {
    let temp_dir = setup_test_dir();
    let user = create_user(&temp_dir);

    cli(&temp_dir)
        .args(["submit", "--user", user.as_str(), "--exercise", "po_heben", "--completed"])
        .assert()
        .success();
    let log_path = temp_dir.path().join("data/progress.jsonl");
    let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    writeln!(file, "nicht json").unwrap();
    drop(file);

    cli(&temp_dir)
        .args(["user", "reset", "--user", user.as_str()])
        .assert()
        .success();

    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.trim().is_empty());
}

#[test]
fn test_corrupted_user_document_reported() {
    let temp_dir = setup_test_dir();
    let user = create_user(&temp_dir);

    let doc_path = temp_dir
        .path()
        .join("data/users")
        .join(format!("{}.json", user));
    fs::write(&doc_path, "{ invalid json }}}}").unwrap();

    cli(&temp_dir)
        .args(["user", "status", "--user", user.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt user document"));

    // Listing skips the broken document instead of failing
    cli(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keine Benutzer"));
}

#[test]
fn test_legacy_frequency_document() {
    let temp_dir = setup_test_dir();
    let user = create_user(&temp_dir);

    let doc_path = temp_dir
        .path()
        .join("data/users")
        .join(format!("{}.json", user));
    let mut doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&doc_path).unwrap()).unwrap();
    doc["exerciseFrequency"] = serde_json::json!([
        ["bauch_atmung", "4"],
        ["bauch_knie_heben", 1.9],
        ["kaputt"]
    ]);
    fs::write(&doc_path, doc.to_string()).unwrap();

    // bauch_knie_heben was seen less often, so it comes first
    let output = cli(&temp_dir)
        .args(["--json", "recommend", "--user", user.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rec["exercise"]["id"], "bauch_knie_heben");
    assert_eq!(rec["frequency"], 2);

    // The document is rewritten in the normalized shape
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&doc_path).unwrap()).unwrap();
    assert_eq!(saved["exerciseFrequency"]["bauch_atmung"], 4);
    assert_eq!(saved["exerciseFrequency"]["bauch_knie_heben"], 2);
}
