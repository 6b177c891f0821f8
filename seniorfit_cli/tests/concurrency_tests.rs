//! Concurrency tests for the seniorfit binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the progress log simultaneously (file locking)
//! - Rewrite user documents without leaving them half-written
//! - Read while others write

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::thread;
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

fn create_user(temp_dir: &TempDir, name: &str) -> String {
    let output = cli(temp_dir)
        .args(["--json", "user", "create", "--name", name])
        .output()
        .unwrap();
    assert!(output.status.success());
    let user: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    user["id"].as_str().unwrap().to_string()
}

/// Run the binary from a plain std command so it can be spawned from threads
fn submit_in_thread(
    data_dir: PathBuf,
    config_home: PathBuf,
    user: String,
    exercise: &'static str,
) -> thread::JoinHandle<bool> {
    thread::spawn(move || {
        std::process::Command::new(assert_cmd::cargo::cargo_bin!("seniorfit"))
            .env("XDG_CONFIG_HOME", config_home)
            .arg("--data-dir")
            .arg(data_dir)
            .args(["submit", "--user", user.as_str(), "--exercise", exercise, "--completed"])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

fn progress_lines(data_dir: &Path) -> usize {
    std::fs::read_to_string(data_dir.join("progress.jsonl"))
        .expect("Failed to read progress log")
        .lines()
        .count()
}

#[test]
fn test_concurrent_submissions_all_logged() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_home = temp_dir.path().join("config");

    // One user per worker so no two submissions race on the same document
    let users: Vec<String> = (0..5)
        .map(|i| create_user(&temp_dir, &format!("Nutzer {}", i)))
        .collect();

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            submit_in_thread(data_dir.clone(), config_home.clone(), user.clone(), "po_heben")
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap(), "submission failed");
    }

    assert_eq!(progress_lines(&data_dir), 5);

    for user in &users {
        let output = cli(&temp_dir)
            .args(["--json", "user", "status", "--user", user.as_str()])
            .output()
            .unwrap();
        assert!(output.status.success());
        let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(status["points"], 15);
    }
}

#[test]
fn test_same_user_documents_stay_readable() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_home = temp_dir.path().join("config");
    let user = create_user(&temp_dir, "Erika");

    let exercises = ["bauch_atmung", "po_heben", "nacken_rollen", "arme_kreisen"];
    let handles: Vec<_> = exercises
        .iter()
        .map(|ex| submit_in_thread(data_dir.clone(), config_home.clone(), user.clone(), *ex))
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap(), "submission failed");
    }

    // Every record is logged even if concurrent user updates overwrite each other
    assert_eq!(progress_lines(&data_dir), 4);

    let output = cli(&temp_dir)
        .args(["--json", "user", "status", "--user", user.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(status["points"].as_u64().unwrap() >= 10);

    // No stray temp files next to the document
    let entries = std::fs::read_dir(data_dir.join("users")).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_reads_while_writing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_home = temp_dir.path().join("config");
    let user = create_user(&temp_dir, "Erika");

    let writer = {
        let (data_dir, config_home, user) = (data_dir.clone(), config_home.clone(), user.clone());
        thread::spawn(move || {
            for ex in ["bauch_atmung", "bauch_knie_heben", "po_heben"] {
                let ok = submit_in_thread(data_dir.clone(), config_home.clone(), user.clone(), ex)
                    .join()
                    .unwrap();
                assert!(ok);
            }
        })
    };

    for _ in 0..3 {
        cli(&temp_dir)
            .args(["export", "--user", user.as_str()])
            .assert()
            .success();
    }

    writer.join().unwrap();
    assert_eq!(progress_lines(&data_dir), 3);
}

#[test]
fn test_reset_keeps_other_users_submissions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_home = temp_dir.path().join("config");
    let kept = create_user(&temp_dir, "Erika");
    let reset = create_user(&temp_dir, "Hans");

    let writer = {
        let (data_dir, config_home, kept) = (data_dir.clone(), config_home.clone(), kept.clone());
        thread::spawn(move || {
            let exercises = [
                "bauch_atmung",
                "po_heben",
                "nacken_rollen",
                "arme_kreisen",
                "brust_oeffnen",
            ];
            for ex in exercises {
                let ok = submit_in_thread(data_dir.clone(), config_home.clone(), kept.clone(), ex)
                    .join()
                    .unwrap();
                assert!(ok);
            }
        })
    };

    for _ in 0..5 {
        cli(&temp_dir)
            .args(["submit", "--user", reset.as_str(), "--exercise", "po_heben", "--completed"])
            .assert()
            .success();
        cli(&temp_dir)
            .args(["user", "reset", "--user", reset.as_str()])
            .assert()
            .success();
    }

    writer.join().unwrap();

    let log = std::fs::read_to_string(data_dir.join("progress.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 5);
    assert!(log.lines().all(|line| line.contains(kept.as_str())));
}
