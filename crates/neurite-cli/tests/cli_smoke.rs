//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `neurite` binary to verify that
//! argument parsing, config handling, and the demo training runs work
//! end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("neurite").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("neurite"));
}

// ---------------------------------------------------------------------------
// Train subcommand
// ---------------------------------------------------------------------------

#[test]
fn train_help_lists_overrides() {
    cmd()
        .args(["train", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("epochs"))
        .stdout(predicate::str::contains("learning_rate"))
        .stdout(predicate::str::contains("hidden"));
}

#[test]
fn train_show_config_prints_effective_json() {
    cmd()
        .args(["train", "--show_config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"epochs\""))
        .stdout(predicate::str::contains("\"learning_rate\""))
        .stdout(predicate::str::contains("\"mse\""))
        .stderr(predicate::str::contains("No config provided"));
}

#[test]
fn train_show_config_reflects_overrides() {
    cmd()
        .args(["train", "--show_config", "--loss", "bce", "--epochs", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bce\""))
        .stdout(predicate::str::contains("\"epochs\": 7"));
}

#[test]
fn train_rejects_unknown_loss() {
    cmd()
        .args(["train", "--loss", "huber"])
        .assert()
        .failure();
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn train_tiny_regression_run() {
    cmd()
        .args(["train", "--epochs", "3", "--samples", "16", "--hidden", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Epoch"))
        .stdout(predicate::str::contains("predicted"))
        .stderr(predicate::str::contains("Completed 3 epochs"));
}

#[test]
fn train_tiny_classification_run() {
    cmd()
        .args([
            "train",
            "--loss",
            "bce",
            "--optimizer",
            "adam",
            "--epochs",
            "3",
            "--samples",
            "16",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("p(class 1"))
        .stderr(predicate::str::contains("Completed 3 epochs"));
}

#[test]
fn train_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    std::fs::write(
        &path,
        r#"{"epochs": 2, "samples": 12, "hidden": [3], "batch_size": 4}"#,
    )
    .unwrap();

    cmd()
        .arg("train")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Using config"))
        .stderr(predicate::str::contains("Completed 2 epochs"));
}

#[test]
fn train_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    std::fs::write(&path, r#"{"epochs": 50, "samples": 12}"#).unwrap();

    cmd()
        .arg("train")
        .arg(&path)
        .args(["--epochs", "1", "--show_config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"epochs\": 1"));
}
