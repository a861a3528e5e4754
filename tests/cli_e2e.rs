//! End-to-end tests for the drive-fetch binary.
//!
//! Only offline behavior is exercised here; networked flows are covered by
//! the engine integration tests against a mock server.

use assert_cmd::Command;
use predicates::prelude::*;

fn drive_fetch() -> Command {
    Command::cargo_bin("drive-fetch").expect("binary builds")
}

#[test]
fn test_help_lists_flags() {
    drive_fetch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--max-retries"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_missing_link_is_usage_error() {
    drive_fetch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_invalid_link_fails_without_touching_network() {
    drive_fetch()
        .args(["https://example.com/file/d/ABC/view", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid share link"));
}

#[test]
fn test_link_without_identifier_reports_it() {
    drive_fetch()
        .args(["https://drive.google.com/drive/folders", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no file identifier"));
}
