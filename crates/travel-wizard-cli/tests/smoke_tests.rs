//! Smoke tests for the travel-wizard CLI
//!
//! None of these open a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the travel-wizard binary with a clean environment
fn travel_wizard() -> Command {
    let mut cmd = Command::cargo_bin("travel-wizard").expect("travel-wizard binary should exist");
    cmd.env_remove("TRAVEL_WIZARD_BROWSER")
        .env_remove("TRAVEL_WIZARD_BASE_URL")
        .env_remove("TRAVEL_WIZARD_HEADLESS");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    travel_wizard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_flag() {
    travel_wizard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    travel_wizard().assert().failure();
}

#[test]
fn test_run_help_lists_browser_flags() {
    travel_wizard()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--browser"))
        .stdout(predicate::str::contains("--headed"))
        .stdout(predicate::str::contains("Firefox"));
}

// ============================================================================
// Plan
// ============================================================================

#[test]
fn test_plan_keyboard_range() {
    travel_wizard()
        .args(["plan", "--today", "2026-10-19"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy: keyboard"))
        .stdout(predicate::str::contains("26/10/2026"))
        .stdout(predicate::str::contains("25/11/2026"))
        .stdout(predicate::str::contains("סה\"כ: 30 ימים"));
}

#[test]
fn test_plan_text_entry_range() {
    travel_wizard()
        .args(["plan", "--today", "2026-10-19", "--strategy", "text-entry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("24/11/2026"));
}

#[test]
fn test_plan_rejects_bad_date() {
    travel_wizard()
        .args(["plan", "--today", "19/10/2026"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_prints_yaml() {
    travel_wizard()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url:"))
        .stdout(predicate::str::contains("browser: chrome"))
        .stdout(predicate::str::contains("strategy: keyboard"));
}

#[test]
fn test_config_reads_file_and_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wizard.yaml");
    fs::write(&path, "headless: false\ndate:\n  strategy: text-entry\n").unwrap();

    travel_wizard()
        .env("TRAVEL_WIZARD_BROWSER", "edge")
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("browser: edge"))
        .stdout(predicate::str::contains("headless: false"))
        .stdout(predicate::str::contains("strategy: text-entry"));
}

#[test]
fn test_missing_config_file_fails() {
    travel_wizard()
        .args(["config", "--config", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.yaml"));
}

#[test]
fn test_unsupported_browser_fails_before_launch() {
    travel_wizard()
        .args(["run", "--browser", "firefox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported browser: 'firefox'"));
}
