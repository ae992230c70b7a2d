// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Fresh, empty data directory. Cleaned up when dropped.
pub fn setup_test_env() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// `dt` pointed at the given data directory, isolated from the caller's environment
pub fn dt(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dt").expect("dt binary should be built");
    cmd.env_remove("DT_DATA_DIR")
        .env_remove("DT_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Create a project with default fields and return its number
pub fn create_project(data_dir: &Path, number: &str, technician: &str) -> String {
    dt(data_dir)
        .args([
            "project",
            "create",
            "--number",
            number,
            "--client",
            "Hopital Sud",
            "--product",
            "Pharmacy",
            "--technician",
            technician,
        ])
        .assert()
        .success();
    number.to_string()
}

/// Run `dt -o json` with the given arguments and parse stdout
pub fn json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = dt(data_dir)
        .args(["-o", "json"])
        .args(args)
        .output()
        .expect("dt should run");
    assert!(
        output.status.success(),
        "dt {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Write `<data-dir>/config.toml`
pub fn write_config(data_dir: &Path, contents: &str) {
    std::fs::write(data_dir.join("config.toml"), contents).expect("Failed to write config");
}
