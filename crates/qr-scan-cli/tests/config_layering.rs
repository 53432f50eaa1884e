//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::ImageFormat;
use predicates::prelude::*;
use qr_scan_test_support::SyntheticImageBuilder;
use tempfile::TempDir;

/// Temp project with a 64x48 PNG and an empty XDG config home.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let bytes = SyntheticImageBuilder::blank_bytes(64, 48, ImageFormat::Png).unwrap();
    fs::write(dir.path().join("test.png"), bytes).unwrap();
    fs::create_dir_all(dir.path().join("xdg/qr-scan")).unwrap();
    dir
}

fn write_project_config(dir: &Path, toml: &str) {
    fs::write(dir.join(".qr-scan.toml"), toml).unwrap();
}

fn write_xdg_config(dir: &Path, toml: &str) {
    fs::write(dir.join("xdg/qr-scan/config.toml"), toml).unwrap();
}

fn qr_scan(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("qr-scan").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

#[test]
fn test_project_config_applies_format() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[output]
format = 'json'
",
    );

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_cli_overrides_project_config() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[output]
format = 'json'
",
    );

    qr_scan(dir.path())
        .args(["--format", "jsonl", "test.png"])
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_xdg_config_applies() {
    let dir = project();
    write_xdg_config(
        dir.path(),
        r"
[output]
format = 'json'
",
    );

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_project_config_overrides_xdg() {
    let dir = project();
    write_xdg_config(
        dir.path(),
        r"
[output]
format = 'json'
",
    );
    write_project_config(
        dir.path(),
        r"
[output]
format = 'jsonl'
",
    );

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_project_config_found_in_parent() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[output]
format = 'json'
",
    );
    let nested = dir.path().join("sub");
    fs::create_dir(&nested).unwrap();

    qr_scan(dir.path())
        .current_dir(&nested)
        .arg("../test.png")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_config_decoder_limits_apply() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[decoder]
max_image_width = 32
",
    );

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"success\":false"));
}

#[test]
fn test_config_engine_instances_apply() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[engine]
instances = 3
",
    );

    qr_scan(dir.path())
        .args(["-vv", "test.png"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Engine pool: 3 instance(s)"));
}

#[test]
fn test_config_recursive_applies() {
    let dir = project();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::copy(dir.path().join("test.png"), nested.join("deep.png")).unwrap();
    write_project_config(
        dir.path(),
        r"
[general]
recursive = true
",
    );

    let output = qr_scan(dir.path()).arg(".").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("deep.png"));
}

#[test]
fn test_invalid_config_value_warns_and_continues() {
    let dir = project();
    write_project_config(
        dir.path(),
        r"
[general]
jobs = 0
",
    );

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("general.jobs must be at least 1"));
}

#[test]
fn test_malformed_config_is_ignored() {
    let dir = project();
    write_project_config(dir.path(), "[output\nformat = 'json'\n");

    qr_scan(dir.path())
        .arg("test.png")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("{"));
}
