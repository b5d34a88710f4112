//! Integration tests for the CLI binary.
//!
//! Drives the `kycr` binary end to end against an isolated data
//! directory.
//!
//! This test is registered as a [[test]] in the kyc-registry-cli crate
//! so that CARGO_BIN_EXE_kycr is available.

use std::path::Path;
use std::process::Command;

/// Get a Command pointing to the `kycr` binary with an isolated data dir.
fn kycr(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kycr"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn cli_responds_to_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_kycr"))
        .arg("--help")
        .output()
        .expect("failed to execute kycr --help");

    assert!(
        output.status.success(),
        "kycr --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout_of(&output).contains("Usage"));
}

#[test]
fn cli_responds_to_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_kycr"))
        .arg("--version")
        .output()
        .expect("failed to execute kycr --version");

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("0.2"));
}

#[test]
fn cli_full_flow_create_verify_report() {
    let dir = tempfile::tempdir().unwrap();

    // Create an identity and capture the printed ID.
    let output = kycr(dir.path())
        .args(["create", "--name", "Alice Smith", "--email", "alice@example.com"])
        .output()
        .expect("failed to execute kycr create");
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = stdout_of(&output);
    let id = stdout
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Created identity: "))
        .expect("create output should start with the new ID")
        .trim()
        .to_string();
    assert!(id.starts_with("idn_"));

    // Submit and verify a passport.
    let output = kycr(dir.path())
        .args([
            "submit-doc", &id, "--type", "passport", "--number", "P123456", "--country", "US",
            "--expiry", "2030-01-01",
        ])
        .output()
        .expect("failed to execute kycr submit-doc");
    assert!(output.status.success());

    let output = kycr(dir.path())
        .args(["verify-doc", &id, "--type", "passport"])
        .output()
        .expect("failed to execute kycr verify-doc");
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("unverified -> basic"));

    // Report renders the audit trail.
    let output = kycr(dir.path())
        .args(["report", &id])
        .output()
        .expect("failed to execute kycr report");
    assert!(output.status.success());
    let report = stdout_of(&output);
    assert!(report.contains("KYC IDENTITY REPORT"));
    assert!(report.contains("Alice Smith"));
    assert!(report.contains("document_verified"));
    assert!(report.contains("level_changed"));

    // Stats as JSON.
    let output = kycr(dir.path())
        .args(["stats", "--json"])
        .output()
        .expect("failed to execute kycr stats");
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(stats["total_identities"], 1);
    assert_eq!(stats["by_verification_level"]["basic"], 1);
    assert_eq!(stats["verified_documents"], 1);
}

#[test]
fn cli_lifecycle_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    let output = kycr(dir.path())
        .args(["create", "--name", "Eve", "--email", "eve@example.com"])
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    let id = stdout
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Created identity: "))
        .unwrap()
        .trim()
        .to_string();

    let output = kycr(dir.path())
        .args(["revoke", &id, "--reason", "fraud"])
        .output()
        .unwrap();
    assert!(output.status.success());

    // Submitting after revoke fails with a nonzero exit code.
    let output = kycr(dir.path())
        .args([
            "submit-doc", &id, "--type", "passport", "--number", "P9", "--country", "UK",
            "--expiry", "2030-01-01",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

    // Unknown identity fails too.
    let output = kycr(dir.path())
        .args(["check", "idn_doesnotexist"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_create_rejects_duplicate_email() {
    let dir = tempfile::tempdir().unwrap();

    let output = kycr(dir.path())
        .args(["create", "--name", "Alice", "--email", "alice@example.com"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = kycr(dir.path())
        .args(["create", "--name", "Alice Again", "--email", "alice@example.com"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already registered"));
}
