//! CLI integration tests for mysql-es-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the mysql-es-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("mysql-es-migrate").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("parallel"))
        .stdout(predicate::str::contains("sizetest"))
        .stdout(predicate::str::contains("workertest"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_migrate_subcommand_help() {
    cmd()
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--table"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_parallel_subcommand_help() {
    cmd()
        .args(["parallel", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("raw NDJSON"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_sizetest_sweep_defaults() {
    cmd()
        .args(["sizetest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--low"))
        .stdout(predicate::str::contains("--high"))
        .stdout(predicate::str::contains("[default: 1]"))
        .stdout(predicate::str::contains("[default: 3]"));
}

#[test]
fn test_workertest_sweep_defaults() {
    cmd()
        .args(["workertest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: 1]"))
        .stdout(predicate::str::contains("[default: 4]"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql-es-migrate"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_connection_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--connection"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();
    // Empty file is invalid YAML config

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // Valid YAML but missing the destination section
    writeln!(file, "source:").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: db").unwrap();
    writeln!(file, "  user: root").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health"])
        .assert()
        .code(1);
}

#[test]
fn test_zero_workers_in_config_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "source:").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: db").unwrap();
    writeln!(file, "  user: root").unwrap();
    writeln!(file, "destination:").unwrap();
    writeln!(file, "  connections:").unwrap();
    writeln!(file, "    cluster:").unwrap();
    writeln!(file, "      - localhost").unwrap();
    writeln!(file, "migration:").unwrap();
    writeln!(file, "  workers: 0").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn test_zero_workers_flag_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();

    // A zero from the command line fails the same check as a zero in the file
    cmd()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "migrate",
            "--table",
            "events",
            "--workers",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("workers must be at least 1"));
}

#[test]
fn test_zero_batch_size_flag_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();

    cmd()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "parallel",
            "--table",
            "events",
            "--batch-size",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("batch_size must be at least 1"));
}

#[test]
fn test_zero_limit_flag_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();

    cmd()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "workertest",
            "--table",
            "events",
            "--limit",
            "0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("limit must be at least 1"));
}

#[test]
fn test_unknown_connection_group_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();

    cmd()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--connection",
            "nonexistent",
            "health",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_migrate_without_table_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();

    // The starter config leaves migration.table unset
    cmd()
        .args(["--config", config_path.to_str().unwrap(), "migrate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no table specified"));
}

// =============================================================================
// Init Tests
// =============================================================================

#[test]
fn test_init_writes_parseable_starter_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote starter configuration"));

    let written = std::fs::read_to_string(&config_path).unwrap();
    assert!(written.contains("source:"));
    assert!(written.contains("destination:"));
    assert!(written.contains("connections:"));
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "already: here\n").unwrap();

    cmd()
        .args(["init", "--output", config_path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    // Unchanged without --force
    assert_eq!(
        std::fs::read_to_string(&config_path).unwrap(),
        "already: here\n"
    );

    cmd()
        .args(["init", "--force", "--output", config_path.to_str().unwrap()])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&config_path)
        .unwrap()
        .contains("source:"));
}

// =============================================================================
// Argument Validation Tests
// =============================================================================

#[test]
fn test_sizetest_rejects_oversized_exponent() {
    cmd()
        .args(["sizetest", "--high", "40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("40"));
}

#[test]
fn test_workertest_rejects_zero_workers() {
    cmd()
        .args(["workertest", "--low", "0"])
        .assert()
        .failure();
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
