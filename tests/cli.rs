//! Binary-level tests for the failure paths that must stop before any SSH connection.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `stagehand` command isolated from the caller's environment and config.
fn isolated(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stagehand");
    cmd.current_dir(dir.path())
        .env("STAGEHAND_CONFIG", dir.path().join("missing-config.toml"))
        .env("STAGEHAND_REPO_MAP", dir.path().join("missing-repos.json"))
        .env("NO_COLOR", "1")
        .env_remove("SSH_HOST")
        .env_remove("SSH_KEY_PATH")
        .env_remove("SSH_USERNAME")
        .env_remove("SSH_PORT")
        .env_remove("STAGEHAND_INTERACTIVE")
        .env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn invalid_project_name_exits_1() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo;rm -rf /", "--yes"])
        .env("SSH_HOST", "staging.invalid")
        .env("SSH_KEY_PATH", "/nonexistent/key")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid project name"));
}

#[test]
fn missing_credentials_exit_1() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SSH_HOST and SSH_KEY_PATH"));
}

#[test]
fn unresolvable_project_exits_1() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not determine the project"));
}

#[test]
fn invalid_env_assignment_exits_1() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo", "--env", "1PORT=3000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid environment variable key"));
}

#[test]
fn env_value_with_line_break_exits_1_before_connecting() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo", "--yes", "--env", "A=x\nB=evil"])
        .env("SSH_HOST", "staging.invalid")
        .env("SSH_KEY_PATH", "/nonexistent/key")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Connecting to").not())
        .stderr(predicate::str::contains("contains a line break"));
}

#[test]
fn malformed_config_file_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[ssh]\nport = \"not a number\"\n").unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo"])
        .env("STAGEHAND_CONFIG", &config)
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Configuration error").or(predicate::str::contains("parse")),
        );
}

#[test]
fn unknown_command_exits_1() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .arg("launch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown command 'launch'"));
}

#[test]
fn ask_and_yes_are_mutually_exclusive() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["deploy", "--project", "demo", "--ask", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
