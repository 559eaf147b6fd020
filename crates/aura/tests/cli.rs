//! Binary tests: exit codes and secret handling

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn aura(repo: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("aura").unwrap();
    cmd.env_clear()
        .current_dir(repo)
        .env("AURA_REPO_PATH", repo)
        .env("AURA_LOG", "warn");
    cmd
}

#[test]
fn test_missing_token_exits_with_configuration_error() {
    let dir = tempdir().unwrap();
    git2::Repository::init(dir.path()).unwrap();

    aura(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));

    assert!(!dir.path().join("progress_log.txt").exists());
}

#[test]
fn test_not_a_repository() {
    let dir = tempdir().unwrap();

    aura(dir.path())
        .env("GITHUB_TOKEN", "ghp_token")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not a git repository"));
}

#[test]
fn test_transport_failure_redacts_token() {
    let dir = tempdir().unwrap();
    git2::Repository::init(dir.path()).unwrap();

    aura(dir.path())
        .env("GITHUB_TOKEN", "ghp_cli_secret_token")
        .env("AURA_REMOTE_HOST", "127.0.0.1:1")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("ghp_cli_secret_token").not());

    let log = std::fs::read_to_string(dir.path().join("progress_log.txt")).unwrap();
    assert!(log.contains("Aura Insight:"));
}

#[test]
fn test_invalid_push_mode() {
    let dir = tempdir().unwrap();
    git2::Repository::init(dir.path()).unwrap();

    aura(dir.path())
        .env("GITHUB_TOKEN", "ghp_token")
        .env("AURA_PUSH_MODE", "sideways")
        .assert()
        .code(2);
}
