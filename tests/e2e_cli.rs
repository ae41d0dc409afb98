//! CLI end-to-end tests
//!
//! Tests for the marquee command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the marquee binary
#[allow(deprecated)]
fn marquee_cmd() -> Command {
    Command::cargo_bin("marquee").unwrap()
}

/// Write a config pointing the database into `dir`.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("marquee.toml");
    let db_path = dir.join("catalog.db");
    fs::write(
        &config_path,
        format!(
            r#"
[server]
port = 5050

[database]
path = "{}"
"#,
            db_path.display()
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = marquee_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = marquee_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("marquee"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_hash_password() {
    let mut cmd = marquee_cmd();
    cmd.args(["hash-password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path());

    let mut cmd = marquee_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("5050"));
}

#[test]
fn test_cli_validate_rejects_zero_port() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.toml");
    fs::write(&config_path, "[server]\nport = 0\n").unwrap();

    let mut cmd = marquee_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("port"));
}

#[test]
fn test_cli_validate_rejects_malformed_toml() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("broken.toml");
    fs::write(&config_path, "[server\nport = ").unwrap();

    let mut cmd = marquee_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

#[test]
fn test_cli_seed_imports_records() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path());
    let seed_path = dir.path().join("seed.json");
    fs::write(
        &seed_path,
        r#"[
            {
                "title": "Interstellar",
                "image": "https://img.example/interstellar.jpg",
                "description": "Explorers travel through a wormhole.",
                "genre": ["Sci-Fi"],
                "movieLinks": [{"link": "https://cdn.example/interstellar.mp4", "source": "Server 1"}]
            },
            {"title": "Incomplete"}
        ]"#,
    )
    .unwrap();

    let mut cmd = marquee_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("seed")
        .arg(&seed_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 records"))
        .stdout(predicate::str::contains("skipped entry 1"));

    assert!(dir.path().join("catalog.db").exists());
}

#[test]
fn test_cli_seed_missing_file() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path());

    let mut cmd = marquee_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("seed")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_create_admin_twice_fails() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path());

    let mut cmd = marquee_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["create-admin", "root", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created admin 'root'"));

    let mut cmd = marquee_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["create-admin", "root", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
