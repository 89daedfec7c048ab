//! `volunteers` binary against an unreachable directory service.
//!
//! Every run points at a closed port, so the CLI exercises the cache and
//! sample-data fallbacks with an isolated cache directory.
//!
//! ## Exit Codes
//! - 0: Success
//! - 1: Failure
//! - 2: Configuration error

use std::path::Path;

use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

/// `volunteers` with an isolated config path and cache directory.
fn volunteers(home: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("volunteers")?;
    cmd.env("VOLUNTEER_DIRECTORY_CONFIG", home.join("missing-config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd.args([
        "--api-url",
        UNREACHABLE_API,
        "--timeout-ms",
        "2000",
        "--cache-dir",
    ]);
    cmd.arg(home.join("cache"));
    Ok(cmd)
}

fn json_stdout(output: &std::process::Output) -> Result<JsonValue> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn list_seeds_sample_data_when_nothing_is_reachable() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 8 of 8 volunteers"))
        .stdout(predicate::str::contains("Rajesh Kumar"))
        .stdout(predicate::str::contains("Loaded 8 volunteers from sample data"));

    assert!(home.path().join("cache").join("volunteers.json").exists());
    Ok(())
}

#[test]
fn second_run_reads_the_cache() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?.arg("list").assert().success();

    volunteers(home.path())?
        .args(["list", "--view", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AAK No"))
        .stdout(predicate::str::contains("Loaded 8 volunteers from local cache"));
    Ok(())
}

#[test]
fn json_list_applies_search_and_category() -> Result<()> {
    let home = TempDir::new()?;
    let output = volunteers(home.path())?
        .args(["--json", "list", "--search", "mumbai", "--category", "AAK1007"])
        .output()?;
    assert!(output.status.success());

    let json = json_stdout(&output)?;
    assert_eq!(json["source"], "sample data");
    assert_eq!(json["total"], 8);
    assert_eq!(json["shown"], 1);
    assert_eq!(json["records"][0]["_id"], "mock_7");
    assert_eq!(json["records"][0]["aakNo"], "AAK1007");
    Ok(())
}

#[test]
fn empty_search_result_shows_empty_state() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args(["list", "--search", "no-such-volunteer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 results found"))
        .stdout(predicate::str::contains("No volunteers found"));
    Ok(())
}

#[test]
fn show_prints_id_card_or_fails_for_unknown_id() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args(["show", "mock_2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VOLUNTEER ID CARD"))
        .stdout(predicate::str::contains("Priya Sharma"));

    volunteers(home.path())?
        .args(["show", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Volunteer ghost not found"));
    Ok(())
}

#[test]
fn add_saves_locally_and_persists_across_runs() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args([
            "add",
            "--name",
            "Ravi Kumar",
            "--code",
            "AAK2001",
            "--mobile",
            "9000000001",
            "--address",
            "Nagpur, Maharashtra",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Volunteer Ravi Kumar added successfully!"))
        .stdout(predicate::str::contains("saved locally"))
        .stderr(predicate::str::contains("Saved locally: remote directory unavailable"));

    let output = volunteers(home.path())?
        .args(["--json", "list"])
        .output()?;
    let json = json_stdout(&output)?;
    assert_eq!(json["source"], "local cache");
    assert_eq!(json["total"], 9);
    assert_eq!(json["records"][0]["name"], "Ravi Kumar");
    assert_eq!(json["records"][0]["uniqueId"], 1009);
    Ok(())
}

#[test]
fn add_with_blank_name_fails() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args([
            "add", "--name", " ", "--code", "AAK2001", "--mobile", "1", "--address", "x",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("name is required"));
    Ok(())
}

#[test]
fn delete_with_yes_removes_the_record() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args(["delete", "mock_1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Volunteer deleted successfully"));

    volunteers(home.path())?
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("AAK1002"))
        .stdout(predicate::str::contains("AAK1001").not());
    Ok(())
}

#[test]
fn declined_delete_keeps_the_record() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .args(["delete", "mock_3"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete volunteer Amit Patel"))
        .stdout(predicate::str::contains("Delete cancelled"));

    volunteers(home.path())?
        .args(["show", "mock_3"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn health_reports_unreachable_service() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .arg("health")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Directory service unreachable"));
    Ok(())
}

#[test]
fn list_runs_when_cache_dir_is_unusable() -> Result<()> {
    let home = TempDir::new()?;
    let blocker = home.path().join("blocker");
    std::fs::write(&blocker, "not a directory")?;

    let mut cmd = assert_cmd::Command::cargo_bin("volunteers")?;
    cmd.env("VOLUNTEER_DIRECTORY_CONFIG", home.path().join("missing-config.toml"))
        .env_remove("RUST_LOG")
        .args(["--api-url", UNREACHABLE_API, "--timeout-ms", "2000", "--cache-dir"])
        .arg(blocker.join("cache"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 8 volunteers from sample data"))
        .stderr(predicate::str::contains("Local cache unavailable"));
    Ok(())
}

#[test]
fn invalid_config_exits_with_config_error() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "timeout_ms = 0\n")?;

    let mut cmd = assert_cmd::Command::cargo_bin("volunteers")?;
    cmd.args(["--config"])
        .arg(&config)
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}

#[test]
fn shell_runs_scripted_session() -> Result<()> {
    let home = TempDir::new()?;
    volunteers(home.path())?
        .arg("shell")
        .write_stdin("view list\nsearch priya\nopen mock_2\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 8 volunteers from sample data"))
        .stdout(predicate::str::contains("Showing 1 of 8 volunteers for \"priya\""))
        .stdout(predicate::str::contains("VOLUNTEER ID CARD"));
    Ok(())
}
