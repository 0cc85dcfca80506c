//! CLI contract: exit codes, config-dir handling and machine-readable output.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn ferry(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ferry").unwrap();
    cmd.env("FERRY_CONFIG_DIR", config_dir)
        .env_remove("FERRY_REMOTE_TEMPLATE")
        .env_remove("FERRY_REMOTE_USERNAME")
        .env_remove("FERRY_REMOTE_PASSWORD")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("json on stdout")
}

#[test]
fn version_prints_crate_version() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn mapping_add_resolve_and_list() {
    let dir = tempdir().unwrap();

    ferry(dir.path())
        .args(["mapping", "add", "app", "internal/app", "--notes", "team a"])
        .assert()
        .success();

    ferry(dir.path())
        .args(["mapping", "resolve", "app"])
        .assert()
        .success()
        .stdout("internal/app\n");
    ferry(dir.path())
        .args(["mapping", "resolve", "other"])
        .assert()
        .success()
        .stdout("other\n");

    let list = stdout_json(ferry(dir.path()).args(["mapping", "list", "--format", "json"]));
    assert_eq!(list["app"]["internal_name"], "internal/app");
    assert_eq!(list["app"]["notes"], "team a");
    assert!(dir.path().join("mappings/default.json").is_file());
}

#[test]
fn mapping_remove_needs_confirmation_or_force() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["mapping", "add", "app", "internal/app"])
        .assert()
        .success();

    // no terminal: the prompt answers "no"
    ferry(dir.path())
        .args(["mapping", "remove", "app"])
        .assert()
        .code(1);
    ferry(dir.path())
        .args(["mapping", "resolve", "app"])
        .assert()
        .stdout("internal/app\n");

    ferry(dir.path())
        .args(["mapping", "remove", "app", "--force"])
        .assert()
        .success();
    ferry(dir.path())
        .args(["mapping", "resolve", "app"])
        .assert()
        .stdout("app\n");
}

#[test]
fn default_profile_cannot_be_deleted() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["profile", "delete", "default", "--force"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("default"));
}

#[test]
fn unknown_profile_is_a_config_error() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["mapping", "list", "--profile", "ghost"])
        .assert()
        .code(2);
}

#[test]
fn profile_export_then_import_under_new_config_dir() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    let export = src.path().join("team-a.yaml");

    ferry(src.path())
        .args([
            "profile",
            "create",
            "team-a",
            "--description",
            "Team A",
            "--remote-template",
            "https://git.internal/{repo}.git",
        ])
        .assert()
        .success();
    ferry(src.path())
        .args(["mapping", "add", "svc", "team-a/svc", "--profile", "team-a"])
        .assert()
        .success();
    ferry(src.path())
        .args(["profile", "export", "team-a", "--output"])
        .arg(&export)
        .assert()
        .success();

    ferry(dst.path())
        .args(["profile", "import"])
        .arg(&export)
        .assert()
        .success();
    let shown = stdout_json(ferry(dst.path()).args(["profile", "show", "team-a", "--format", "json"]));
    assert_eq!(shown["remote_template"], "https://git.internal/{repo}.git");
    ferry(dst.path())
        .args(["mapping", "resolve", "svc", "--profile", "team-a"])
        .assert()
        .stdout("team-a/svc\n");
}

#[test]
fn artifacts_without_gitlab_source_is_rejected_before_cloning() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["pack", "--repo-url", "https://git.example.com/team/app.git", "--with-artifacts"])
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GitLab"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn ingest_requires_a_remote_template() {
    let dir = tempdir().unwrap();
    let tar = dir.path().join("app-20250101T000000Z.tar.gz");
    fs::write(&tar, b"irrelevant").unwrap();
    ferry(dir.path())
        .args(["ingest", "--tar"])
        .arg(&tar)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("remote template"));
}

#[test]
fn corrupt_bundle_exits_4_and_is_recorded() {
    let dir = tempdir().unwrap();
    let tar = dir.path().join("app-20250101T000000Z.tar.gz");
    fs::write(&tar, b"definitely not gzip").unwrap();

    ferry(dir.path())
        .args(["ingest", "--remote-template", "https://git.internal/{repo}.git", "--tar"])
        .arg(&tar)
        .assert()
        .code(4);

    let history = stdout_json(ferry(dir.path()).args(["history", "list", "--format", "json"]));
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["status"], "failed");
    assert_eq!(entries[0]["bundle_name"], "app-20250101T000000Z.tar.gz");
    assert!(!entries[0]["error_message"].as_str().unwrap().is_empty());
}

#[test]
fn no_record_history_leaves_ledger_untouched() {
    let dir = tempdir().unwrap();
    let tar = dir.path().join("app.tar.gz");
    fs::write(&tar, b"junk").unwrap();

    ferry(dir.path())
        .args([
            "ingest",
            "--remote-template",
            "https://git.internal/{repo}.git",
            "--no-record-history",
            "--tar",
        ])
        .arg(&tar)
        .assert()
        .code(4);
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn scan_of_empty_directory_succeeds() {
    let dir = tempdir().unwrap();
    let drop = dir.path().join("drop");
    fs::create_dir_all(&drop).unwrap();
    let listed = stdout_json(ferry(dir.path()).arg("scan").arg(&drop).args(["--format", "json"]));
    assert_eq!(listed, Value::Array(vec![]));
}

#[test]
fn scan_needs_a_directory_or_auto() {
    let dir = tempdir().unwrap();
    ferry(dir.path()).arg("scan").assert().code(2);
    ferry(dir.path())
        .args(["scan", "--auto"])
        .arg(dir.path())
        .assert()
        .code(2);
}

#[test]
fn dictionary_pull_without_settings_is_not_configured() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["dict", "pull"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dict configure"));
}

#[test]
fn dictionary_connection_test_without_settings_is_not_configured() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args(["dict", "test"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dict configure"));
}

#[test]
fn dictionary_settings_never_print_secret() {
    let dir = tempdir().unwrap();
    ferry(dir.path())
        .args([
            "dict",
            "configure",
            "--endpoint-url",
            "https://s3.internal",
            "--bucket",
            "ferry",
            "--access-key",
            "AKIA",
            "--secret-key",
            "hunter2",
        ])
        .assert()
        .success();
    ferry(dir.path())
        .args(["dict", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("s3.internal"))
        .stderr(predicate::str::contains("hunter2").not());
}
