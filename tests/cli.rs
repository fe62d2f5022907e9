//! End-to-end tests for the `orq` binary.
//!
//! Stdout is a pipe here, so every command answers in JSON.

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn orq(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("orq").unwrap();
    cmd.env_remove("ORQ_PROJECT")
        .env_remove("RUST_LOG")
        .arg("--project")
        .arg(project);
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn json_error(cmd: &mut Command, exit_code: i32) -> Value {
    let output = cmd.assert().code(exit_code).get_output().stderr.clone();
    let text = String::from_utf8(output).unwrap();
    let last = text.lines().rev().find(|l| !l.trim().is_empty()).unwrap();
    serde_json::from_str(last).unwrap()
}

/// Fresh project with one project version.
fn project_with_version(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("demo.orq");
    json_stdout(orq(&path).arg("init").arg(&path));
    json_stdout(orq(&path).args(["project-version", "create", "v1"]));
    path
}

#[test]
fn init_creates_project_named_after_file() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("demo");

    let out = json_stdout(orq(&base).arg("init").arg(&base));
    assert_eq!(out["name"], "demo");
    assert!(dir.path().join("demo.orq").is_file());

    let info = json_stdout(orq(&base).arg("info"));
    assert_eq!(info["name"], "demo");
    assert_eq!(info["schema_version"], 1);
    assert!(info["latest_version"].is_null());
}

#[test]
fn init_twice_is_already_initialized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demo.orq");
    json_stdout(orq(&path).arg("init").arg(&path));

    let err = json_error(orq(&path).arg("init").arg(&path), 2);
    assert_eq!(err["error"]["code"], "ALREADY_INITIALIZED");
}

#[test]
fn missing_project_is_not_initialized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.orq");

    let err = json_error(orq(&path).arg("info"), 2);
    assert_eq!(err["error"]["code"], "NOT_INITIALIZED");
    assert!(!path.exists());
}

#[test]
fn add_then_update_amends_pending_row() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let sol = json_stdout(orq(&path).args(["item", "add", "solution", "-d", "root"]));
    let sol_id = sol["item"]["id"].as_i64().unwrap();

    let added = json_stdout(orq(&path).args([
        "item",
        "add",
        "requirement",
        "--uid",
        "123",
        "--parent",
        &sol_id.to_string(),
        "-d",
        "D",
    ]));
    assert_eq!(added["outcome"]["outcome"], "forked");
    assert_eq!(added["outcome"]["item_version"], 1);
    let req_id = added["item"]["id"].as_i64().unwrap();

    let updated = json_stdout(orq(&path).args([
        "item",
        "update",
        "requirement",
        &req_id.to_string(),
        "-d",
        "D2",
    ]));
    assert_eq!(updated["outcome"]["outcome"], "amended");
    assert_eq!(updated["outcome"]["id"], req_id);

    let listed = json_stdout(orq(&path).args(["item", "list", "--version", "1", "--type", "req"]));
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["items"][0]["description"], "D2");
    assert_eq!(listed["items"][0]["uid"], 123);
}

#[test]
fn update_in_new_version_forks_history() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let added = json_stdout(orq(&path).args(["item", "add", "sol", "--uid", "77", "-d", "first"]));
    let id = added["item"]["id"].as_i64().unwrap();

    json_stdout(orq(&path).args(["project-version", "create", "v2"]));
    let forked = json_stdout(orq(&path).args([
        "item",
        "update",
        "sol",
        &id.to_string(),
        "-d",
        "second",
    ]));
    assert_eq!(forked["outcome"]["outcome"], "forked");
    assert_eq!(forked["outcome"]["item_version"], 2);
    assert_ne!(forked["item"]["id"], id);

    let history = json_stdout(orq(&path).args(["item", "history", "sol", "77"]));
    assert_eq!(history["count"], 2);
    assert_eq!(history["history"][0]["version"], 1);
    assert_eq!(history["history"][1]["version"], 2);

    let old = json_stdout(orq(&path).args(["item", "show", "sol", &id.to_string()]));
    assert_eq!(old["item"]["description"], "first");
}

#[test]
fn missing_parent_is_integrity_error() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let err = json_error(
        orq(&path).args(["item", "add", "requirement", "--parent", "999"]),
        5,
    );
    assert_eq!(err["error"]["code"], "INTEGRITY_ERROR");

    let listed = json_stdout(orq(&path).args(["item", "list"]));
    assert_eq!(listed["count"], 0);
}

#[test]
fn show_unknown_item_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let err = json_error(orq(&path).args(["item", "show", "requirement", "42"]), 3);
    assert_eq!(err["error"]["code"], "NOT_FOUND");
}

#[test]
fn labels_attach_to_items() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let label = json_stdout(orq(&path).args(["label", "add", "safety", "--color", "#ff8800"]));
    assert_eq!(label["color"], "#ff8800");
    let label_id = label["id"].as_i64().unwrap().to_string();

    let added = json_stdout(orq(&path).args(["item", "add", "req", "-d", "brakes"]));
    let req_id = added["item"]["id"].as_i64().unwrap().to_string();

    json_stdout(orq(&path).args(["label", "attach", &label_id, "req", &req_id]));
    let shown = json_stdout(orq(&path).args(["item", "show", "req", &req_id]));
    assert_eq!(shown["labels"][0]["tag"], "safety");

    orq(&path)
        .args(["label", "add", "bad", "--color", "orange"])
        .assert()
        .failure();
    let labels = json_stdout(orq(&path).args(["label", "list"]));
    assert_eq!(labels["count"], 1);
}

#[test]
fn media_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let sol = json_stdout(orq(&path).args(["item", "add", "solution"]));
    let sol_id = sol["item"]["id"].as_i64().unwrap().to_string();

    let source = dir.path().join("sketch.png");
    std::fs::write(&source, b"not really a png").unwrap();
    let stored = json_stdout(orq(&path).args(["media", "add", &sol_id]).arg(&source));
    assert_eq!(stored["format"], "png");
    assert_eq!(stored["size"], 16);

    let listed = json_stdout(orq(&path).args(["media", "list", &sol_id]));
    assert_eq!(listed["count"], 1);

    let media_id = stored["id"].as_i64().unwrap().to_string();
    let exported = dir.path().join("out.png");
    json_stdout(orq(&path).args(["media", "export", &media_id]).arg(&exported));
    assert_eq!(std::fs::read(&exported).unwrap(), b"not really a png");
}

#[test]
fn backup_copies_project() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);
    let copy = dir.path().join("copy.orq");

    json_stdout(orq(&path).arg("backup").arg(&copy));
    let info = json_stdout(orq(&copy).arg("info"));
    assert_eq!(info["name"], "demo");
    assert_eq!(info["latest_version"]["name"], "v1");
}

#[test]
fn version_reports_schema() {
    let dir = TempDir::new().unwrap();
    let out = json_stdout(orq(&dir.path().join("unused")).arg("version"));
    assert_eq!(out["schema"], 1);
    assert!(out["version"].is_string());
}

#[test]
fn relinking_a_pending_item_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let first = json_stdout(orq(&path).args(["item", "add", "sol", "-d", "a"]));
    let second = json_stdout(orq(&path).args(["item", "add", "sol", "-d", "b"]));
    let a = first["item"]["id"].as_i64().unwrap().to_string();
    let b = second["item"]["id"].as_i64().unwrap().to_string();

    let req = json_stdout(orq(&path).args(["item", "add", "req", "--parent", &a]));
    let req_id = req["item"]["id"].as_i64().unwrap().to_string();

    let err = json_error(
        orq(&path).args(["item", "update", "req", &req_id, "--parent", &b]),
        4,
    );
    assert_eq!(err["error"]["code"], "INVALID_ARGUMENT");
    let shown = json_stdout(orq(&path).args(["item", "show", "req", &req_id]));
    assert_eq!(shown["item"]["parent"].to_string(), a);

    // Same parent again is not a relink, and the echoed item is the stored row
    let amended = json_stdout(orq(&path).args([
        "item", "update", "req", &req_id, "--parent", &a, "-d", "text",
    ]));
    assert_eq!(amended["outcome"]["outcome"], "amended");
    assert_eq!(amended["item"]["parent"].to_string(), a);
    assert_eq!(amended["item"]["description"], "text");

    json_stdout(orq(&path).args(["project-version", "create", "v2"]));
    let forked = json_stdout(orq(&path).args(["item", "update", "req", &req_id, "--parent", &b]));
    assert_eq!(forked["outcome"]["outcome"], "forked");
    assert_eq!(forked["item"]["parent"].to_string(), b);
}

#[test]
fn repeated_update_in_one_version_keeps_one_pending_row() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);

    let added = json_stdout(orq(&path).args(["item", "add", "req", "--uid", "900", "-d", "v1"]));
    let id = added["item"]["id"].as_i64().unwrap().to_string();
    json_stdout(orq(&path).args(["project-version", "create", "v2"]));

    let forked = json_stdout(orq(&path).args(["item", "update", "req", &id, "-d", "v2a"]));
    let amended = json_stdout(orq(&path).args(["item", "update", "req", &id, "-d", "v2b"]));
    assert_eq!(forked["outcome"]["outcome"], "forked");
    assert_eq!(amended["outcome"]["outcome"], "amended");
    assert_eq!(amended["outcome"]["id"], forked["outcome"]["id"]);

    let in_v2 = json_stdout(orq(&path).args(["item", "list", "--version", "2"]));
    assert_eq!(in_v2["count"], 1);
    assert_eq!(in_v2["items"][0]["description"], "v2b");
}

#[test]
fn add_with_existing_uid_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = project_with_version(&dir);
    json_stdout(orq(&path).args(["item", "add", "sol", "--uid", "55"]));

    let err = json_error(orq(&path).args(["item", "add", "sol", "--uid", "55"]), 4);
    assert_eq!(err["error"]["code"], "INVALID_ARGUMENT");
    let listed = json_stdout(orq(&path).args(["item", "list"]));
    assert_eq!(listed["count"], 1);
}
