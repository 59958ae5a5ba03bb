// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for working without a reachable remote: changes are stored
//! locally, queued, and listed until a sync can run.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use specs::{isolated, UNREACHABLE_REMOTE};
use tempfile::TempDir;

fn tether() -> Command {
    isolated(cargo_bin_cmd!("tether"))
}

fn init_offline() -> TempDir {
    let temp = TempDir::new().unwrap();
    tether()
        .args(["init", "--remote", UNREACHABLE_REMOTE])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

fn run_json(temp: &TempDir, args: &[&str]) -> Value {
    let output = tether()
        .args(args)
        .args(["-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn create(temp: &TempDir, entity: &str, field: &str) -> String {
    let outcome = run_json(temp, &["create", entity, "-f", field]);
    assert_eq!(outcome["offline"], true);
    outcome["data"]["id"].as_str().unwrap().to_string()
}

#[test]
fn create_offline_is_queued() {
    let temp = init_offline();

    tether()
        .args(["create", "document", "-f", "title=Harvest plan"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Created document temp_"))
        .stdout(predicate::str::contains("saved offline"));

    tether()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pending operation(s)"))
        .stdout(predicate::str::contains("create document"));
}

#[test]
fn list_offline_shows_local_copy() {
    let temp = init_offline();
    create(&temp, "category", "name=Citrus");

    tether()
        .args(["list", "category"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(offline: showing local copy)"))
        .stdout(predicate::str::contains("Citrus (pending)"));
}

#[test]
fn update_merges_over_local_record() {
    let temp = init_offline();
    let id = create(&temp, "document", "title=Draft");

    let outcome = run_json(&temp, &["update", "document", &id, "-f", "pages=3"]);

    assert_eq!(outcome["offline"], true);
    assert_eq!(outcome["data"]["title"], "Draft");
    assert_eq!(outcome["data"]["pages"], 3);
    let ops = run_json(&temp, &["pending"]);
    assert_eq!(ops.as_array().unwrap().len(), 2);
    assert_eq!(ops[1]["kind"], "update");
}

#[test]
fn delete_offline_removes_local_copy() {
    let temp = init_offline();
    let id = create(&temp, "document", "title=Scratch");

    tether()
        .args(["delete", "document", &id])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted document"));

    let listed = run_json(&temp, &["list", "document"]);
    assert!(listed["records"].as_array().unwrap().is_empty());
    let ops = run_json(&temp, &["pending"]);
    assert_eq!(ops.as_array().unwrap().len(), 2);
}

#[test]
fn sync_offline_fails_and_keeps_queue() {
    let temp = init_offline();
    create(&temp, "document", "title=Later");

    tether()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline"));

    let ops = run_json(&temp, &["pending"]);
    assert_eq!(ops.as_array().unwrap().len(), 1);
    assert_eq!(ops[0]["attempts"], 0);
}

#[test]
fn status_reports_offline_and_pending() {
    let temp = init_offline();
    create(&temp, "document", "title=One");
    create(&temp, "category", "name=Two");

    let status = run_json(&temp, &["status"]);
    assert_eq!(status["connectivity"], "offline");
    assert_eq!(status["pending"], 2);
    assert_eq!(status["remote"], UNREACHABLE_REMOTE);
    assert_eq!(status["store"]["local_pending"], 2);

    tether()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Connectivity: offline"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn works_without_any_remote() {
    let temp = TempDir::new().unwrap();
    tether().arg("init").current_dir(temp.path()).assert().success();

    create(&temp, "document", "title=Local only");

    let status = run_json(&temp, &["status"]);
    assert_eq!(status["remote"], Value::Null);
    assert_eq!(status["pending"], 1);
}

#[test]
fn unknown_entity_fails_with_hint() {
    let temp = init_offline();

    tether()
        .args(["create", "widget", "-f", "a=1"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity type: 'widget'"))
        .stderr(predicate::str::contains("[entities.widget]"));
}

#[test]
fn configured_entity_types_replace_defaults() {
    let temp = init_offline();
    let config_path = temp.path().join(".tether/config.toml");
    let mut config = std::fs::read_to_string(&config_path).unwrap();
    config.push_str("\n[entities.note]\npath = \"/api/notes\"\n");
    std::fs::write(&config_path, config).unwrap();

    create(&temp, "note", "body=hello");

    tether()
        .args(["create", "document", "-f", "title=x"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity type"));
}

#[test]
fn invalid_field_is_rejected() {
    let temp = init_offline();

    tether()
        .args(["create", "document", "-f", "title"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid field 'title'"));
}

#[test]
fn reset_requires_yes() {
    let temp = init_offline();
    create(&temp, "document", "title=Keep");

    tether()
        .arg("reset")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    tether()
        .args(["reset", "--yes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cleared 1 records and 1 pending operations",
        ));

    tether()
        .arg("pending")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending operations"));
}
