// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `tether init` and running commands outside an initialized
//! directory.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use specs::isolated;
use tempfile::TempDir;
use yare::parameterized;

fn tether() -> Command {
    isolated(cargo_bin_cmd!("tether"))
}

#[test]
fn creates_tether_directory() {
    let temp = TempDir::new().unwrap();

    tether()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tether at"));

    assert!(temp.path().join(".tether/config.toml").exists());
    assert!(temp.path().join(".tether/store.db").exists());
    let gitignore = std::fs::read_to_string(temp.path().join(".tether/.gitignore")).unwrap();
    assert!(gitignore.contains("store.db"));
}

#[test]
fn stores_remote_url() {
    let temp = TempDir::new().unwrap();

    tether()
        .args(["init", "--remote", "http://localhost:5000"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote: http://localhost:5000"));

    let config = std::fs::read_to_string(temp.path().join(".tether/config.toml")).unwrap();
    assert!(config.contains("url = \"http://localhost:5000\""));
}

#[test]
fn path_option_creates_at_location() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("project");
    std::fs::create_dir(&target).unwrap();

    tether()
        .args(["init", "--path"])
        .arg(&target)
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(target.join(".tether/config.toml").exists());
    assert!(!temp.path().join(".tether").exists());
}

#[test]
fn fails_if_already_initialized() {
    let temp = TempDir::new().unwrap();
    tether().arg("init").current_dir(temp.path()).assert().success();

    tether()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[parameterized(
    ftp = { "ftp://example.com" },
    no_scheme = { "localhost:5000" },
    garbage = { "not a url" },
)]
fn rejects_invalid_remote(url: &str) {
    let temp = TempDir::new().unwrap();

    tether()
        .args(["init", "--remote", url])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));

    assert!(!temp.path().join(".tether").exists());
}

#[parameterized(
    list = { &["list", "document"] },
    pending = { &["pending"] },
    status = { &["status"] },
    sync = { &["sync"] },
    reset = { &["reset", "--yes"] },
)]
fn commands_require_init(args: &[&str]) {
    let temp = TempDir::new().unwrap();

    tether()
        .args(args)
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
