// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for checklists

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(deprecated)]

mod common;

use common::{create_project, dt, json, setup_test_env};
use predicates::prelude::*;

#[test]
fn toggle_and_show_checklist() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");

    dt(temp.path())
        .args(["checklist", "toggle", "PRJ1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [x] Request access to all servers"));

    dt(temp.path())
        .args(["checklist", "show", "PRJ1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PRJ1: 10% complete"));

    dt(temp.path())
        .args(["checklist", "toggle", "PRJ1", "1", "--undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ]"));
}

#[test]
fn notes_and_images_are_kept() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");

    dt(temp.path())
        .args(["checklist", "note", "PRJ1", "2", "Waiting on VPN"])
        .assert()
        .success();
    dt(temp.path())
        .args(["checklist", "attach", "PRJ1", "2", "uploads/vpn.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached uploads/vpn.png to item 2"));

    let items = json(temp.path(), &["checklist", "show", "PRJ1"]);
    let item = &items.as_array().unwrap()[1];
    assert_eq!(item["notes"][0]["text"], "Waiting on VPN");
    assert_eq!(item["images"][0]["reference"], "uploads/vpn.png");
}

#[test]
fn attach_and_import_report_json() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");
    let file = temp.path().join("steps.json");
    std::fs::write(&file, r#"{"items": ["Back up database", "Install release"]}"#).unwrap();

    let attached = json(
        temp.path(),
        &["checklist", "attach", "PRJ1", "1", "uploads/backup.png"],
    );
    assert_eq!(attached["item"], 1);
    assert_eq!(attached["image"]["reference"], "uploads/backup.png");

    let imported = json(
        temp.path(),
        &["checklist", "import", "PRJ1", file.to_str().unwrap()],
    );
    assert_eq!(imported["number"], "PRJ1");
    assert_eq!(imported["items"], 2);
}

#[test]
fn missing_item_is_reported() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");

    dt(temp.path())
        .args(["checklist", "toggle", "PRJ1", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checklist item not found"));
}

#[test]
fn import_replaces_items() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");
    let file = temp.path().join("steps.json");
    std::fs::write(
        &file,
        r#"{"items": ["Back up database", {"label": "Install release"}, ""]}"#,
    )
    .unwrap();

    dt(temp.path())
        .args(["checklist", "import", "PRJ1"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 items into PRJ1"));

    let items = json(temp.path(), &["checklist", "show", "PRJ1"]);
    let labels: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Back up database", "Install release", "Step 3"]);
}

#[test]
fn empty_import_is_refused() {
    let temp = setup_test_env();
    create_project(temp.path(), "PRJ1", "tech@example.com");
    let file = temp.path().join("empty.json");
    std::fs::write(&file, r#"{"items": []}"#).unwrap();

    dt(temp.path())
        .args(["checklist", "import", "PRJ1"])
        .arg(&file)
        .assert()
        .failure();

    let items = json(temp.path(), &["checklist", "show", "PRJ1"]);
    assert_eq!(items.as_array().unwrap().len(), 10);
}
