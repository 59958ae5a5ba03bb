// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::entity::create_impl;
use crate::commands::testing::{TestContext, MOCK_URL};
use crate::sync::Connectivity;
use serde_json::json;

#[tokio::test]
async fn test_status_counts_pending_work() {
    let ctx = TestContext::offline();
    create_impl(&ctx.sync, "category", &TestContext::payload(json!({"name": "Citrus"})))
        .await
        .unwrap();

    let report = run_impl(&ctx.sync).unwrap();

    assert_eq!(report.remote.as_deref(), Some(MOCK_URL));
    assert_eq!(report.sync.connectivity, Connectivity::Offline);
    assert_eq!(report.sync.pending, 1);
    assert_eq!(report.store.local_pending, 1);
    assert_eq!(report.store.records.get("category"), Some(&1));
    assert!(report.store.last_sync.is_none());
}

#[tokio::test]
async fn test_status_records_last_sync() {
    let ctx = TestContext::offline();
    create_impl(&ctx.sync, "document", &TestContext::payload(json!({"title": "A"})))
        .await
        .unwrap();
    ctx.set_online(true);
    ctx.sync.engine().sync_now().await.unwrap();

    let report = run_impl(&ctx.sync).unwrap();

    assert_eq!(report.sync.pending, 0);
    assert_eq!(report.store.local_pending, 0);
    assert!(report.store.last_sync.is_some());
}

#[tokio::test]
async fn test_status_json_shape() {
    let ctx = TestContext::online();

    let report = run_impl(&ctx.sync).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["connectivity"], "online");
    assert_eq!(value["syncing"], false);
    assert_eq!(value["pending"], 0);
    assert_eq!(value["store"]["pending_ops"], 0);
}
