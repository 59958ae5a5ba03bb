// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::error::Error;
use crate::sync::connectivity::Connectivity;
use crate::sync::engine::DrainOutcome;
use crate::sync::test_helpers::{make_engine, MockRemote};
use crate::sync::transport::{Method, TransportError};

fn facade(remote: &Arc<MockRemote>, connectivity: Connectivity) -> OfflineFacade<MockRemote> {
    OfflineFacade::new(make_engine(Arc::clone(remote), connectivity))
}

fn store_snapshot(facade: &OfflineFacade<MockRemote>, entity: &str) -> Vec<Record> {
    lock_store(facade.engine().store())
        .unwrap()
        .get_all(entity)
        .unwrap()
}

fn pending_count(facade: &OfflineFacade<MockRemote>) -> usize {
    lock_store(facade.engine().store())
        .unwrap()
        .pending_count()
        .unwrap()
}

#[tokio::test]
async fn offline_create_never_errors() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);

    let outcome = facade
        .create("document", json!({"title": "Field notes"}))
        .await
        .unwrap();

    assert!(outcome.offline);
    assert_eq!(outcome.message.as_deref(), Some(OFFLINE_MESSAGE));
    let id = outcome.data["id"].as_str().unwrap();
    assert!(is_temp_id(id));
    assert_eq!(remote.call_count(), 0);

    let stored = store_snapshot(&facade, "document");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].origin, Origin::LocalPending);
    let ops = lock_store(facade.engine().store()).unwrap().list_pending().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(Some(ops[0].temp_id.clone()), outcome.temp_id);
    assert_eq!(ops[0].kind, OpKind::Create);
}

#[tokio::test]
async fn online_create_returns_server_response() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Online);

    let outcome = facade
        .create("document", json!({"title": "Live"}))
        .await
        .unwrap();

    assert!(!outcome.offline);
    assert_eq!(outcome.data["id"], "100");
    assert!(outcome.temp_id.is_none());
    assert_eq!(pending_count(&facade), 0);
    let cached = store_snapshot(&facade, "document");
    assert_eq!(cached[0].origin, Origin::ServerConfirmed);
}

#[tokio::test]
async fn failed_direct_call_falls_back() {
    let remote = Arc::new(MockRemote::failing(500));
    let facade = facade(&remote, Connectivity::Online);

    let outcome = facade
        .create("category", json!({"name": "Citrus"}))
        .await
        .unwrap();

    assert!(outcome.offline);
    assert_eq!(remote.call_count(), 1);
    assert_eq!(pending_count(&facade), 1);
}

#[tokio::test]
async fn unknown_entity_is_surfaced() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);

    let err = facade.create("invoice", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::UnknownEntity(_)));
    assert_eq!(pending_count(&facade), 0);
}

#[tokio::test]
async fn offline_update_merges_and_queues_snapshot() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);
    let created = facade
        .create("document", json!({"title": "A", "tags": ["x"]}))
        .await
        .unwrap();
    let id = created.data["id"].as_str().unwrap().to_string();

    let updated = facade
        .update("document", &id, json!({"title": "B"}))
        .await
        .unwrap();

    assert!(updated.offline);
    assert_eq!(updated.data["title"], "B");
    assert_eq!(updated.data["tags"], json!(["x"]));
    let ops = lock_store(facade.engine().store()).unwrap().list_pending().unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[1].kind, OpKind::Update);
    assert_eq!(ops[1].payload["id"], id.as_str());
    assert_eq!(ops[0].payload["title"], "A");
}

#[tokio::test]
async fn update_of_unsynced_record_stays_local_while_online() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);
    let created = facade.create("document", json!({"title": "A"})).await.unwrap();
    let id = created.data["id"].as_str().unwrap().to_string();
    facade.engine().monitor().set(Connectivity::Online);

    let updated = facade
        .update("document", &id, json!({"title": "B"}))
        .await
        .unwrap();

    assert!(updated.offline);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn online_update_uses_put_with_id() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Online);

    let outcome = facade
        .update("document", "42", json!({"title": "Edited"}))
        .await
        .unwrap();

    assert!(!outcome.offline);
    let calls = remote.calls();
    assert_eq!(calls[0].method, Method::Put);
    assert_eq!(calls[0].record_id.as_deref(), Some("42"));
    assert_eq!(calls[0].body.as_ref().unwrap()["id"], "42");
}

#[tokio::test]
async fn offline_delete_removes_locally_and_queues() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);
    lock_store(facade.engine().store())
        .unwrap()
        .put(
            "document",
            &Record::new("9", json!({"title": "Old"}), Origin::ServerConfirmed),
        )
        .unwrap();

    let outcome = facade.delete("document", "9").await.unwrap();

    assert!(outcome.offline);
    assert!(store_snapshot(&facade, "document").is_empty());
    let ops = lock_store(facade.engine().store()).unwrap().list_pending().unwrap();
    assert_eq!(ops[0].kind, OpKind::Delete);
    assert_eq!(ops[0].record_id().as_deref(), Some("9"));
}

#[tokio::test]
async fn offline_delete_of_missing_record_still_queues() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);

    let outcome = facade.delete("document", "404").await.unwrap();

    assert!(outcome.offline);
    assert_eq!(outcome.data, json!({"id": "404"}));
    assert_eq!(pending_count(&facade), 1);
}

#[tokio::test]
async fn offline_list_returns_local_snapshot() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);
    facade.create("document", json!({"title": "A"})).await.unwrap();

    let listed = facade.list("document").await.unwrap();

    assert!(listed.offline);
    assert_eq!(listed.records.len(), 1);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn online_list_unions_server_and_local_pending() {
    let remote = Arc::new(MockRemote::new());
    remote.set_list(json!({"data": [
        {"id": 1, "title": "server one"},
        {"id": 2, "title": "server two"}
    ]}));
    let facade = facade(&remote, Connectivity::Offline);
    facade.create("document", json!({"title": "local"})).await.unwrap();
    facade.update("document", "2", json!({"title": "edited"})).await.unwrap();
    facade.engine().monitor().set(Connectivity::Online);

    let listed = facade.list("document").await.unwrap();

    assert!(!listed.offline);
    assert_eq!(listed.records.len(), 3);
    let two = listed.records.iter().find(|r| r.id == "2").unwrap();
    assert_eq!(two.fields["title"], "edited");
    assert_eq!(two.origin, Origin::LocalPending);

    let cached = lock_store(facade.engine().store())
        .unwrap()
        .get_by_id("document", "1")
        .unwrap()
        .unwrap();
    assert_eq!(cached.origin, Origin::ServerConfirmed);
}

#[tokio::test]
async fn online_list_skips_records_deleted_offline() {
    let remote = Arc::new(MockRemote::new());
    remote.set_list(json!([{"id": 7, "title": "cached"}]));
    let facade = facade(&remote, Connectivity::Online);
    facade.list("document").await.unwrap();
    assert_eq!(store_snapshot(&facade, "document").len(), 1);

    facade.engine().monitor().set(Connectivity::Offline);
    facade.delete("document", "7").await.unwrap();
    facade.engine().monitor().set(Connectivity::Online);
    let listed = facade.list("document").await.unwrap();

    assert!(!listed.offline);
    assert!(listed.records.is_empty());
    assert!(store_snapshot(&facade, "document").is_empty());
    assert_eq!(pending_count(&facade), 1);
}

#[tokio::test]
async fn failed_online_list_falls_back() {
    let remote = Arc::new(MockRemote::new());
    remote.push_response(Err(TransportError::ConnectionFailed("refused".into())));
    let facade = facade(&remote, Connectivity::Online);

    let listed = facade.list("category").await.unwrap();

    assert!(listed.offline);
    assert!(listed.records.is_empty());
}

#[tokio::test]
async fn offline_changes_sync_after_restore() {
    let remote = Arc::new(MockRemote::new());
    let facade = facade(&remote, Connectivity::Offline);
    let created = facade.create("document", json!({"title": "A"})).await.unwrap();
    let temp = created.data["id"].as_str().unwrap().to_string();
    facade
        .update("document", &temp, json!({"title": "B"}))
        .await
        .unwrap();

    facade.engine().monitor().set(Connectivity::Online);
    let outcome = facade.engine().drain().await.unwrap();

    assert!(matches!(outcome, DrainOutcome::Completed(ref r) if r.succeeded == 2));
    assert_eq!(pending_count(&facade), 0);
    let records = store_snapshot(&facade, "document");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "100");
    assert_eq!(records[0].origin, Origin::ServerConfirmed);

    let later = facade
        .update("document", &temp, json!({"title": "C"}))
        .await
        .unwrap();
    assert!(!later.offline);
    assert_eq!(remote.calls()[2].record_id.as_deref(), Some("100"));
}
