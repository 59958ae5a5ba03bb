// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-entity API that hides connectivity from callers.
//!
//! Each call goes straight to the remote service when online. When offline,
//! or when the direct call fails, the change is written to the local store
//! as `local-pending` and a matching op is queued for the engine. Callers
//! only ever see local store failures.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tether_core::id::temp_record_id;
use tether_core::record::{merge_fields, with_id};
use tether_core::{is_temp_id, LocalStore, NewOp, OpKind, Origin, Record, Route};
use tracing::{debug, info};

use super::engine::{lock_store, SyncEngine};
use super::transport::{unwrap_envelope, RemoteRequest, Transport};
use crate::error::Result;

/// Advisory shown when a change was kept locally.
pub const OFFLINE_MESSAGE: &str = "saved offline; will sync when the connection returns";

/// Result of a create/update/delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    /// True if the change was stored locally and queued.
    pub offline: bool,
    /// The server response, or the local record when offline.
    pub data: Value,
    /// Handle of the queued op when offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationOutcome {
    fn online(data: Value) -> Self {
        MutationOutcome {
            offline: false,
            data,
            temp_id: None,
            message: None,
        }
    }

    fn offline(data: Value, temp_id: String) -> Self {
        MutationOutcome {
            offline: true,
            data,
            temp_id: Some(temp_id),
            message: Some(OFFLINE_MESSAGE.to_string()),
        }
    }
}

/// Result of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOutcome {
    /// True if the records came from the local store only.
    pub offline: bool,
    pub records: Vec<Record>,
}

/// Offline-aware entity API.
pub struct OfflineFacade<T: Transport> {
    engine: Arc<SyncEngine<T>>,
}

impl<T: Transport> OfflineFacade<T> {
    pub fn new(engine: Arc<SyncEngine<T>>) -> Self {
        OfflineFacade { engine }
    }

    pub fn engine(&self) -> &Arc<SyncEngine<T>> {
        &self.engine
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Fails for an unknown entity type or a local store failure. Remote
    /// failures fall back to the offline path.
    pub async fn create(&self, entity: &str, fields: Value) -> Result<MutationOutcome> {
        let route = self.engine.registry().route(entity, OpKind::Create, None)?;
        if self.engine.is_online() {
            let body = strip_temp_id(fields.clone());
            if let Some(data) = self.try_remote(route, body).await {
                self.cache_confirmed(entity, &data)?;
                return Ok(MutationOutcome::online(data));
            }
        }

        let store = lock_store(self.engine.store())?;
        let id = temp_record_id(entity, |candidate| {
            store.get_by_id(entity, candidate).is_ok_and(|r| r.is_some())
        });
        let record = Record::new(id, strip_temp_id(fields), Origin::LocalPending);
        store.put(entity, &record)?;
        let temp_id = store.enqueue(NewOp::create(entity, record.fields.clone()))?;
        info!(entity, id = %record.id, "create saved offline");
        Ok(MutationOutcome::offline(record.fields, temp_id))
    }

    /// Update a record. `fields` are merged over the stored record.
    pub async fn update(&self, entity: &str, id: &str, fields: Value) -> Result<MutationOutcome> {
        let id = lock_store(self.engine.store())?.resolve_record_id(entity, id)?;
        let route = self
            .engine
            .registry()
            .route(entity, OpKind::Update, Some(id.as_str()))?;
        if self.engine.is_online() && !is_temp_id(&id) {
            let body = with_id(fields.clone(), &id);
            if let Some(data) = self.try_remote(route, body).await {
                self.cache_confirmed(entity, &data)?;
                return Ok(MutationOutcome::online(data));
            }
        }

        let store = lock_store(self.engine.store())?;
        let merged = match store.get_by_id(entity, &id)? {
            Some(existing) => merge_fields(&existing.fields, &fields),
            None => fields,
        };
        let record = Record::new(id, merged, Origin::LocalPending);
        store.put(entity, &record)?;
        let temp_id = store.enqueue(NewOp::update(entity, record.fields.clone()))?;
        info!(entity, id = %record.id, "update saved offline");
        Ok(MutationOutcome::offline(record.fields, temp_id))
    }

    /// Delete a record. Offline, the local copy is removed immediately.
    pub async fn delete(&self, entity: &str, id: &str) -> Result<MutationOutcome> {
        let id = lock_store(self.engine.store())?.resolve_record_id(entity, id)?;
        let route = self
            .engine
            .registry()
            .route(entity, OpKind::Delete, Some(id.as_str()))?;
        if self.engine.is_online() && !is_temp_id(&id) {
            if let Some(data) = self.try_remote(route, Value::Null).await {
                lock_store(self.engine.store())?.delete(entity, &id)?;
                return Ok(MutationOutcome::online(data));
            }
        }

        let store = lock_store(self.engine.store())?;
        let snapshot = match store.get_by_id(entity, &id)? {
            Some(existing) => existing.fields,
            None => json!({ "id": id }),
        };
        store.delete(entity, &id)?;
        let temp_id = store.enqueue(NewOp::delete(entity, snapshot.clone()))?;
        info!(entity, id = %id, "delete saved offline");
        Ok(MutationOutcome::offline(snapshot, temp_id))
    }

    /// List records.
    ///
    /// Online, the server's records are cached locally and returned together
    /// with records that have local changes not yet synced. Offline (or if
    /// the list call fails), the local snapshot is returned.
    pub async fn list(&self, entity: &str) -> Result<ListOutcome> {
        let path = self.engine.registry().collection_path(entity)?.to_string();
        if self.engine.is_online() {
            match self.engine.request(RemoteRequest::list(path)).await {
                Ok(response) => match unwrap_envelope(response) {
                    Value::Array(items) => {
                        let store = lock_store(self.engine.store())?;
                        let records = merge_server_list(&store, entity, items)?;
                        return Ok(ListOutcome {
                            offline: false,
                            records,
                        });
                    }
                    other => debug!(entity, response = %other, "list response is not an array"),
                },
                Err(e) => debug!(entity, error = %e, "remote list failed, using local store"),
            }
        }

        let records = lock_store(self.engine.store())?.get_all(entity)?;
        Ok(ListOutcome {
            offline: true,
            records,
        })
    }

    /// Direct call; `None` means fall back to the offline path.
    async fn try_remote(&self, route: Route, body: Value) -> Option<Value> {
        let request = RemoteRequest::for_route(route, body);
        let described = request.describe();
        match self.engine.request(request).await {
            Ok(response) => Some(unwrap_envelope(response)),
            Err(e) => {
                info!(request = %described, error = %e, "remote call failed, saving offline");
                None
            }
        }
    }

    fn cache_confirmed(&self, entity: &str, data: &Value) -> Result<()> {
        if let Some(record) = Record::from_server(data.clone()) {
            let store = lock_store(self.engine.store())?;
            if !store.has_pending_for(entity, &record.id)? {
                store.put(entity, &record)?;
            }
        }
        Ok(())
    }
}

fn strip_temp_id(fields: Value) -> Value {
    match fields {
        Value::Object(mut map) => {
            if map.get("id").and_then(Value::as_str).is_some_and(is_temp_id) {
                map.remove("id");
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Cache the server's records and append local-pending ones. A server copy
/// never overwrites a record with unsynced local changes, and a record with a
/// queued delete is not brought back.
fn merge_server_list(store: &LocalStore, entity: &str, items: Vec<Value>) -> Result<Vec<Record>> {
    let local_pending = store.list_by_origin(entity, Origin::LocalPending)?;
    let mut held: HashSet<String> = local_pending.iter().map(|r| r.id.clone()).collect();
    held.extend(
        store
            .pending_for_entity(entity)?
            .iter()
            .filter_map(|op| op.record_id()),
    );

    let server: Vec<Record> = items
        .into_iter()
        .filter_map(Record::from_server)
        .filter(|r| !held.contains(&r.id))
        .collect();
    store.put_all(entity, &server)?;

    let mut records = server;
    records.extend(local_pending);
    Ok(records)
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
