// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine: drains the mutation queue against the remote service.
//!
//! State machine `Idle → Draining → Idle`. A trigger that arrives while a
//! pass is in flight is dropped, not queued. Within a pass ops are replayed
//! strictly in enqueue order, one at a time, and each op's outcome is
//! isolated: a failure increments that op's attempt count and the pass moves
//! on. An op that reaches the attempt limit is removed and announced with
//! [`SyncEvent::ManualReviewNeeded`].
//!
//! Every remote call carries a timeout and observes the pass's cancellation
//! token, which a `lost` connectivity event trips. Ops already removed by the
//! aborted pass stay removed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tether_core::record::{id_of, with_id};
use tether_core::{is_temp_id, EntityRegistry, LocalStore, OpKind, Origin, PendingOp, Record};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connectivity::{Connectivity, ConnectivityEvent, ConnectivityMonitor};
use super::events::{SyncEvent, SyncReport};
use super::transport::{unwrap_envelope, RemoteRequest, Transport, TransportError};
use crate::error::{Error, Result};

const EVENT_CAPACITY: usize = 64;

/// The local store shared between the engine and the façade.
///
/// The lock is only ever held for synchronous store calls, never across an
/// `.await`.
pub type SharedStore = Arc<Mutex<LocalStore>>;

/// Lock the shared store.
pub fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, LocalStore>> {
    store
        .lock()
        .map_err(|_| Error::StorageUnavailable("store lock poisoned".to_string()))
}

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Failed sends before an op is escalated.
    pub max_attempts: u32,
    /// Upper bound on each remote call.
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_attempts: 3,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a drain trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The pass ran (possibly over an empty queue).
    Completed(SyncReport),
    /// Connectivity was offline; nothing was attempted.
    Offline,
    /// Another pass was in flight; this trigger was dropped.
    AlreadyRunning,
}

/// Process-wide sync status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub connectivity: Connectivity,
    pub syncing: bool,
    pub pending: usize,
}

/// Resets the `syncing` flag when a pass ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Failure of a single replay.
enum ReplayError {
    /// Counted against the op's attempts.
    Failed(String),
    /// The pass was aborted; not counted.
    Cancelled,
}

/// Drains the mutation queue and reconciles confirmed records.
pub struct SyncEngine<T: Transport> {
    store: SharedStore,
    transport: Arc<T>,
    registry: Arc<EntityRegistry>,
    monitor: Arc<ConnectivityMonitor>,
    config: EngineConfig,
    syncing: AtomicBool,
    cancel: Mutex<CancellationToken>,
    events: broadcast::Sender<SyncEvent>,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(
        store: SharedStore,
        transport: Arc<T>,
        registry: Arc<EntityRegistry>,
        monitor: Arc<ConnectivityMonitor>,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SyncEngine {
            store,
            transport,
            registry,
            monitor,
            config,
            syncing: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            events,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// True while a drain pass is in flight.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> Result<SyncStatus> {
        Ok(SyncStatus {
            connectivity: self.monitor.state(),
            syncing: self.is_syncing(),
            pending: lock_store(&self.store)?.pending_count()?,
        })
    }

    /// Abort the pass in flight, if any.
    pub fn abort(&self) {
        if let Ok(token) = self.cancel.lock() {
            if !token.is_cancelled() {
                info!("aborting drain");
            }
            token.cancel();
        }
    }

    /// Drain unless offline. Fails with [`Error::Offline`] instead of
    /// skipping silently.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        match self.drain().await? {
            DrainOutcome::Completed(report) => Ok(report),
            DrainOutcome::Offline => Err(Error::Offline),
            DrainOutcome::AlreadyRunning => Ok(SyncReport::default()),
        }
    }

    /// Run one drain pass over the queue.
    ///
    /// # Errors
    ///
    /// Only a failure to read the queue at the start of the pass is returned.
    /// Remote and store failures on a single op are counted in the report.
    pub async fn drain(&self) -> Result<DrainOutcome> {
        if !self.is_online() {
            debug!("drain skipped: offline");
            return Ok(DrainOutcome::Offline);
        }
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("drain already running, trigger dropped");
            return Ok(DrainOutcome::AlreadyRunning);
        }
        let _guard = DrainGuard(&self.syncing);
        let token = self.fresh_token()?;

        let ops = lock_store(&self.store)?.list_pending()?;
        if ops.is_empty() {
            return Ok(DrainOutcome::Completed(SyncReport::default()));
        }
        info!(pending = ops.len(), "drain started");

        let mut report = SyncReport::default();
        for op in ops {
            if token.is_cancelled() || !self.is_online() {
                report.aborted = true;
                break;
            }
            match self.replay(&op, &token).await {
                Ok(response) => match self.reconcile(&op, response) {
                    Ok(()) => {
                        debug!(temp_id = %op.temp_id, kind = %op.kind, "op confirmed");
                        report.succeeded += 1;
                    }
                    Err(e) => {
                        warn!(temp_id = %op.temp_id, error = %e, "reconciling op failed");
                        report.failed += 1;
                    }
                },
                Err(ReplayError::Cancelled) => {
                    report.aborted = true;
                    break;
                }
                Err(ReplayError::Failed(reason)) => {
                    report.failed += 1;
                    match self.record_failure(&op, &reason) {
                        Ok(true) => report.escalated += 1,
                        Ok(false) => {}
                        Err(e) => {
                            warn!(temp_id = %op.temp_id, error = %e, "recording failure failed");
                        }
                    }
                }
            }
        }

        if !report.aborted {
            lock_store(&self.store)?.set_last_sync(Utc::now())?;
        }
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            escalated = report.escalated,
            aborted = report.aborted,
            "drain finished"
        );
        let _ = self.events.send(SyncEvent::Completed(report.clone()));
        Ok(DrainOutcome::Completed(report))
    }

    /// Perform a direct remote call with the engine's timeout.
    pub async fn request(
        &self,
        request: RemoteRequest,
    ) -> std::result::Result<Value, TransportError> {
        self.call_remote(request, &CancellationToken::new()).await
    }

    /// Drain on every `restored`, abort on every `lost`.
    pub fn spawn_connectivity_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut rx = self.monitor.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ConnectivityEvent::Restored) => {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            if let Err(e) = engine.drain().await {
                                warn!(error = %e, "drain failed");
                            }
                        });
                    }
                    Ok(ConnectivityEvent::Lost) => engine.abort(),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "connectivity events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn fresh_token(&self) -> Result<CancellationToken> {
        let mut current = self
            .cancel
            .lock()
            .map_err(|_| Error::StorageUnavailable("cancel lock poisoned".to_string()))?;
        *current = CancellationToken::new();
        Ok(current.clone())
    }

    async fn call_remote(
        &self,
        request: RemoteRequest,
        token: &CancellationToken,
    ) -> std::result::Result<Value, TransportError> {
        let described = request.describe();
        let result = tokio::select! {
            _ = token.cancelled() => Err(TransportError::Cancelled),
            sent = tokio::time::timeout(self.config.request_timeout, self.transport.send(request)) => {
                match sent {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout),
                }
            }
        };
        if let Err(e) = &result {
            debug!(request = %described, error = %e, "remote call failed");
        }
        result
    }

    /// Send one op. Record ids are resolved through the temp id map; the
    /// queued snapshot itself is left untouched.
    async fn replay(
        &self,
        op: &PendingOp,
        token: &CancellationToken,
    ) -> std::result::Result<Value, ReplayError> {
        let request = self
            .build_request(op)
            .map_err(|e| ReplayError::Failed(e.to_string()))?;
        match self.call_remote(request, token).await {
            Ok(response) => Ok(response),
            Err(TransportError::Cancelled) => Err(ReplayError::Cancelled),
            Err(e) => Err(ReplayError::Failed(e.to_string())),
        }
    }

    fn build_request(&self, op: &PendingOp) -> Result<RemoteRequest> {
        let record_id = match op.record_id() {
            Some(id) if op.kind.targets_record() => {
                Some(lock_store(&self.store)?.resolve_record_id(&op.entity_type, &id)?)
            }
            _ => None,
        };
        let route = self
            .registry
            .route(&op.entity_type, op.kind, record_id.as_deref())?;
        let body = request_body(op, record_id.as_deref());
        Ok(RemoteRequest::for_route(route, body))
    }

    /// Returns true if the op was escalated.
    fn record_failure(&self, op: &PendingOp, reason: &str) -> Result<bool> {
        let store = lock_store(&self.store)?;
        let Some(attempts) = store.increment_attempts(&op.temp_id)? else {
            return Ok(false);
        };
        if attempts < self.config.max_attempts {
            debug!(temp_id = %op.temp_id, attempts, reason, "op failed, will retry");
            return Ok(false);
        }

        store.remove_pending(&op.temp_id)?;
        let escalated = PendingOp {
            attempts,
            ..op.clone()
        };
        warn!(
            entity = %op.entity_type,
            kind = %op.kind,
            reason,
            "{}",
            Error::max_attempts(&escalated)
        );
        let _ = self.events.send(SyncEvent::ManualReviewNeeded(escalated));
        Ok(true)
    }

    /// Remove a confirmed op and bring the local record in line.
    fn reconcile(&self, op: &PendingOp, response: Value) -> Result<()> {
        let store = lock_store(&self.store)?;
        store.remove_pending(&op.temp_id)?;

        let entity = op.entity_type.as_str();
        let Some(local_id) = op.record_id() else {
            return Ok(());
        };
        let response = unwrap_envelope(response);
        match op.kind {
            OpKind::Create => reconcile_create(&store, entity, &local_id, response),
            OpKind::Update => reconcile_update(&store, entity, &local_id, response),
            OpKind::Delete => {
                let resolved = store.resolve_record_id(entity, &local_id)?;
                store.delete(entity, &resolved)?;
                store.delete(entity, &local_id)?;
                Ok(())
            }
        }
    }
}

/// The body sent for `op`: creates never send a temp id, updates address
/// the resolved id.
fn request_body(op: &PendingOp, resolved_id: Option<&str>) -> Value {
    match (op.kind, &op.payload) {
        (OpKind::Create, Value::Object(map)) => {
            let mut map = map.clone();
            if map.get("id").and_then(Value::as_str).is_some_and(is_temp_id) {
                map.remove("id");
            }
            Value::Object(map)
        }
        (OpKind::Update, payload) => match resolved_id {
            Some(id) if op.record_id().as_deref() != Some(id) => with_id(payload.clone(), id),
            _ => payload.clone(),
        },
        (_, payload) => payload.clone(),
    }
}

fn pending_origin(store: &LocalStore, entity: &str, ids: &[&str]) -> Result<Origin> {
    for id in ids {
        if store.has_pending_for(entity, id)? {
            return Ok(Origin::LocalPending);
        }
    }
    Ok(Origin::ServerConfirmed)
}

/// Re-key a temp record to its server id.
fn reconcile_create(
    store: &LocalStore,
    entity: &str,
    local_id: &str,
    response: Value,
) -> Result<()> {
    let server_id = id_of(&response).unwrap_or_else(|| local_id.to_string());
    if server_id != local_id && is_temp_id(local_id) {
        store.map_record_id(entity, local_id, &server_id)?;
    }

    let local = store.get_by_id(entity, local_id)?;
    if server_id != local_id {
        store.delete(entity, local_id)?;
    }

    let origin = pending_origin(store, entity, &[local_id, &server_id])?;
    let fields = match (local, origin) {
        // Later local edits are still queued; keep them.
        (Some(local), Origin::LocalPending) => local.fields,
        // Deleted locally; the queued delete will follow.
        (None, Origin::LocalPending) => return Ok(()),
        (_, Origin::ServerConfirmed) if response.is_object() => response,
        (Some(local), Origin::ServerConfirmed) => local.fields,
        (None, Origin::ServerConfirmed) => return Ok(()),
    };
    store.put(entity, &Record::new(server_id, fields, origin))?;
    Ok(())
}

fn reconcile_update(
    store: &LocalStore,
    entity: &str,
    local_id: &str,
    response: Value,
) -> Result<()> {
    let resolved = store.resolve_record_id(entity, local_id)?;
    let Some(mut record) = store.get_by_id(entity, &resolved)? else {
        return Ok(());
    };
    if pending_origin(store, entity, &[local_id, &resolved])? == Origin::LocalPending {
        return Ok(());
    }

    if response.is_object() {
        record.fields = with_id(response, &resolved);
    }
    record.origin = Origin::ServerConfirmed;
    record.last_modified = Utc::now();
    store.put(entity, &record)?;
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
