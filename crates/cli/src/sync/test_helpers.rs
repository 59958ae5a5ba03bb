// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tether_core::{EntityRegistry, LocalStore};

use super::connectivity::{Connectivity, ConnectivityMonitor};
use super::engine::{EngineConfig, SyncEngine};
use super::transport::{Method, RemoteRequest, Transport, TransportError, TransportResult};

/// Mock remote service for testing without sockets.
///
/// Records every request. Scripted responses are consumed first; after that
/// the fallback applies, and without a fallback the mock behaves like an
/// accepting REST service: POST echoes the body with a fresh numeric id,
/// PUT echoes the body, DELETE returns null and GET returns the list.
pub struct MockRemote {
    calls: Mutex<Vec<RemoteRequest>>,
    scripted: Mutex<VecDeque<TransportResult<Value>>>,
    fallback: Mutex<Option<TransportResult<Value>>>,
    list: Mutex<Value>,
    reachable: AtomicBool,
    delay: Mutex<Option<Duration>>,
    next_id: AtomicU64,
}

impl MockRemote {
    pub fn new() -> Self {
        MockRemote {
            calls: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            list: Mutex::new(json!([])),
            reachable: AtomicBool::new(true),
            delay: Mutex::new(None),
            next_id: AtomicU64::new(100),
        }
    }

    /// A remote that answers every call with `status`.
    pub fn failing(status: u16) -> Self {
        let mock = Self::new();
        mock.set_fallback(Err(TransportError::Status {
            status,
            body: "internal error".to_string(),
        }));
        mock
    }

    /// Queue a response for the next unscripted call.
    pub fn push_response(&self, response: TransportResult<Value>) {
        self.scripted.lock().unwrap().push_back(response);
    }

    pub fn set_fallback(&self, response: TransportResult<Value>) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    pub fn clear_fallback(&self) {
        *self.fallback.lock().unwrap() = None;
    }

    /// Body returned for GET requests.
    pub fn set_list(&self, list: Value) {
        *self.list.lock().unwrap() = list;
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Delay every send by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, request: &RemoteRequest) -> TransportResult<Value> {
        if let Some(response) = self.scripted.lock().unwrap().pop_front() {
            return response;
        }
        if let Some(response) = self.fallback.lock().unwrap().clone() {
            return response;
        }
        match request.method {
            Method::Get => Ok(self.list.lock().unwrap().clone()),
            Method::Post => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let mut body = request.body.clone().unwrap_or_else(|| json!({}));
                body["id"] = json!(id.to_string());
                Ok(body)
            }
            Method::Put => Ok(request.body.clone().unwrap_or(Value::Null)),
            Method::Delete => Ok(Value::Null),
        }
    }
}

impl Transport for MockRemote {
    fn send(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Value>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.clone());
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.respond(&request)
        })
    }

    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { self.reachable.load(Ordering::SeqCst) })
    }
}

/// An engine over an in-memory store with the stock entity types.
pub fn make_engine(
    remote: Arc<MockRemote>,
    connectivity: Connectivity,
) -> Arc<SyncEngine<MockRemote>> {
    make_engine_with_config(remote, connectivity, EngineConfig::default())
}

pub fn make_engine_with_config(
    remote: Arc<MockRemote>,
    connectivity: Connectivity,
    config: EngineConfig,
) -> Arc<SyncEngine<MockRemote>> {
    let store = Arc::new(Mutex::new(LocalStore::open_in_memory().unwrap()));
    let monitor = Arc::new(ConnectivityMonitor::new(connectivity));
    Arc::new(SyncEngine::new(
        store,
        remote,
        Arc::new(EntityRegistry::with_defaults()),
        monitor,
        config,
    ))
}
