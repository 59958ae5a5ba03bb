// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing against a mock remote.
//!
//! `TestContext` initializes a `.tether/` directory in a temp dir and opens
//! a `SyncContext` over a [`MockRemote`], so commands run their real code
//! path without sockets.
//!
//! ```rust,ignore
//! let ctx = TestContext::offline();
//! entity::create_impl(&ctx.sync, "document", payload, OutputFormat::Text).await?;
//! ```

use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;
use tether_core::{PendingOp, Record};

use crate::config::{init_work_dir, Config};
use crate::context::SyncContext;
use crate::sync::test_helpers::MockRemote;
use crate::sync::{lock_store, Connectivity};

pub const MOCK_URL: &str = "http://mock.test";

pub struct TestContext {
    pub sync: SyncContext<MockRemote>,
    pub remote: Arc<MockRemote>,
    _temp_dir: TempDir,
}

impl TestContext {
    pub fn online() -> Self {
        Self::with_connectivity(Connectivity::Online)
    }

    pub fn offline() -> Self {
        Self::with_connectivity(Connectivity::Offline)
    }

    pub fn with_connectivity(initial: Connectivity) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let work_dir = init_work_dir(temp_dir.path(), Some(MOCK_URL)).unwrap();
        let config = Config::load(&work_dir).unwrap();
        let remote = Arc::new(MockRemote::new());
        let sync =
            SyncContext::with_transport(&work_dir, config, Arc::clone(&remote), initial).unwrap();
        TestContext {
            sync,
            remote,
            _temp_dir: temp_dir,
        }
    }

    pub fn set_online(&self, online: bool) {
        self.remote.set_reachable(online);
        let _ = self
            .sync
            .engine()
            .monitor()
            .set(Connectivity::from_reachable(online));
    }

    pub fn records(&self, entity: &str) -> Vec<Record> {
        lock_store(self.sync.engine().store())
            .unwrap()
            .get_all(entity)
            .unwrap()
    }

    pub fn record(&self, entity: &str, id: &str) -> Option<Record> {
        lock_store(self.sync.engine().store())
            .unwrap()
            .get_by_id(entity, id)
            .unwrap()
    }

    pub fn pending(&self) -> Vec<PendingOp> {
        lock_store(self.sync.engine().store())
            .unwrap()
            .list_pending()
            .unwrap()
    }

    /// Id of the single record of `entity`.
    pub fn only_id(&self, entity: &str) -> String {
        let records = self.records(entity);
        assert_eq!(records.len(), 1, "expected one {} record", entity);
        records[0].id.clone()
    }

    pub fn payload(json: Value) -> crate::cli::FieldArgs {
        crate::cli::FieldArgs {
            field: Vec::new(),
            json: Some(json.to_string()),
        }
    }
}
