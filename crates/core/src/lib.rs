// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: storage layer for the tether offline-first sync engine
//!
//! This crate provides the data model, the SQLite-backed local store and the
//! mutation queue. It is synchronous; the async engine lives in the `tether`
//! crate.

pub mod error;
pub mod id;
pub mod op;
pub mod queue;
pub mod record;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use op::{NewOp, OpKind, PendingOp};
pub use record::{is_temp_id, Origin, Record, TEMP_ID_PREFIX};
pub use registry::{EndpointDescriptor, EntityRegistry, Route};
pub use store::{LocalStore, StoreStats};
