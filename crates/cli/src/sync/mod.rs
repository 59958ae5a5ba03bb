// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync against a REST service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Façade    │────►│  Transport  │────►│   Remote    │
//! │ (per entity)│◄────│   (trait)   │◄────│   Service   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ offline           ▲
//!        ▼                   │ drain
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ LocalStore  │◄────│ SyncEngine  │◄────│ Connectivity │
//! │ + queue     │     │             │     │   Monitor    │
//! └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! # Features
//!
//! - Direct remote calls when online, local store + queued op otherwise
//! - FIFO replay of queued ops with bounded attempts and escalation
//! - Edge-triggered `restored`/`lost` signals from a health probe
//! - Per-call timeout and cancellation on connectivity loss
//! - Injectable transport trait for testing

mod connectivity;
mod engine;
mod events;
mod facade;
mod transport;

pub use connectivity::{Connectivity, ConnectivityEvent, ConnectivityMonitor};
pub use engine::{lock_store, DrainOutcome, EngineConfig, SharedStore, SyncEngine, SyncStatus};
pub use events::{SyncEvent, SyncReport};
pub use facade::{ListOutcome, MutationOutcome, OfflineFacade, OFFLINE_MESSAGE};
pub use transport::{
    unwrap_envelope, HttpTransport, Method, RemoteRequest, Transport, TransportError,
    TransportResult,
};

#[cfg(test)]
pub(crate) mod test_helpers;
