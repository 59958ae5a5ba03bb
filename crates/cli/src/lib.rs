// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether - offline-first sync for records backed by a REST service.
//!
//! This crate provides the async side of the `tether` CLI: the sync engine,
//! connectivity monitor, HTTP transport and offline façade, plus the
//! command-line front end. Storage lives in `tether-core`.
//!
//! # Main Components
//!
//! - [`SyncEngine`] - drains the mutation queue against the remote in order
//! - [`OfflineFacade`] - per-entity create/update/delete/list that falls back
//!   to the local store when the remote is unreachable
//! - [`ConnectivityMonitor`] - online/offline state with edge events
//! - [`Config`] - `.tether/config.toml` (remote, sync tuning, entity types)
//!
//! # Usage
//!
//! ```rust,ignore
//! use tether::{init_work_dir, SyncContext};
//!
//! let work_dir = init_work_dir(Path::new("."), Some("http://localhost:5000"))?;
//! let ctx = SyncContext::open_at(&work_dir).await?;
//! ctx.facade().create("document", json!({"title": "Plan"})).await?;
//! ctx.engine().sync_now().await?;
//! ```

mod cli;
mod commands;
mod display;
mod runner;

pub mod config;
pub mod context;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, FieldArgs, OutputFormat};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use context::{ConfiguredTransport, SyncContext};
pub use error::{Error, Result};
pub use sync::{ConnectivityMonitor, OfflineFacade, SyncEngine};

use std::future::Future;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { remote, path } => commands::init::run(remote, path),
        Command::Create {
            entity,
            fields,
            output,
        } => block_on(commands::entity::create(&entity, &fields, output)),
        Command::Update {
            entity,
            id,
            fields,
            output,
        } => block_on(commands::entity::update(&entity, &id, &fields, output)),
        Command::Delete { entity, id, output } => {
            block_on(commands::entity::delete(&entity, &id, output))
        }
        Command::List { entity, output } => block_on(commands::entity::list(&entity, output)),
        Command::Pending { output } => commands::pending::run(output),
        Command::Sync => block_on(commands::sync::run()),
        Command::Status { output } => block_on(commands::status::run(output)),
        Command::Watch => block_on(commands::watch::run()),
        Command::Reset { yes } => commands::reset::run(yes),
    }
}

/// Commands that touch the remote run on a fresh runtime.
fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    rt.block_on(future)
}
