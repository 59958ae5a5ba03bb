// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tether_core::{LocalStore, StoreStats};
use tracing::info;

use crate::config::{find_work_dir, get_db_path};
use crate::error::{Error, Result};

/// Wipe records, queued ops and sync settings. Requires `--yes`.
pub fn run(yes: bool) -> Result<()> {
    let work_dir = find_work_dir()?;
    let store = LocalStore::open(&get_db_path(&work_dir))?;
    let cleared = run_impl(&store, yes)?;
    println!(
        "Cleared {} records and {} pending operations",
        cleared.total_records(),
        cleared.pending_ops
    );
    Ok(())
}

/// Returns what was there before the wipe.
pub(crate) fn run_impl(store: &LocalStore, yes: bool) -> Result<StoreStats> {
    if !yes {
        return Err(Error::ConfirmationRequired);
    }
    let before = store.stats()?;
    store.clear()?;
    info!(
        records = before.total_records(),
        pending = before.pending_ops,
        "local store cleared"
    );
    Ok(before)
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
