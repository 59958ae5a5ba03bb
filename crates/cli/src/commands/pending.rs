// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tether_core::{LocalStore, PendingOp};

use crate::cli::OutputFormat;
use crate::config::{find_work_dir, get_db_path};
use crate::display::format_op_line;
use crate::error::Result;

use super::emit;

/// Show the queue. Reads the store only; the remote is not contacted.
pub fn run(output: OutputFormat) -> Result<()> {
    let work_dir = find_work_dir()?;
    let store = LocalStore::open(&get_db_path(&work_dir))?;
    let ops = run_impl(&store)?;
    emit(output, &ops, || format_pending(&ops))
}

pub(crate) fn run_impl(store: &LocalStore) -> Result<Vec<PendingOp>> {
    Ok(store.list_pending()?)
}

pub(crate) fn format_pending(ops: &[PendingOp]) -> String {
    if ops.is_empty() {
        return "No pending operations".to_string();
    }
    let mut lines = vec![format!("{} pending operation(s), oldest first:", ops.len())];
    lines.extend(ops.iter().map(format_op_line));
    lines.join("\n")
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
