// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use tether_core::StoreStats;

use crate::cli::OutputFormat;
use crate::context::SyncContext;
use crate::display::format_status;
use crate::error::Result;
use crate::sync::{lock_store, SyncStatus, Transport};

use super::emit;

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub remote: Option<String>,
    #[serde(flatten)]
    pub sync: SyncStatus,
    pub store: StoreStats,
}

pub async fn run(output: OutputFormat) -> Result<()> {
    let ctx = SyncContext::open().await?;
    let report = run_impl(&ctx)?;
    emit(output, &report, || {
        format_status(&report.sync, &report.store, report.remote.as_deref())
    })
}

pub(crate) fn run_impl<T: Transport>(ctx: &SyncContext<T>) -> Result<StatusReport> {
    let sync = ctx.engine().status()?;
    let store = lock_store(ctx.engine().store())?.stats()?;
    Ok(StatusReport {
        remote: ctx.config().remote_url().map(String::from),
        sync,
        store,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
