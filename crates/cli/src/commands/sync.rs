// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tether_core::PendingOp;

use crate::context::SyncContext;
use crate::error::Result;
use crate::runner::{format_manual_review, format_report};
use crate::sync::{SyncEvent, SyncReport, Transport};

/// Replay the queue once. Fails with `Offline` if the remote is unreachable.
pub async fn run() -> Result<()> {
    let ctx = SyncContext::open().await?;
    let (report, escalated) = run_impl(&ctx).await?;

    for op in &escalated {
        eprintln!("warning: {}", format_manual_review(op));
    }
    if report.is_empty() {
        println!("Nothing to sync");
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}

/// One pass, plus the ops escalated during it.
pub(crate) async fn run_impl<T: Transport>(
    ctx: &SyncContext<T>,
) -> Result<(SyncReport, Vec<PendingOp>)> {
    let mut events = ctx.engine().subscribe();
    let report = ctx.engine().sync_now().await?;

    let mut escalated = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SyncEvent::ManualReviewNeeded(op) = event {
            escalated.push(op);
        }
    }
    Ok((report, escalated))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
