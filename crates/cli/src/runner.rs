// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The `tether watch` loop.
//!
//! Keeps the probe loop and the engine's connectivity listener running and
//! reports connectivity and sync events until `shutdown` resolves. Drains
//! are started by the listener on `restored`; a `lost` aborts the drain in
//! flight.

use std::future::Future;
use std::sync::Arc;

use tether_core::PendingOp;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::sync::{ConnectivityEvent, SyncEvent, SyncReport, Transport};

/// Run until `shutdown` resolves.
pub async fn watch<T, F>(ctx: &SyncContext<T>, shutdown: F) -> Result<()>
where
    T: Transport,
    F: Future<Output = ()>,
{
    let engine = ctx.engine();
    let settings = &ctx.config().sync;
    let cancel = CancellationToken::new();

    let mut connectivity = engine.monitor().subscribe();
    let mut sync_events = engine.subscribe();
    let listener = engine.spawn_connectivity_listener();
    let probe = engine.monitor().spawn_probe_loop(
        Arc::clone(ctx.transport()),
        settings.probe_interval(),
        cancel.clone(),
    );

    println!(
        "Watching ({}), {} pending",
        engine.monitor().state(),
        engine.status()?.pending
    );

    if engine.is_online() {
        let engine = Arc::clone(engine);
        let delay = settings.initial_sync_delay();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = engine.drain().await {
                        warn!(error = %e, "initial drain failed");
                    }
                }
            }
        });
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = connectivity.recv() => match event {
                Ok(ConnectivityEvent::Restored) => println!("Connection restored, syncing"),
                Ok(ConnectivityEvent::Lost) => println!("Connection lost, working offline"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "connectivity events lagged"),
                Err(RecvError::Closed) => break,
            },
            event = sync_events.recv() => match event {
                Ok(SyncEvent::Completed(report)) => println!("{}", format_report(&report)),
                Ok(SyncEvent::ManualReviewNeeded(op)) => {
                    eprintln!("warning: {}", format_manual_review(&op))
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "sync events lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("watch stopping");
    cancel.cancel();
    engine.abort();
    listener.abort();
    let _ = probe.await;
    Ok(())
}

/// One-line summary of a drain pass.
pub fn format_report(report: &SyncReport) -> String {
    let mut line = format!(
        "Synced: {} succeeded, {} failed",
        report.succeeded, report.failed
    );
    if report.escalated > 0 {
        line.push_str(&format!(", {} need manual review", report.escalated));
    }
    if report.aborted {
        line.push_str(" (aborted: connection lost)");
    }
    line
}

/// Why an op left the queue without being applied.
pub fn format_manual_review(op: &PendingOp) -> String {
    format!(
        "{} {} {}: {}",
        op.kind,
        op.entity_type,
        op.record_id().unwrap_or_else(|| "-".to_string()),
        Error::max_attempts(op)
    )
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
