// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tracing::warn;

use crate::context::SyncContext;
use crate::error::Result;
use crate::runner;

/// Run the watch loop until Ctrl-C.
pub async fn run() -> Result<()> {
    let ctx = SyncContext::open().await?;
    runner::watch(&ctx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}
