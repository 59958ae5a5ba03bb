// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync lifecycle notifications.

use serde::Serialize;
use tether_core::PendingOp;

/// Outcome counts of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Ops replayed and removed from the queue.
    pub succeeded: usize,
    /// Ops whose send failed this pass, escalated ones included.
    pub failed: usize,
    /// Ops removed from retry and handed to manual review.
    pub escalated: usize,
    /// True if connectivity was lost before the pass finished.
    pub aborted: bool,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.succeeded == 0 && self.failed == 0
    }
}

/// Broadcast by the engine. Fire-and-forget; a slow subscriber may lag.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A drain pass over a non-empty queue finished.
    Completed(SyncReport),
    /// An op reached the attempt limit and was removed from the queue.
    ManualReviewNeeded(PendingOp),
}
