// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations for the mutation queue.
//!
//! Every mutation made while the remote service is unreachable becomes a
//! [`PendingOp`]. Ops are:
//!
//! - Snapshots: the payload is copied at enqueue time, later edits to the
//!   record do not reach an op that is already queued
//! - Independent: two ops against the same record are replayed separately
//! - Replayable: delivery is at-least-once, the server overwrites on replay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::id_of;

/// The mutation an op replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

impl OpKind {
    /// All kinds, in declaration order.
    pub const ALL: [OpKind; 3] = [OpKind::Create, OpKind::Update, OpKind::Delete];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        }
    }

    /// HTTP method that replays this kind against a REST collection.
    pub fn http_method(&self) -> &'static str {
        match self {
            OpKind::Create => "POST",
            OpKind::Update => "PUT",
            OpKind::Delete => "DELETE",
        }
    }

    /// Whether the replayed request addresses a single record (`{path}/{id}`).
    pub fn targets_record(&self) -> bool {
        !matches!(self, OpKind::Create)
    }

    /// Whether the replayed request carries a JSON body.
    pub fn has_body(&self) -> bool {
        !matches!(self, OpKind::Delete)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(OpKind::Create),
            "update" => Ok(OpKind::Update),
            "delete" => Ok(OpKind::Delete),
            _ => Err(Error::InvalidOpKind(s.to_string())),
        }
    }
}

/// An operation about to be enqueued. The queue assigns the handle,
/// timestamp and attempt counter.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOp {
    pub kind: OpKind,
    pub entity_type: String,
    pub payload: Value,
}

impl NewOp {
    pub fn new(kind: OpKind, entity_type: impl Into<String>, payload: Value) -> Self {
        NewOp {
            kind,
            entity_type: entity_type.into(),
            payload,
        }
    }

    pub fn create(entity_type: impl Into<String>, payload: Value) -> Self {
        Self::new(OpKind::Create, entity_type, payload)
    }

    pub fn update(entity_type: impl Into<String>, payload: Value) -> Self {
        Self::new(OpKind::Update, entity_type, payload)
    }

    pub fn delete(entity_type: impl Into<String>, payload: Value) -> Self {
        Self::new(OpKind::Delete, entity_type, payload)
    }
}

/// A queued mutation not yet confirmed by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOp {
    /// Handle for this op (not the record id). Used to remove it once replayed.
    pub temp_id: String,
    pub kind: OpKind,
    pub entity_type: String,
    /// Record data as it was when the op was enqueued.
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
    /// Failed send attempts so far.
    pub attempts: u32,
}

impl PendingOp {
    /// The record id this op addresses, taken from the payload's `id` key.
    pub fn record_id(&self) -> Option<String> {
        id_of(&self.payload)
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
