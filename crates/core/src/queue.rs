// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation queue: the pending-operation log inside the local store.
//!
//! Entries come back in enqueue order (the log's autoincrement key). There is
//! no per-record ordering beyond that and no coalescing of ops that target
//! the same record.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::Result;
use crate::id::op_handle;
use crate::op::{NewOp, PendingOp};
use crate::store::{parse_db, parse_json, parse_timestamp, LocalStore};

fn row_to_op(row: &Row<'_>) -> std::result::Result<PendingOp, rusqlite::Error> {
    let kind: String = row.get("kind")?;
    let payload: String = row.get("payload")?;
    let enqueued_at: String = row.get("enqueued_at")?;
    let attempts: i64 = row.get("attempts")?;
    Ok(PendingOp {
        temp_id: row.get("temp_id")?,
        kind: parse_db(&kind, "kind")?,
        entity_type: row.get("entity_type")?,
        payload: parse_json(&payload, "payload")?,
        enqueued_at: parse_timestamp(&enqueued_at, "enqueued_at")?,
        attempts: u32::try_from(attempts).unwrap_or(0),
    })
}

impl LocalStore {
    /// Append an op to the log with `attempts = 0`.
    ///
    /// Returns the op's handle (`temp_id`) so the caller can correlate it later.
    pub fn enqueue(&self, op: NewOp) -> Result<String> {
        let temp_id = op_handle(&op.entity_type, |candidate| {
            self.pending_exists(candidate).unwrap_or(false)
        });
        self.conn.execute(
            "INSERT INTO pending_ops (temp_id, kind, entity_type, payload, enqueued_at, attempts)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                temp_id,
                op.kind.as_str(),
                op.entity_type,
                serde_json::to_string(&op.payload)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(temp_id)
    }

    /// All pending ops in enqueue order.
    pub fn list_pending(&self) -> Result<Vec<PendingOp>> {
        let mut stmt = self.conn.prepare(
            "SELECT temp_id, kind, entity_type, payload, enqueued_at, attempts
             FROM pending_ops ORDER BY seq",
        )?;
        let ops = stmt
            .query_map([], row_to_op)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    /// Pending ops for one entity type, in enqueue order.
    pub fn pending_for_entity(&self, entity_type: &str) -> Result<Vec<PendingOp>> {
        let mut stmt = self.conn.prepare(
            "SELECT temp_id, kind, entity_type, payload, enqueued_at, attempts
             FROM pending_ops WHERE entity_type = ?1 ORDER BY seq",
        )?;
        let ops = stmt
            .query_map([entity_type], row_to_op)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    pub fn get_pending(&self, temp_id: &str) -> Result<Option<PendingOp>> {
        let op = self
            .conn
            .query_row(
                "SELECT temp_id, kind, entity_type, payload, enqueued_at, attempts
                 FROM pending_ops WHERE temp_id = ?1",
                [temp_id],
                row_to_op,
            )
            .optional()?;
        Ok(op)
    }

    fn pending_exists(&self, temp_id: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pending_ops WHERE temp_id = ?1)",
            [temp_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Drop an op from the log. Removing a missing handle is a no-op.
    pub fn remove_pending(&self, temp_id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM pending_ops WHERE temp_id = ?1", [temp_id])?;
        Ok(())
    }

    /// Bump an op's attempt counter and return the new count.
    ///
    /// Read-modify-write in two statements: a crash in between under-counts
    /// by one. Returns `None` if the op is no longer queued.
    pub fn increment_attempts(&self, temp_id: &str) -> Result<Option<u32>> {
        let current: Option<i64> = self
            .conn
            .query_row(
                "SELECT attempts FROM pending_ops WHERE temp_id = ?1",
                [temp_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(None);
        };
        let next = current.saturating_add(1);
        self.conn.execute(
            "UPDATE pending_ops SET attempts = ?1 WHERE temp_id = ?2",
            params![next, temp_id],
        )?;
        Ok(Some(u32::try_from(next).unwrap_or(u32::MAX)))
    }

    /// Number of queued ops.
    pub fn pending_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pending_ops", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// True if any queued op of `entity_type` addresses `record_id`.
    pub fn has_pending_for(&self, entity_type: &str, record_id: &str) -> Result<bool> {
        Ok(self
            .pending_for_entity(entity_type)?
            .iter()
            .any(|op| op.record_id().as_deref() == Some(record_id)))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
