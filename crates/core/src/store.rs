// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable local store.
//!
//! The [`LocalStore`] holds three kinds of data:
//! - entity records, grouped into named collections (one per entity type)
//! - the pending-operation log (see [`crate::queue`])
//! - a small key/value settings table for sync bookkeeping
//!
//! Every write is committed with `synchronous = FULL` before the call
//! returns. Single calls are atomic; sequences of calls are not.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{Origin, Record};

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- Entity records, one logical collection per entity type
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    fields TEXT NOT NULL,
    origin TEXT NOT NULL,
    last_modified TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

-- Pending-operation log; seq preserves enqueue order
CREATE TABLE IF NOT EXISTS pending_ops (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    temp_id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    payload TEXT NOT NULL,
    enqueued_at TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0
);

-- Sync bookkeeping (last sync time, temp id mappings)
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_records_origin ON records(collection, origin);
CREATE INDEX IF NOT EXISTS idx_records_modified ON records(collection, last_modified);
CREATE INDEX IF NOT EXISTS idx_pending_entity ON pending_ops(entity_type);
"#;

/// Settings key holding the RFC3339 time of the last completed drain pass.
pub const LAST_SYNC_KEY: &str = "last_sync";

const ID_MAP_PREFIX: &str = "idmap:";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
pub(crate) fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
pub(crate) fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse a JSON document from the database.
pub(crate) fn parse_json(value: &str, column: &str) -> std::result::Result<Value, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid json in column '{column}': {e}"
            ))),
        )
    })
}

fn row_to_record(row: &Row<'_>) -> std::result::Result<Record, rusqlite::Error> {
    let fields: String = row.get("fields")?;
    let origin: String = row.get("origin")?;
    let last_modified: String = row.get("last_modified")?;
    Ok(Record {
        id: row.get("id")?,
        fields: parse_json(&fields, "fields")?,
        origin: parse_db(&origin, "origin")?,
        last_modified: parse_timestamp(&last_modified, "last_modified")?,
    })
}

/// Converts a JSON scalar to the value `json_extract` yields for it.
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn validate_field_name(field: &str) -> Result<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFieldName(field.to_string()))
    }
}

/// Summary counts for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Record count per collection.
    pub records: BTreeMap<String, usize>,
    /// Records still carrying unconfirmed local changes.
    pub local_pending: usize,
    /// Entries in the pending-operation log.
    pub pending_ops: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

impl StoreStats {
    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }
}

/// Durable local store with record collections, the mutation log and settings.
pub struct LocalStore {
    pub(crate) conn: Connection,
}

impl LocalStore {
    /// Open the store at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL for concurrent readers, FULL so an acknowledged write survives a crash
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let store = LocalStore { conn };
        store.conn.execute_batch(SCHEMA)?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(LocalStore { conn })
    }

    // -- records ------------------------------------------------------------

    /// Upsert a record into a collection, keyed by its id.
    ///
    /// Replaying the same record only overwrites it.
    pub fn put(&self, collection: &str, record: &Record) -> Result<()> {
        self.conn.execute(
            "INSERT INTO records (collection, id, fields, origin, last_modified)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(collection, id) DO UPDATE SET
                 fields = excluded.fields,
                 origin = excluded.origin,
                 last_modified = excluded.last_modified",
            params![
                collection,
                record.id,
                serde_json::to_string(&record.fields)?,
                record.origin.as_str(),
                record.last_modified.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Upsert many records in one transaction.
    pub fn put_all(&self, collection: &str, records: &[Record]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, id, fields, origin, last_modified)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(collection, id) DO UPDATE SET
                     fields = excluded.fields,
                     origin = excluded.origin,
                     last_modified = excluded.last_modified",
            )?;
            for record in records {
                stmt.execute(params![
                    collection,
                    record.id,
                    serde_json::to_string(&record.fields)?,
                    record.origin.as_str(),
                    record.last_modified.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All records of a collection, oldest modification first.
    pub fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fields, origin, last_modified FROM records
             WHERE collection = ?1
             ORDER BY last_modified, id",
        )?;
        let records = stmt
            .query_map([collection], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// A record by id, or `None` if the collection has no such key.
    pub fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, fields, origin, last_modified FROM records
                 WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Remove a record. Removing a missing id is a no-op.
    ///
    /// Returns whether a row was removed.
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(removed > 0)
    }

    /// Records whose JSON field `field` equals `value`.
    pub fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        validate_field_name(field)?;
        let path = format!("$.{field}");
        let mut stmt = self.conn.prepare(
            "SELECT id, fields, origin, last_modified FROM records
             WHERE collection = ?1 AND json_extract(fields, ?2) IS ?3
             ORDER BY last_modified, id",
        )?;
        let records = stmt
            .query_map(params![collection, path, json_to_sql(value)], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Records of a collection with the given origin.
    pub fn list_by_origin(&self, collection: &str, origin: Origin) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fields, origin, last_modified FROM records
             WHERE collection = ?1 AND origin = ?2
             ORDER BY last_modified, id",
        )?;
        let records = stmt
            .query_map(params![collection, origin.as_str()], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Names of collections holding at least one record.
    pub fn collections(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT collection FROM records ORDER BY collection")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Wipe records, the pending-operation log and settings.
    ///
    /// Reserved for explicit user-triggered resets; the sync path never calls it.
    pub fn clear(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM records;
             DELETE FROM pending_ops;
             DELETE FROM settings;",
        )?;
        tx.commit()?;
        Ok(())
    }

    // -- settings -----------------------------------------------------------

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Time of the last completed drain pass.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        match self.get_setting(LAST_SYNC_KEY)? {
            None => Ok(None),
            Some(value) => DateTime::parse_from_rfc3339(&value)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| {
                    let msg = format!("invalid timestamp '{value}' in setting '{LAST_SYNC_KEY}'");
                    Error::CorruptedData(msg)
                }),
        }
    }

    pub fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.set_setting(LAST_SYNC_KEY, &at.to_rfc3339())
    }

    /// Remember the server id assigned to a record created offline.
    pub fn map_record_id(&self, collection: &str, temp_id: &str, server_id: &str) -> Result<()> {
        self.set_setting(&format!("{ID_MAP_PREFIX}{collection}:{temp_id}"), server_id)
    }

    /// Translate a local-temporary id to its server id, if one was recorded.
    ///
    /// Ids without a mapping are returned unchanged.
    pub fn resolve_record_id(&self, collection: &str, id: &str) -> Result<String> {
        let mapped = self.get_setting(&format!("{ID_MAP_PREFIX}{collection}:{id}"))?;
        Ok(mapped.unwrap_or_else(|| id.to_string()))
    }

    // -- stats --------------------------------------------------------------

    pub fn stats(&self) -> Result<StoreStats> {
        let mut records = BTreeMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT collection, COUNT(*) FROM records GROUP BY collection")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (collection, count) = row?;
                records.insert(collection, usize::try_from(count).unwrap_or(0));
            }
        }

        let local_pending: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE origin = ?1",
            [Origin::LocalPending.as_str()],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            records,
            local_pending: usize::try_from(local_pending).unwrap_or(0),
            pending_ops: self.pending_count()?,
            last_sync: self.last_sync()?,
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
