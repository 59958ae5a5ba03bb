// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tether-core operations.

use thiserror::Error;

/// All possible errors that can occur in tether-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("local store unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("invalid origin: '{0}'\n  hint: valid origins are: server-confirmed, local-pending")]
    InvalidOrigin(String),

    #[error("invalid operation kind: '{0}'\n  hint: valid kinds are: create, update, delete")]
    InvalidOpKind(String),

    #[error("invalid field name: '{0}'\n  hint: field names are ASCII letters, digits and underscores")]
    InvalidFieldName(String),

    #[error("invalid entity '{name}': {reason}")]
    InvalidEntity { name: String, reason: String },

    #[error("unknown entity type: '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' does not support {kind}")]
    UnsupportedOperation { entity: String, kind: String },

    #[error("{kind} on '{entity}' requires a record id")]
    MissingRecordId { entity: String, kind: String },
}

impl Error {
    /// True when the local durable store itself failed (disk, lock, corruption
    /// at the SQLite level). This is the only class surfaced to callers as a
    /// hard failure.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_) | Error::Io(_))
    }
}

/// A specialized Result type for tether-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
