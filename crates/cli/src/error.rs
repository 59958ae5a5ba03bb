// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tether_core::PendingOp;
use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the tether library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'tether init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("local store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("remote call failed: {0}")]
    RemoteCallFailed(#[from] TransportError),

    #[error("operation {temp_id} failed {attempts} times and needs manual review")]
    MaxAttemptsExceeded { temp_id: String, attempts: u32 },

    #[error("offline: no connection to the remote service\n  hint: changes are queued and will sync when connectivity returns")]
    Offline,

    #[error("unknown entity type: '{0}'\n  hint: add an [entities.{0}] section to .tether/config.toml")]
    UnknownEntity(String),

    #[error("invalid entity configuration: {0}")]
    InvalidEntity(String),

    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("invalid field '{input}'\n  hint: use key=value")]
    InvalidField { input: String },

    #[error("refusing to reset without --yes")]
    ConfirmationRequired,

    #[error("corrupted data in local store: {0}")]
    CorruptedData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// The terminal error for an op that hit the attempt limit.
    pub fn max_attempts(op: &PendingOp) -> Self {
        Error::MaxAttemptsExceeded {
            temp_id: op.temp_id.clone(),
            attempts: op.attempts,
        }
    }

    /// True for failures of the local durable store, the one class the
    /// façade does not mask.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_) | Error::Io(_))
    }
}

/// A specialized Result type for tether operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<tether_core::Error> for Error {
    fn from(e: tether_core::Error) -> Self {
        match e {
            tether_core::Error::StorageUnavailable(e) => Error::StorageUnavailable(e.to_string()),
            tether_core::Error::Io(e) => Error::Io(e),
            tether_core::Error::Json(e) => Error::Json(e),
            tether_core::Error::CorruptedData(s) => Error::CorruptedData(s),
            tether_core::Error::UnknownEntity(name) => Error::UnknownEntity(name),
            e @ (tether_core::Error::InvalidEntity { .. }
            | tether_core::Error::UnsupportedOperation { .. }
            | tether_core::Error::MissingRecordId { .. }) => Error::InvalidEntity(e.to_string()),
            e @ (tether_core::Error::InvalidOrigin(_)
            | tether_core::Error::InvalidOpKind(_)
            | tether_core::Error::InvalidFieldName(_)) => Error::InvalidPayload {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
