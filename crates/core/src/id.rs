// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side id generation.
//!
//! Two id spaces are generated locally:
//! - record ids for offline creates: `temp_{millis}_{hash}`
//! - queue handles for pending ops: `op_{millis}_{hash}`

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::record::TEMP_ID_PREFIX;

/// Prefix of pending-operation handles.
pub const OP_ID_PREFIX: &str = "op_";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an id from prefix, seed and timestamp.
/// Format: {prefix}{millis}_{hash} where hash is the first 8 hex chars of
/// SHA256(seed + timestamp + process sequence).
pub fn generate_id(prefix: &str, seed: &str, at: &DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}{}",
        seed,
        at.to_rfc3339(),
        at.timestamp_subsec_nanos(),
        seq
    );
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}{}_{}", prefix, at.timestamp_millis(), short_hash)
}

/// Generate an id that `exists` does not report as taken, appending an
/// incrementing suffix on collision.
pub fn generate_unique_id<F>(prefix: &str, seed: &str, at: &DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(prefix, seed, at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

/// Generate a local-temporary record id.
pub fn temp_record_id<F>(entity_type: &str, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    generate_unique_id(TEMP_ID_PREFIX, entity_type, &Utc::now(), exists)
}

/// Generate a pending-operation handle.
pub fn op_handle<F>(entity_type: &str, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    generate_unique_id(OP_ID_PREFIX, entity_type, &Utc::now(), exists)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
