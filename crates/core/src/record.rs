// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity records as held in the local store.
//!
//! A record is an opaque JSON object owned by its entity schema, tagged with
//! where it came from. Records created while offline carry a local-temporary
//! id (see [`TEMP_ID_PREFIX`]) until the server assigns a real one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Prefix marking a client-assigned record id.
///
/// Server ids never start with this prefix.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Returns true if `id` is a local-temporary record id.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Where a record's current contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Data returned by (or acknowledged by) the remote service.
    ServerConfirmed,
    /// Locally written data with a replay still queued or escalated.
    LocalPending,
}

impl Origin {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::ServerConfirmed => "server-confirmed",
            Origin::LocalPending => "local-pending",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "server-confirmed" => Ok(Origin::ServerConfirmed),
            "local-pending" => Ok(Origin::LocalPending),
            _ => Err(Error::InvalidOrigin(s.to_string())),
        }
    }
}

/// An entity instance (document, category, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// Entity payload. Always a JSON object; its `id` key mirrors [`Record::id`].
    pub fields: Value,
    pub origin: Origin,
    /// Display/ordering only. Never used to resolve conflicts.
    pub last_modified: DateTime<Utc>,
}

impl Record {
    /// Creates a record stamped with the current time.
    ///
    /// The `id` key inside `fields` is overwritten with `id` so the payload and
    /// the key never disagree.
    pub fn new(id: impl Into<String>, fields: Value, origin: Origin) -> Self {
        let id = id.into();
        let fields = with_id(fields, &id);
        Record {
            id,
            fields,
            origin,
            last_modified: Utc::now(),
        }
    }

    /// Builds a server-confirmed record from a JSON object returned by the
    /// remote service. Returns `None` when the object carries no usable `id`.
    pub fn from_server(value: Value) -> Option<Self> {
        let id = id_of(&value)?;
        Some(Record::new(id, value, Origin::ServerConfirmed))
    }

    /// True if this record was created offline and has not been re-keyed yet.
    pub fn is_temporary(&self) -> bool {
        is_temp_id(&self.id)
    }

    /// True if the record still has local changes the server has not seen.
    pub fn is_pending(&self) -> bool {
        self.origin == Origin::LocalPending
    }
}

/// Extracts the `id` key of a JSON object as a string.
///
/// Numeric ids (common for SQL-backed services) are rendered in decimal.
pub fn id_of(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns `fields` as an object with its `id` key set to `id`.
///
/// Non-object payloads are wrapped as `{ "id": ..., "value": ... }`.
pub fn with_id(fields: Value, id: &str) -> Value {
    let mut map = match fields {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    map.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(map)
}

/// Shallow-merges `patch` over `base`. Keys in `patch` win.
pub fn merge_fields(base: &Value, patch: &Value) -> Value {
    let mut merged = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Value::Object(patch) = patch {
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
