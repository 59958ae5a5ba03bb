// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Record fields given on the command line.
#[derive(Args, Clone, Debug, Default)]
pub struct FieldArgs {
    /// Set a field (repeatable). Values that parse as JSON keep their type
    #[arg(short = 'f', long = "field", value_name = "key=value")]
    pub field: Vec<String>,

    /// Start from a JSON object; --field entries are applied on top
    #[arg(long, value_name = "json")]
    pub json: Option<String>,
}

impl FieldArgs {
    /// Build the payload object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] if `--json` is not an object and
    /// [`Error::InvalidField`] for a `--field` without `=` or with an empty key.
    pub fn to_payload(&self) -> Result<Value> {
        let mut map = match &self.json {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(Error::InvalidPayload {
                        reason: "--json must be a JSON object".to_string(),
                    })
                }
                Err(e) => {
                    return Err(Error::InvalidPayload {
                        reason: e.to_string(),
                    })
                }
            },
            None => Map::new(),
        };

        for entry in &self.field {
            let (key, raw) = entry.split_once('=').ok_or_else(|| Error::InvalidField {
                input: entry.clone(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::InvalidField {
                    input: entry.clone(),
                });
            }
            map.insert(key.to_string(), parse_field_value(raw));
        }
        Ok(Value::Object(map))
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty() && self.json.is_none()
    }
}

/// `3` → number, `true` → bool, `null` → null, anything else → string.
fn parse_field_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
