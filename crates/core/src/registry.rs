// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity-type registry.
//!
//! Maps an entity tag (`document`, `category`, ...) to the REST collection
//! that owns it and the mutations it accepts. The registry is validated when
//! entries are registered so a bad mapping fails at startup, not mid-drain.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::op::OpKind;

/// Where an entity type lives on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Collection path, e.g. `/api/documents`. Leading slash, no trailing slash.
    pub path: String,
    /// Mutations the remote collection accepts.
    pub operations: Vec<OpKind>,
}

impl EndpointDescriptor {
    /// Descriptor accepting every mutation kind.
    pub fn new(path: impl Into<String>) -> Self {
        EndpointDescriptor {
            path: path.into(),
            operations: OpKind::ALL.to_vec(),
        }
    }

    /// Restricts the accepted mutation kinds.
    pub fn with_operations(mut self, operations: Vec<OpKind>) -> Self {
        self.operations = operations;
        self
    }

    pub fn supports(&self, kind: OpKind) -> bool {
        self.operations.contains(&kind)
    }
}

/// A resolved remote call for one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: OpKind,
    /// Collection path.
    pub path: String,
    /// Record id appended as the last path segment, for update/delete.
    pub record_id: Option<String>,
}

/// Registry of entity types known to the engine.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: BTreeMap<String, EndpointDescriptor>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the two stock entity types.
    pub fn with_defaults() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "document".to_string(),
            EndpointDescriptor::new("/api/documents"),
        );
        entries.insert(
            "category".to_string(),
            EndpointDescriptor::new("/api/categories"),
        );
        EntityRegistry { entries }
    }

    /// Registers an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntity`] for a malformed name or path, an
    /// empty operation list, or a name that is already registered.
    pub fn register(&mut self, name: &str, descriptor: EndpointDescriptor) -> Result<()> {
        validate_name(name)?;
        validate_path(name, &descriptor.path)?;
        if descriptor.operations.is_empty() {
            return Err(invalid(name, "no operations enabled"));
        }
        if self.entries.contains_key(name) {
            return Err(invalid(name, "registered twice"));
        }
        self.entries.insert(name.to_string(), descriptor);
        Ok(())
    }

    /// Looks up an entity type.
    pub fn get(&self, name: &str) -> Result<&EndpointDescriptor> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered entity names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the remote call for `kind` on `entity`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownEntity`] if the entity is not registered
    /// - [`Error::UnsupportedOperation`] if the endpoint does not accept `kind`
    /// - [`Error::MissingRecordId`] if `kind` addresses a record and no id was given
    pub fn route(&self, entity: &str, kind: OpKind, record_id: Option<&str>) -> Result<Route> {
        let descriptor = self.get(entity)?;
        if !descriptor.supports(kind) {
            return Err(Error::UnsupportedOperation {
                entity: entity.to_string(),
                kind: kind.to_string(),
            });
        }
        let record_id = if kind.targets_record() {
            match record_id {
                Some(id) if !id.is_empty() => Some(id.to_string()),
                _ => {
                    return Err(Error::MissingRecordId {
                        entity: entity.to_string(),
                        kind: kind.to_string(),
                    })
                }
            }
        } else {
            None
        };
        Ok(Route {
            kind,
            path: descriptor.path.clone(),
            record_id,
        })
    }

    /// Collection path for list reads.
    pub fn collection_path(&self, entity: &str) -> Result<&str> {
        Ok(self.get(entity)?.path.as_str())
    }
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidEntity {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Entity names double as local collection names: lowercase ASCII,
/// digits, `-` and `_`.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(invalid(
            name,
            "name must be lowercase letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}

fn validate_path(name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(invalid(name, "path must start with '/'"));
    }
    if path.len() > 1 && path.ends_with('/') {
        return Err(invalid(name, "path must not end with '/'"));
    }
    if path.contains("//") || path.contains('?') || path.contains('#') {
        return Err(invalid(name, "path must be a plain collection path"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
