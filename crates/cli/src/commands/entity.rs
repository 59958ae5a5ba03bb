// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record commands: create, update, delete and list.
//!
//! Each goes through the offline façade, so they succeed whether or not
//! the remote service is reachable.

use crate::cli::{FieldArgs, OutputFormat};
use crate::context::SyncContext;
use crate::display::{format_outcome, format_record_line};
use crate::error::{Error, Result};
use crate::sync::{ListOutcome, MutationOutcome, Transport};

use super::emit;

pub async fn create(entity: &str, fields: &FieldArgs, output: OutputFormat) -> Result<()> {
    let ctx = SyncContext::open().await?;
    let outcome = create_impl(&ctx, entity, fields).await?;
    print_outcome("Created", entity, &outcome, output)
}

pub async fn update(
    entity: &str,
    id: &str,
    fields: &FieldArgs,
    output: OutputFormat,
) -> Result<()> {
    let ctx = SyncContext::open().await?;
    let outcome = update_impl(&ctx, entity, id, fields).await?;
    print_outcome("Updated", entity, &outcome, output)
}

pub async fn delete(entity: &str, id: &str, output: OutputFormat) -> Result<()> {
    let ctx = SyncContext::open().await?;
    let outcome = delete_impl(&ctx, entity, id).await?;
    print_outcome("Deleted", entity, &outcome, output)
}

pub async fn list(entity: &str, output: OutputFormat) -> Result<()> {
    let ctx = SyncContext::open().await?;
    let outcome = list_impl(&ctx, entity).await?;
    emit(output, &outcome, || format_list(entity, &outcome))
}

pub(crate) async fn create_impl<T: Transport>(
    ctx: &SyncContext<T>,
    entity: &str,
    fields: &FieldArgs,
) -> Result<MutationOutcome> {
    let payload = fields.to_payload()?;
    ctx.facade().create(entity, payload).await
}

pub(crate) async fn update_impl<T: Transport>(
    ctx: &SyncContext<T>,
    entity: &str,
    id: &str,
    fields: &FieldArgs,
) -> Result<MutationOutcome> {
    if fields.is_empty() {
        return Err(Error::InvalidPayload {
            reason: "nothing to update; pass --field or --json".to_string(),
        });
    }
    let payload = fields.to_payload()?;
    ctx.facade().update(entity, id, payload).await
}

pub(crate) async fn delete_impl<T: Transport>(
    ctx: &SyncContext<T>,
    entity: &str,
    id: &str,
) -> Result<MutationOutcome> {
    ctx.facade().delete(entity, id).await
}

pub(crate) async fn list_impl<T: Transport>(
    ctx: &SyncContext<T>,
    entity: &str,
) -> Result<ListOutcome> {
    ctx.facade().list(entity).await
}

fn print_outcome(
    verb: &str,
    entity: &str,
    outcome: &MutationOutcome,
    output: OutputFormat,
) -> Result<()> {
    emit(output, outcome, || format_outcome(verb, entity, outcome))
}

pub(crate) fn format_list(entity: &str, outcome: &ListOutcome) -> String {
    let mut lines = Vec::with_capacity(outcome.records.len() + 1);
    if outcome.offline {
        lines.push("(offline: showing local copy)".to_string());
    }
    if outcome.records.is_empty() {
        lines.push(format!("No {} records", entity));
    }
    lines.extend(outcome.records.iter().map(format_record_line));
    lines.join("\n")
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
