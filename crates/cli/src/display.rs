// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;
use tether_core::{PendingOp, Record, StoreStats};

use crate::sync::{MutationOutcome, SyncStatus};

/// Maximum width of the field summary in list output.
const SUMMARY_WIDTH: usize = 60;

/// Fields tried, in order, for a one-line record label.
const LABEL_FIELDS: [&str; 3] = ["title", "name", "nombre"];

/// Short human label for a record's fields.
///
/// Uses the first string-valued label field, else the compact JSON of the
/// remaining fields.
pub fn summarize_fields(fields: &Value) -> String {
    for key in LABEL_FIELDS {
        if let Some(label) = fields.get(key).and_then(Value::as_str) {
            return truncate(label, SUMMARY_WIDTH);
        }
    }
    let rest = match fields {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("id");
            Value::Object(map)
        }
        other => other.clone(),
    };
    truncate(&rest.to_string(), SUMMARY_WIDTH)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

/// `- [id] label` with a `(pending)` marker for unsynced records.
pub fn format_record_line(record: &Record) -> String {
    let marker = if record.is_pending() { " (pending)" } else { "" };
    format!(
        "- [{}] {}{}",
        record.id,
        summarize_fields(&record.fields),
        marker
    )
}

/// `op_… create document/temp_… attempts=0`.
pub fn format_op_line(op: &PendingOp) -> String {
    let target = match op.record_id() {
        Some(id) => format!("{}/{}", op.entity_type, id),
        None => op.entity_type.clone(),
    };
    format!(
        "{}  {:<6} {}  attempts={}  queued {}",
        op.temp_id,
        op.kind.as_str(),
        target,
        op.attempts,
        op.enqueued_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Text result of a create/update/delete.
pub fn format_outcome(verb: &str, entity: &str, outcome: &MutationOutcome) -> String {
    let id = outcome
        .data
        .get("id")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "-".to_string());
    match &outcome.message {
        Some(message) if outcome.offline => {
            format!("{} {} {} ({})", verb, entity, id, message)
        }
        _ => format!("{} {} {}", verb, entity, id),
    }
}

/// Multi-line status block.
pub fn format_status(status: &SyncStatus, stats: &StoreStats, remote: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Remote: {}\n", remote.unwrap_or("(none)")));
    out.push_str(&format!("Connectivity: {}\n", status.connectivity));
    out.push_str(&format!("Pending operations: {}\n", status.pending));
    out.push_str(&format!(
        "Records: {} ({} with unsynced changes)\n",
        stats.total_records(),
        stats.local_pending
    ));
    for (collection, count) in &stats.records {
        out.push_str(&format!("  {}: {}\n", collection, count));
    }
    match stats.last_sync {
        Some(at) => out.push_str(&format!(
            "Last sync: {}",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => out.push_str("Last sync: never"),
    }
    out
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
