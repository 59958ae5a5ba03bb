// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod entity;
pub mod init;
pub mod pending;
pub mod reset;
pub mod status;
pub mod sync;
pub mod watch;

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Print `value` as pretty JSON, or its text rendering.
pub(crate) fn emit<V: Serialize>(
    output: OutputFormat,
    value: &V,
    text: impl FnOnce() -> String,
) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}
