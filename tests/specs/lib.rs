// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for the CLI specs under `cli/`.
//!
//! The spec files are built as test targets of the `tether` crate so they
//! can locate the binary; this crate holds what they have in common.

use assert_cmd::Command;

/// Environment the specs must not inherit from the developer's shell.
pub const ISOLATED_ENV: [&str; 2] = ["TETHER_LOG", "TETHER_TOKEN"];

/// Nothing listens on the discard port, so every probe fails fast.
pub const UNREACHABLE_REMOTE: &str = "http://127.0.0.1:9";

/// Strip inherited settings from a `tether` command.
pub fn isolated(mut cmd: Command) -> Command {
    for var in ISOLATED_ENV {
        cmd.env_remove(var);
    }
    cmd
}
