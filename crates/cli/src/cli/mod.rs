// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

pub use args::FieldArgs;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "tether")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync for records backed by a REST service")]
#[command(
    long_about = "Offline-first sync for records backed by a REST service.\n\n\
    Changes made while the service is unreachable are stored locally, queued, \
    and replayed in order once the connection returns."
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize tether in the current directory
    #[command(after_help = "\
Examples:
  tether init                                 Local-only (every change is queued)
  tether init --remote http://localhost:5000  Sync against a REST service")]
    Init {
        /// Base URL of the remote service
        #[arg(long, value_name = "url")]
        remote: Option<String>,

        /// Directory to initialize (default: current directory)
        #[arg(long, value_name = "dir")]
        path: Option<String>,
    },

    /// Create a record
    #[command(after_help = "\
Examples:
  tether create document -f title=\"Harvest plan\" -f category_id=3
  tether create category --json '{\"name\": \"Citrus\"}'")]
    Create {
        /// Entity type (e.g. document, category)
        entity: String,

        #[command(flatten)]
        fields: FieldArgs,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Update a record (fields are merged over the stored record)
    Update {
        /// Entity type
        entity: String,

        /// Record id (server id or temp_ id)
        id: String,

        #[command(flatten)]
        fields: FieldArgs,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Delete a record
    Delete {
        /// Entity type
        entity: String,

        /// Record id (server id or temp_ id)
        id: String,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List records of an entity type
    List {
        /// Entity type
        entity: String,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queued operations
    Pending {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Replay queued operations now
    Sync,

    /// Show connectivity, queue and store statistics
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Stay running: sync whenever the connection returns
    Watch,

    /// Wipe all local records and queued operations
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}
