// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Command-line surface: `run`, `resume`, `pause`, `stop`, `watch`, and the
//! `history` subcommands, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mediadesk_domain::ProcessingMode;

#[derive(Debug, Parser)]
#[command(name = "mediadesk", version, about = "Batch extractor for NewsML news-image packages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML or YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit debug-level logs.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new extraction run.
    Run {
        /// Local directory or http(s):// index to read NewsML documents from.
        #[arg(long)]
        root: String,

        /// CSV file to write extracted records to.
        #[arg(long)]
        output: String,

        /// Number of concurrent worker tasks (1-16, default 4).
        #[arg(long)]
        workers: Option<usize>,

        /// Scheduler pacing strategy.
        #[arg(long, value_enum)]
        mode: Option<ProcessingModeArg>,

        /// Work items per chunk, for `--mode chunked`.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Pause between chunks in `--mode chunked`.
        #[arg(long)]
        pause_between_chunks: bool,

        /// Seconds to pause between chunks when `--pause-between-chunks` is set.
        #[arg(long)]
        pause_duration: Option<u64>,

        /// Path to a JSON filter specification.
        #[arg(long)]
        filter: Option<PathBuf>,
    },

    /// Resume the most recently interrupted chunked run.
    Resume,

    /// Pause the active run after its current item/chunk completes.
    Pause,

    /// Stop the active run; it cannot be resumed.
    Stop,

    /// Watch a directory for newly-arriving XML/image pairs.
    Watch {
        /// Directory to watch recursively.
        #[arg(long)]
        root: String,

        /// CSV file to append accepted records to.
        #[arg(long)]
        output: String,

        /// Path to a JSON filter specification.
        #[arg(long)]
        filter: Option<PathBuf>,
    },

    /// Inspect or manage run history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List all recorded sessions, most recent first.
    List,
    /// Show one session's full record.
    Show {
        /// Session id (UUID).
        id: String,
    },
    /// Remove one session from history.
    Delete {
        /// Session id (UUID).
        id: String,
    },
    /// Remove every recorded session.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProcessingModeArg {
    Regular,
    Stream,
    Chunked,
}

impl From<ProcessingModeArg> for ProcessingMode {
    fn from(value: ProcessingModeArg) -> Self {
        match value {
            ProcessingModeArg::Regular => ProcessingMode::Regular,
            ProcessingModeArg::Stream => ProcessingMode::Stream,
            ProcessingModeArg::Chunked => ProcessingMode::Chunked,
        }
    }
}

/// Parses `std::env::args`, exiting the process on `--help`/`--version` or
/// a usage error (clap's standard behavior).
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_minimal_run_invocation() {
        let cli = Cli::parse_from(["mediadesk", "run", "--root", "/data", "--output", "/out.csv"]);
        match cli.command {
            Commands::Run { root, output, .. } => {
                assert_eq!(root, "/data");
                assert_eq!(output, "/out.csv");
            }
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn parses_history_show() {
        let cli = Cli::parse_from(["mediadesk", "history", "show", "abc-123"]);
        match cli.command {
            Commands::History { action: HistoryAction::Show { id } } => assert_eq!(id, "abc-123"),
            _ => panic!("expected History Show"),
        }
    }
}
