// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The event taxonomy the scheduler emits as `impl Stream<Item =
//! ProgressEvent>`. Serializing an event to `data: <json>\n\n` and writing
//! it to a socket is the responsibility of whatever HTTP layer embeds this
//! engine; this crate never touches a socket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Stats;

/// A single, timestamped progress/control event.
///
/// `#[serde(tag = "type")]` gives every variant a `type` discriminant
/// field matching the taxonomy named in the external interface: `start,
/// log, error, progress, chunk_start, chunk_complete, pause_countdown,
/// paused, shutdown, complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Start {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Log {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Progress {
        percentage: f64,
        total: u64,
        processed: u64,
        successful: u64,
        errors: u64,
        filtered: u64,
        moved: u64,
        current_chunk: Option<usize>,
        total_chunks: Option<usize>,
        timestamp: DateTime<Utc>,
    },
    ChunkStart {
        index: usize,
        total: usize,
        size: usize,
        timestamp: DateTime<Utc>,
    },
    ChunkComplete {
        index: usize,
        total: usize,
        timestamp: DateTime<Utc>,
    },
    PauseCountdown {
        remaining_secs: u64,
        timestamp: DateTime<Utc>,
    },
    Paused {
        can_resume: bool,
        timestamp: DateTime<Utc>,
    },
    Shutdown {
        can_resume: bool,
        stats: Stats,
        timestamp: DateTime<Utc>,
    },
    Complete {
        stats: Stats,
        output_file: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ProgressEvent {
    /// The stable `type` discriminant, matching the external interface's
    /// event taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Log { .. } => "log",
            Self::Error { .. } => "error",
            Self::Progress { .. } => "progress",
            Self::ChunkStart { .. } => "chunk_start",
            Self::ChunkComplete { .. } => "chunk_complete",
            Self::PauseCountdown { .. } => "pause_countdown",
            Self::Paused { .. } => "paused",
            Self::Shutdown { .. } => "shutdown",
            Self::Complete { .. } => "complete",
        }
    }

    /// Builds a `progress` event from a stats snapshot.
    pub fn progress(
        stats: &Stats,
        current_chunk: Option<usize>,
        total_chunks: Option<usize>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let percentage = if stats.total_files == 0 {
            0.0
        } else {
            (stats.processed_files as f64 / stats.total_files as f64) * 100.0
        };
        Self::Progress {
            percentage,
            total: stats.total_files,
            processed: stats.processed_files,
            successful: stats.successful_files,
            errors: stats.error_files,
            filtered: stats.filtered_files,
            moved: stats.moved_files,
            current_chunk,
            total_chunks,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_taxonomy_name() {
        let event = ProgressEvent::Start {
            message: "begin".into(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.kind(), "start");
    }

    #[test]
    fn progress_percentage_handles_zero_total() {
        let stats = Stats::new();
        let event = ProgressEvent::progress(&stats, None, None, Utc::now());
        match event {
            ProgressEvent::Progress { percentage, .. } => assert_eq!(percentage, 0.0),
            _ => panic!("expected Progress variant"),
        }
    }

    #[test]
    fn progress_percentage_computed_from_stats() {
        let mut stats = Stats::new();
        stats.total_files = 4;
        stats.record_success();
        stats.record_success();
        let event = ProgressEvent::progress(&stats, None, None, Utc::now());
        match event {
            ProgressEvent::Progress { percentage, .. } => assert_eq!(percentage, 50.0),
            _ => panic!("expected Progress variant"),
        }
    }
}
