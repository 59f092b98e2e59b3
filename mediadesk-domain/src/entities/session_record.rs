// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The durable record of one run, from creation through its terminal
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run_config::RunConfig;
use super::stats::Stats;
use crate::value_objects::SessionId;

/// The lifecycle status of a [`SessionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Paused,
    Completed,
    Failed,
    Interrupted,
}

/// A durable snapshot of one run: its frozen configuration, live progress,
/// and (once finished) its outcome. Exactly one session may be `Running`
/// or `Paused` at a time (the current-session invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    /// A frozen snapshot of the run's inputs, taken at session creation.
    pub config: RunConfig,
    pub progress: Stats,
    /// Origins already processed, used to compute the resume frontier.
    pub processed_files_list: Vec<String>,
    pub results: Option<SessionResults>,
}

/// The outcome of a completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResults {
    pub output_path: String,
}

impl SessionRecord {
    pub fn new(config: RunConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            start_time: now,
            end_time: None,
            status: SessionStatus::Running,
            config,
            progress: Stats::new(),
            processed_files_list: Vec::new(),
            results: None,
        }
    }

    /// Whether this session can currently be paused, stopped, or resumed.
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Running | SessionStatus::Paused)
    }

    pub fn finish(&mut self, status: SessionStatus, now: DateTime<Utc>, output_path: Option<String>) {
        self.status = status;
        self.end_time = Some(now);
        if let Some(output_path) = output_path {
            self.results = Some(SessionResults { output_path });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FilterSpec, ProcessingMode};
    use crate::value_objects::{ChunkSize, WorkerCount};

    fn config() -> RunConfig {
        RunConfig {
            root_dir: "/root".to_string(),
            output_file: "/out.csv".to_string(),
            output_folder: None,
            num_workers: WorkerCount::default(),
            verbose: false,
            processing_mode: ProcessingMode::Stream,
            chunk_size: ChunkSize::default(),
            pause_between_chunks: false,
            pause_duration_secs: 0,
            filter_config: FilterSpec::disabled(),
        }
    }

    #[test]
    fn new_session_is_running_and_active() {
        let session = SessionRecord::new(config(), Utc::now());
        assert_eq!(session.status, SessionStatus::Running);
        assert!(session.is_active());
    }

    #[test]
    fn finished_session_is_inactive() {
        let mut session = SessionRecord::new(config(), Utc::now());
        session.finish(SessionStatus::Completed, Utc::now(), Some("/out.csv".into()));
        assert!(!session.is_active());
        assert!(session.results.is_some());
    }
}
