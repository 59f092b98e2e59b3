// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The resume anchor for chunked-mode runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run_config::RunConfig;
use super::stats::Stats;
use crate::value_objects::{ChunkSize, SessionId};

/// Durable state for a chunked run, written after every chunk completes.
/// This file is the sole source of truth for resuming a chunked run: the
/// full enumerated `xmlFiles` list plus `currentChunk` together determine
/// exactly which items remain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkedProcessingState {
    pub session_id: SessionId,
    pub config: RunConfig,
    pub stats: Stats,
    /// The next chunk index to process, zero-based.
    pub current_chunk: usize,
    pub total_chunks: usize,
    pub chunk_size: ChunkSize,
    /// The full, stable enumeration this run was scheduled against.
    pub xml_files: Vec<String>,
    pub output_path: String,
    pub start_time: DateTime<Utc>,
    pub pause_time: Option<DateTime<Utc>>,
}

impl ChunkedProcessingState {
    pub fn new(
        session_id: SessionId,
        config: RunConfig,
        chunk_size: ChunkSize,
        xml_files: Vec<String>,
        output_path: String,
        now: DateTime<Utc>,
    ) -> Self {
        let total_chunks = chunk_size.chunk_count(xml_files.len());
        Self {
            session_id,
            config,
            stats: Stats::new(),
            current_chunk: 0,
            total_chunks,
            chunk_size,
            xml_files,
            output_path,
            start_time: now,
            pause_time: None,
        }
    }

    /// Whether every chunk has been processed.
    pub fn is_complete(&self) -> bool {
        self.current_chunk >= self.total_chunks
    }

    /// The slice of `xmlFiles` belonging to the next unprocessed chunk.
    pub fn next_chunk(&self) -> &[String] {
        if self.is_complete() {
            return &[];
        }
        let start = self.current_chunk * self.chunk_size.get();
        let end = (start + self.chunk_size.get()).min(self.xml_files.len());
        &self.xml_files[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FilterSpec, ProcessingMode};
    use crate::value_objects::WorkerCount;

    fn config() -> RunConfig {
        RunConfig {
            root_dir: "/root".to_string(),
            output_file: "/out.csv".to_string(),
            output_folder: None,
            num_workers: WorkerCount::default(),
            verbose: false,
            processing_mode: ProcessingMode::Chunked,
            chunk_size: ChunkSize::new(2).unwrap(),
            pause_between_chunks: false,
            pause_duration_secs: 0,
            filter_config: FilterSpec::disabled(),
        }
    }

    #[test]
    fn total_chunks_rounds_up() {
        let files: Vec<String> = (0..5).map(|i| format!("f{i}.xml")).collect();
        let state = ChunkedProcessingState::new(
            SessionId::new(),
            config(),
            ChunkSize::new(2).unwrap(),
            files,
            "/out.csv".to_string(),
            Utc::now(),
        );
        assert_eq!(state.total_chunks, 3);
    }

    #[test]
    fn next_chunk_advances_through_slices() {
        let files: Vec<String> = (0..5).map(|i| format!("f{i}.xml")).collect();
        let mut state = ChunkedProcessingState::new(
            SessionId::new(),
            config(),
            ChunkSize::new(2).unwrap(),
            files,
            "/out.csv".to_string(),
            Utc::now(),
        );
        assert_eq!(state.next_chunk(), &["f0.xml", "f1.xml"]);
        state.current_chunk = 2;
        assert_eq!(state.next_chunk(), &["f4.xml"]);
        state.current_chunk = 3;
        assert!(state.is_complete());
        assert!(state.next_chunk().is_empty());
    }
}
