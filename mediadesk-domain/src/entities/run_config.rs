// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The validated, immutable configuration for one run. Assembled by the
//! layered config loader (defaults -> file -> env -> CLI) and frozen here
//! before the scheduler ever sees it.

use serde::{Deserialize, Serialize};

use super::filter_spec::FilterSpec;
use crate::error::MediadeskError;
use crate::value_objects::{ChunkSize, WorkerCount};

/// The scheduler pacing strategy selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Fire every task at once, gated only by the worker semaphore.
    Regular,
    /// Continuously dispatch as slots free up (the default).
    Stream,
    /// Process in bounded chunks, optionally pausing between them.
    Chunked,
}

impl Default for ProcessingMode {
    fn default() -> Self {
        Self::Stream
    }
}

/// The fully-resolved, validated configuration for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub root_dir: String,
    pub output_file: String,
    pub output_folder: Option<String>,
    pub num_workers: WorkerCount,
    pub verbose: bool,
    pub processing_mode: ProcessingMode,
    pub chunk_size: ChunkSize,
    pub pause_between_chunks: bool,
    pub pause_duration_secs: u64,
    pub filter_config: FilterSpec,
}

impl RunConfig {
    /// Validates cross-field constraints not already enforced by the
    /// component value objects: a non-empty root and output path, and a
    /// chunk configuration consistent with `processingMode`.
    pub fn validate(&self) -> Result<(), MediadeskError> {
        if self.root_dir.trim().is_empty() {
            return Err(MediadeskError::InvalidConfiguration(
                "rootDir must not be empty".to_string(),
            ));
        }
        if self.output_file.trim().is_empty() {
            return Err(MediadeskError::InvalidConfiguration(
                "outputFile must not be empty".to_string(),
            ));
        }
        if self.pause_between_chunks && self.processing_mode != ProcessingMode::Chunked {
            return Err(MediadeskError::InvalidConfiguration(
                "pauseBetweenChunks requires processingMode=chunked".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            root_dir: "/data/root".to_string(),
            output_file: "/data/out.csv".to_string(),
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
    fn rejects_empty_root() {
        let mut config = base_config();
        config.root_dir = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_pause_between_chunks_without_chunked_mode() {
        let mut config = base_config();
        config.pause_between_chunks = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_valid_chunked_config() {
        let mut config = base_config();
        config.processing_mode = ProcessingMode::Chunked;
        config.pause_between_chunks = true;
        assert!(config.validate().is_ok());
    }
}
