// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Run-wide, monotonically non-decreasing counters.

use serde::{Deserialize, Serialize};

/// Aggregate counters for a run. Every field is monotonic non-decreasing
/// over the lifetime of a run: nothing here is ever decremented, only
/// reset at the start of a fresh (non-resumed) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_files: u64,
    pub processed_files: u64,
    /// A record was produced for this file (whether or not it was
    /// ultimately accepted by the filter).
    pub successful_files: u64,
    pub error_files: u64,
    /// The number of rows actually appended to the CSV sink.
    pub records_written: u64,
    /// Records that were produced but rejected by an enabled filter
    /// (`passed == false`).
    pub filtered_files: u64,
    pub moved_files: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invariant P1: `processedFiles == successfulFiles + errorFiles`.
    pub fn is_consistent(&self) -> bool {
        self.processed_files == self.successful_files + self.error_files
    }

    pub fn record_success(&mut self) {
        self.processed_files += 1;
        self.successful_files += 1;
    }

    pub fn record_error(&mut self) {
        self.processed_files += 1;
        self.error_files += 1;
    }

    pub fn record_filtered(&mut self) {
        self.filtered_files += 1;
    }

    pub fn record_written(&mut self) {
        self.records_written += 1;
    }

    pub fn record_moved(&mut self) {
        self.moved_files += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_stats_are_consistent() {
        assert!(Stats::new().is_consistent());
    }

    #[test]
    fn success_and_error_keep_processed_in_sync() {
        let mut stats = Stats::new();
        stats.record_success();
        stats.record_error();
        assert_eq!(stats.processed_files, 2);
        assert!(stats.is_consistent());
    }
}
