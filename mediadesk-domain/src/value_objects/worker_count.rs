// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Worker pool size, clamped to a sane range.

use crate::error::MediadeskError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_WORKERS: usize = 1;
const MAX_WORKERS: usize = 16;
const DEFAULT_WORKERS: usize = 4;

/// The number of concurrent worker tasks in the processing pool.
///
/// Always within `[1, 16]`. Unlike file-size-adaptive sizing, this is a
/// flat operator-facing knob: the engine has no large in-memory buffers to
/// size around, so there is nothing to adapt to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WorkerCount(usize);

impl From<WorkerCount> for usize {
    fn from(value: WorkerCount) -> Self {
        value.0
    }
}

impl WorkerCount {
    /// Creates a `WorkerCount`, returning an error if `count` is outside
    /// `[1, 16]`.
    pub fn new(count: usize) -> Result<Self, MediadeskError> {
        if count < MIN_WORKERS || count > MAX_WORKERS {
            return Err(MediadeskError::InvalidConfiguration(format!(
                "numWorkers must be between {MIN_WORKERS} and {MAX_WORKERS}, got {count}"
            )));
        }
        Ok(Self(count))
    }

    /// The default worker count used when no override is supplied.
    pub fn default_count() -> Self {
        Self(DEFAULT_WORKERS)
    }

    /// The raw worker count.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::default_count()
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for WorkerCount {
    type Error = MediadeskError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_values_in_range() {
        assert!(WorkerCount::new(1).is_ok());
        assert!(WorkerCount::new(16).is_ok());
        assert!(WorkerCount::new(8).is_ok());
    }

    #[test]
    fn rejects_values_out_of_range() {
        assert!(WorkerCount::new(0).is_err());
        assert!(WorkerCount::new(17).is_err());
    }

    #[test]
    fn default_is_four() {
        assert_eq!(WorkerCount::default().get(), 4);
    }
}
