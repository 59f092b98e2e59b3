// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The number of work items processed per chunk in chunked mode.

use crate::error::MediadeskError;
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_CHUNK_SIZE: usize = 500;

/// A validated chunk size for the chunked pacing strategy. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ChunkSize(usize);

impl From<ChunkSize> for usize {
    fn from(value: ChunkSize) -> Self {
        value.0
    }
}

impl ChunkSize {
    /// Creates a `ChunkSize`, rejecting zero.
    pub fn new(size: usize) -> Result<Self, MediadeskError> {
        if size == 0 {
            return Err(MediadeskError::InvalidConfiguration(
                "chunkSize must be at least 1".to_string(),
            ));
        }
        Ok(Self(size))
    }

    /// The default chunk size used when chunked mode is selected without
    /// an explicit override.
    pub fn default_size() -> Self {
        Self(DEFAULT_CHUNK_SIZE)
    }

    /// The raw chunk size.
    pub fn get(&self) -> usize {
        self.0
    }

    /// The number of chunks needed to cover `total` items.
    pub fn chunk_count(&self, total: usize) -> usize {
        total.div_ceil(self.0)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::default_size()
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for ChunkSize {
    type Error = MediadeskError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero() {
        assert!(ChunkSize::new(0).is_err());
    }

    #[test]
    fn accepts_positive() {
        assert!(ChunkSize::new(1).is_ok());
        assert!(ChunkSize::new(10_000).is_ok());
    }

    #[test]
    fn chunk_count_rounds_up() {
        let size = ChunkSize::new(500).unwrap();
        assert_eq!(size.chunk_count(1000), 2);
        assert_eq!(size.chunk_count(1001), 3);
        assert_eq!(size.chunk_count(0), 0);
    }
}
