// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The outcome of resolving an `imageHref` against the filesystem or a
//! remote origin.

use std::path::PathBuf;

/// How an image path was ultimately resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// The exact, case-sensitive path existed.
    Exact,
    /// A case-insensitive match was found in the same directory.
    CaseInsensitive,
    /// Found via the related-filename heuristic (date/id/medium/number
    /// token matching) against a sibling file.
    RelatedFilename,
    /// Found in one of the alternate directories searched as a fallback.
    AlternateDirectory,
    /// Pre-bound by the directory watcher; no search was performed.
    PreBound,
    /// Resolved against a remote origin via HEAD request.
    Remote,
}

/// The result of attempting to resolve one record's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    pub path: PathBuf,
    pub match_type: MatchType,
    pub file_size: u64,
}

impl ImageMatch {
    pub fn new(path: PathBuf, match_type: MatchType, file_size: u64) -> Self {
        Self {
            path,
            match_type,
            file_size,
        }
    }
}
