// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single, hierarchical error type for the mediadesk engine. Every
//! fallible operation in every layer returns `Result<T, MediadeskError>`;
//! `anyhow::Context` is layered on top of it only at the CLI/bootstrap
//! boundary (see `mediadesk-bootstrap`).
//!
//! ## Error Categories
//!
//! - **Run-level, fatal**: [`MediadeskError::EnumerationFailed`],
//!   [`MediadeskError::NoInput`], [`MediadeskError::SinkWriteError`].
//! - **Per-item, counted as an error row**: [`MediadeskError::MalformedXml`],
//!   [`MediadeskError::MissingPictureComponent`],
//!   [`MediadeskError::TaskTimeout`].
//! - **Per-item, recoverable (not an error row)**:
//!   [`MediadeskError::ResolverError`], [`MediadeskError::MoveFailed`].
//! - **Degraded, logged but never fatal**: [`MediadeskError::StateWriteError`].
//! - **Cross-cutting**: [`MediadeskError::InvalidConfiguration`],
//!   [`MediadeskError::Cancelled`], [`MediadeskError::InternalError`].

use thiserror::Error;

/// Domain-specific errors for the mediadesk batch extraction engine.
#[derive(Error, Debug, Clone)]
pub enum MediadeskError {
    /// The source root (local directory or remote index) could not be
    /// enumerated at all: unreachable remote index, or a local root that
    /// does not exist.
    #[error("enumeration failed: {0}")]
    EnumerationFailed(String),

    /// Enumeration succeeded but produced zero XML work items.
    #[error("no input: {0}")]
    NoInput(String),

    /// The XML document is missing the `NewsML`/`NewsItem` root shape.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// No `NewsComponent` with `Role.FormalName == \"PICTURE\"` was found.
    #[error("missing picture component: {0}")]
    MissingPictureComponent(String),

    /// The image path was computable but resolution failed (not found,
    /// HEAD request failed, etc). Recoverable: the record is still emitted
    /// with `imageExists = \"No\"`.
    #[error("resolver error: {0}")]
    ResolverError(String),

    /// Copying a qualifying image to the destination tree failed.
    /// Non-fatal: the record is still written, `movedFiles` is not
    /// incremented.
    #[error("move failed: {0}")]
    MoveFailed(String),

    /// A worker task exceeded its per-task timeout.
    #[error("task timed out: {0}")]
    TaskTimeout(String),

    /// Appending to the CSV sink failed. Fatal: aborts the run.
    #[error("CSV sink write error: {0}")]
    SinkWriteError(String),

    /// A session-state write (pause state, chunked state, history,
    /// current session) failed. Degraded: logged, never fatal.
    #[error("session state write error: {0}")]
    StateWriteError(String),

    /// Run configuration failed validation (e.g. `numWorkers` out of
    /// range, an unreadable filter spec).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Attempted to start a run while another run is active
    /// (the single-active-session invariant, I4).
    #[error("a session is already running: {0}")]
    SessionAlreadyRunning(String),

    /// No session is available to resume, pause, or stop.
    #[error("no active session: {0}")]
    NoActiveSession(String),

    /// The run was cancelled cooperatively via pause/stop. Not a failure.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// I/O failure not otherwise categorized above.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization/deserialization failure (JSON/YAML/TOML).
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// An HTTP request (remote enumeration, remote HEAD, remote download)
    /// failed.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Anything else unexpected.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl MediadeskError {
    /// A short, stable category label suitable for a structured log field
    /// or a metrics counter name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::EnumerationFailed(_) => "enumeration_failed",
            Self::NoInput(_) => "no_input",
            Self::MalformedXml(_) => "malformed_xml",
            Self::MissingPictureComponent(_) => "missing_picture_component",
            Self::ResolverError(_) => "resolver_error",
            Self::MoveFailed(_) => "move_failed",
            Self::TaskTimeout(_) => "task_timeout",
            Self::SinkWriteError(_) => "sink_write_error",
            Self::StateWriteError(_) => "state_write_error",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::SessionAlreadyRunning(_) => "session_already_running",
            Self::NoActiveSession(_) => "no_active_session",
            Self::Cancelled(_) => "cancelled",
            Self::IoError(_) => "io_error",
            Self::SerializationError(_) => "serialization_error",
            Self::NetworkError(_) => "network_error",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Whether this error is counted as a per-item error row
    /// (`Stats.errorFiles`) rather than a recoverable, row-producing
    /// condition.
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedXml(_) | Self::MissingPictureComponent(_) | Self::TaskTimeout(_)
        )
    }
}

impl From<std::io::Error> for MediadeskError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MediadeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_errors_are_categorized_correctly() {
        assert!(MediadeskError::MalformedXml("x".into()).is_item_error());
        assert!(MediadeskError::MissingPictureComponent("x".into()).is_item_error());
        assert!(MediadeskError::TaskTimeout("x".into()).is_item_error());
        assert!(!MediadeskError::ResolverError("x".into()).is_item_error());
        assert!(!MediadeskError::MoveFailed("x".into()).is_item_error());
    }

    #[test]
    fn category_labels_are_stable() {
        assert_eq!(MediadeskError::NoInput("x".into()).category(), "no_input");
    }
}
