// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The durable session-state port. The domain declares the operations it
//! needs; the engine crate supplies a filesystem-backed implementation
//! (atomic write-then-rename, `.backup` sibling kept).

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{ChunkedProcessingState, PauseState, SessionRecord};
use crate::error::MediadeskError;
use crate::value_objects::SessionId;

/// Durable storage for the three session-state artifacts: the process-wide
/// pause flag, the chunked-mode resume anchor, and the session/history
/// record set. A single session may be active (`Running` or `Paused`) at
/// a time; callers pass immutable patches, the store serializes writes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the pause state, or a fresh "running" state if none is
    /// persisted (a missing or corrupt file is treated as "no saved
    /// state", never an error).
    async fn load_pause_state(&self) -> Result<PauseState, MediadeskError>;

    async fn save_pause_state(&self, state: &PauseState) -> Result<(), MediadeskError>;

    async fn clear_pause_state(&self) -> Result<(), MediadeskError>;

    /// Loads the chunked resume state, if a chunked run is in progress.
    async fn load_chunked_state(&self) -> Result<Option<ChunkedProcessingState>, MediadeskError>;

    async fn save_chunked_state(
        &self,
        state: &ChunkedProcessingState,
    ) -> Result<(), MediadeskError>;

    async fn clear_chunked_state(&self) -> Result<(), MediadeskError>;

    /// The at-most-one currently active session, if any.
    async fn load_current_session(&self) -> Result<Option<SessionRecord>, MediadeskError>;

    async fn save_current_session(&self, session: &SessionRecord) -> Result<(), MediadeskError>;

    async fn clear_current_session(&self) -> Result<(), MediadeskError>;

    /// Prepends `session` to the newest-first history list, truncating at
    /// 100 entries.
    async fn add_session(&self, session: &SessionRecord) -> Result<(), MediadeskError>;

    /// Read-modify-write: merges `patch`'s fields into the stored session
    /// with `id` via `serde_json::Value`, preserving any fields the patch
    /// omits, then re-validates the result into a `SessionRecord`.
    async fn update_session(
        &self,
        id: SessionId,
        patch: Value,
    ) -> Result<SessionRecord, MediadeskError>;

    async fn delete_session(&self, id: SessionId) -> Result<(), MediadeskError>;

    /// The full, newest-first processing history (capped at 100 entries).
    async fn history(&self) -> Result<Vec<SessionRecord>, MediadeskError>;

    async fn clear_history(&self) -> Result<(), MediadeskError>;
}
