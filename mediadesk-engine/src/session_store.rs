// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed [`SessionStore`]: four JSON artifacts under a base
//! directory, each written atomically (write to a temp file, rename into
//! place) with a `.backup` sibling kept.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use mediadesk_domain::services::SessionStore;
use mediadesk_domain::{ChunkedProcessingState, MediadeskError, PauseState, SessionId, SessionRecord};

const MAX_HISTORY: usize = 100;

/// A `SessionStore` backed by plain JSON files under `base_dir`.
pub struct FsSessionStore {
    base_dir: PathBuf,
}

impl FsSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.base_dir.join(file_name)
    }

    /// Reads and deserializes `path`, treating a missing or corrupt file as
    /// `None` rather than an error.
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Atomic write-then-rename, keeping the previous contents as
    /// `<file>.backup`.
    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<(), MediadeskError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|err| MediadeskError::StateWriteError(err.to_string()))?;

        let final_path = self.path(file_name);
        if final_path.exists() {
            let backup_path = self.path(&format!("{file_name}.backup"));
            let _ = std::fs::copy(&final_path, &backup_path);
        }

        let tmp_path = self.path(&format!("{file_name}.tmp"));
        let json = serde_json::to_vec_pretty(value)
            .map_err(|err| MediadeskError::StateWriteError(err.to_string()))?;
        std::fs::write(&tmp_path, json)
            .map_err(|err| MediadeskError::StateWriteError(err.to_string()))?;
        std::fs::rename(&tmp_path, &final_path)
            .map_err(|err| MediadeskError::StateWriteError(err.to_string()))?;
        Ok(())
    }

    fn remove(&self, file_name: &str) -> Result<(), MediadeskError> {
        let path = self.path(file_name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediadeskError::StateWriteError(err.to_string())),
        }
    }

    fn load_history(&self) -> Vec<SessionRecord> {
        self.read_json(&self.path("processing_history.json"))
            .unwrap_or_default()
    }

    fn save_history(&self, sessions: &[SessionRecord]) -> Result<(), MediadeskError> {
        #[derive(Serialize)]
        struct HistoryFile<'a> {
            sessions: &'a [SessionRecord],
        }
        self.write_json("processing_history.json", &HistoryFile { sessions })
    }
}

#[async_trait]
impl SessionStore for FsSessionStore {
    async fn load_pause_state(&self) -> Result<PauseState, MediadeskError> {
        Ok(self
            .read_json(&self.path("pause_state.json"))
            .unwrap_or_else(|| PauseState::running(Utc::now())))
    }

    async fn save_pause_state(&self, state: &PauseState) -> Result<(), MediadeskError> {
        self.write_json("pause_state.json", state)
    }

    async fn clear_pause_state(&self) -> Result<(), MediadeskError> {
        self.remove("pause_state.json")
    }

    async fn load_chunked_state(&self) -> Result<Option<ChunkedProcessingState>, MediadeskError> {
        Ok(self.read_json(&self.path("chunked_processing_state.json")))
    }

    async fn save_chunked_state(&self, state: &ChunkedProcessingState) -> Result<(), MediadeskError> {
        self.write_json("chunked_processing_state.json", state)
    }

    async fn clear_chunked_state(&self) -> Result<(), MediadeskError> {
        self.remove("chunked_processing_state.json")
    }

    async fn load_current_session(&self) -> Result<Option<SessionRecord>, MediadeskError> {
        Ok(self.read_json(&self.path("current_session.json")))
    }

    async fn save_current_session(&self, session: &SessionRecord) -> Result<(), MediadeskError> {
        self.write_json("current_session.json", session)
    }

    async fn clear_current_session(&self) -> Result<(), MediadeskError> {
        self.remove("current_session.json")
    }

    async fn add_session(&self, session: &SessionRecord) -> Result<(), MediadeskError> {
        let mut history = self.load_history();
        history.insert(0, session.clone());
        history.truncate(MAX_HISTORY);
        self.save_history(&history)
    }

    async fn update_session(&self, id: SessionId, patch: Value) -> Result<SessionRecord, MediadeskError> {
        let mut history = self.load_history();
        let index = history
            .iter()
            .position(|session| session.id == id)
            .ok_or_else(|| MediadeskError::NoActiveSession(format!("no session with id {id}")))?;

        let mut existing = serde_json::to_value(&history[index])
            .map_err(|err| MediadeskError::SerializationError(err.to_string()))?;
        merge_json(&mut existing, patch);
        let updated: SessionRecord = serde_json::from_value(existing)
            .map_err(|err| MediadeskError::SerializationError(err.to_string()))?;

        history[index] = updated.clone();
        self.save_history(&history)?;
        Ok(updated)
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), MediadeskError> {
        let mut history = self.load_history();
        history.retain(|session| session.id != id);
        self.save_history(&history)
    }

    async fn history(&self) -> Result<Vec<SessionRecord>, MediadeskError> {
        Ok(self.load_history())
    }

    async fn clear_history(&self) -> Result<(), MediadeskError> {
        self.remove("processing_history.json")
    }
}

/// A shallow recursive merge: object fields in `patch` overwrite or add to
/// `target`; fields `target` has that `patch` omits are preserved.
fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                merge_json(target_map.entry(key).or_insert(Value::Null), patch_value);
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadesk_domain::{FilterSpec, ProcessingMode, RunConfig, SessionStatus, WorkerCount};
    use mediadesk_domain::value_objects::ChunkSize;
    use tempfile::tempdir;

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

    #[tokio::test]
    async fn missing_pause_state_yields_running_default() {
        let dir = tempdir().unwrap();
        let store = FsSessionStore::new(dir.path());
        let state = store.load_pause_state().await.unwrap();
        assert!(!state.is_paused);
        assert!(!state.should_stop);
    }

    #[tokio::test]
    async fn corrupt_pause_state_is_treated_as_missing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pause_state.json"), b"not json").unwrap();
        let store = FsSessionStore::new(dir.path());
        let state = store.load_pause_state().await.unwrap();
        assert!(!state.is_paused);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = FsSessionStore::new(dir.path());
        let state = PauseState::paused(Utc::now());
        store.save_pause_state(&state).await.unwrap();
        let loaded = store.load_pause_state().await.unwrap();
        assert!(loaded.is_paused);
    }

    #[tokio::test]
    async fn writing_twice_keeps_a_backup_sibling() {
        let dir = tempdir().unwrap();
        let store = FsSessionStore::new(dir.path());
        store.save_pause_state(&PauseState::running(Utc::now())).await.unwrap();
        store.save_pause_state(&PauseState::paused(Utc::now())).await.unwrap();
        assert!(dir.path().join("pause_state.json.backup").exists());
    }

    #[tokio::test]
    async fn update_session_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        let store = FsSessionStore::new(dir.path());
        let session = SessionRecord::new(config(), Utc::now());
        store.add_session(&session).await.unwrap();

        let patch = serde_json::json!({ "status": "paused" });
        let updated = store.update_session(session.id, patch).await.unwrap();

        assert_eq!(updated.status, SessionStatus::Paused);
        assert_eq!(updated.config.root_dir, "/root");
    }

    #[tokio::test]
    async fn history_is_capped_at_one_hundred() {
        let dir = tempdir().unwrap();
        let store = FsSessionStore::new(dir.path());
        for _ in 0..105 {
            store.add_session(&SessionRecord::new(config(), Utc::now())).await.unwrap();
        }
        assert_eq!(store.history().await.unwrap().len(), 100);
    }
}
