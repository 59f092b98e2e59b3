// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Watches a directory recursively for newly created XML/image files,
//! pairs them by a shared base identifier, and schedules each complete
//! pair through the worker pool with an append-only sink.
//!
//! Filesystem events arrive on `notify`'s own background thread and are
//! funneled through a `tokio::sync::mpsc` channel into a single async task
//! that owns the pending-pair map. A `DashMap` is used (rather than a
//! mutex around a `HashMap`) so that thread can't block the notify
//! callback that feeds it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use mediadesk_domain::{FilterSpec, MediadeskError, WorkItem};

use crate::resolver::RECOGNIZED_IMAGE_EXTENSIONS;
use crate::sink::CsvSink;
use crate::worker_pool::WorkerPool;

/// A partially-discovered `{xml, image}` pair, keyed by base identifier.
#[derive(Debug, Clone, Default)]
pub struct PendingPair {
    pub xml_path: Option<PathBuf>,
    pub image_path: Option<PathBuf>,
    pub discovered_at: Option<DateTime<Utc>>,
}

impl PendingPair {
    fn is_complete(&self) -> bool {
        self.xml_path.is_some() && self.image_path.is_some()
    }
}

/// Watcher-wide counters, observable via [`Watcher::stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WatcherStats {
    pub xml_files_detected: u64,
    pub image_files_detected: u64,
    pub pairs_processed: u64,
    pub files_moved: u64,
    pub files_errored: u64,
}

/// Owns the pending-pair map and counters for one watch session.
pub struct DirectoryWatcher {
    pending: Arc<DashMap<String, PendingPair>>,
    stats: Arc<std::sync::Mutex<WatcherStats>>,
    start_time: Instant,
    _fs_watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Starts watching `root` recursively, running the worker pool on each
    /// completed pair and appending accepted records to `sink`.
    pub fn start(
        root: impl AsRef<Path>,
        filter_spec: FilterSpec,
        mut sink: CsvSink,
    ) -> Result<Self, MediadeskError> {
        let root = root.as_ref().to_path_buf();
        let pending = Arc::new(DashMap::new());
        let stats = Arc::new(std::sync::Mutex::new(WatcherStats::default()));

        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let mut fs_watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            if let Ok(event) = event {
                let _ = tx.send(event);
            }
        })
        .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?;

        fs_watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?;

        let pool = WorkerPool::new(
            mediadesk_domain::WorkerCount::default_count(),
            filter_spec,
            root.clone(),
        );
        let pending_for_task = pending.clone();
        let stats_for_task = stats.clone();

        tokio::spawn(async move {
            let mut worker_id = 0u64;
            while let Some(event) = rx.recv().await {
                if !matches!(event.kind, EventKind::Create(_)) {
                    continue;
                }
                for path in event.paths {
                    let Some(completed) =
                        register_path(&pending_for_task, &stats_for_task, &path)
                    else {
                        continue;
                    };

                    worker_id += 1;
                    if let Some(item) = build_work_item(&completed, &root, worker_id) {
                        let results = pool.run_batch(vec![item]).await;
                        for result in results {
                            if let Some(record) = result.record {
                                if result.passed {
                                    let _ = sink.write(&record);
                                    if result.moved {
                                        let mut guard = stats_for_task.lock().expect("stats lock poisoned");
                                        guard.files_moved += 1;
                                    }
                                }
                            } else {
                                let mut guard = stats_for_task.lock().expect("stats lock poisoned");
                                guard.files_errored += 1;
                            }
                        }
                        let mut guard = stats_for_task.lock().expect("stats lock poisoned");
                        guard.pairs_processed += 1;
                    }
                }
            }
        });

        Ok(Self {
            pending,
            stats,
            start_time: Instant::now(),
            _fs_watcher: fs_watcher,
        })
    }

    pub fn stats(&self) -> WatcherStats {
        *self.stats.lock().expect("stats lock poisoned")
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Base identifiers with an incomplete pair, for status reporting.
    pub fn pending_pairs(&self) -> Vec<String> {
        self.pending
            .iter()
            .filter(|entry| !entry.value().is_complete())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

/// Registers a newly-created file into the pending-pair map, returning the
/// completed pair (and removing it from the map) once both halves arrive.
fn register_path(
    pending: &DashMap<String, PendingPair>,
    stats: &std::sync::Mutex<WatcherStats>,
    path: &Path,
) -> Option<(PathBuf, PathBuf)> {
    let base = base_identifier(path)?;
    let is_xml = is_xml_file(path);
    let is_image = is_image_file(path);
    if !is_xml && !is_image {
        return None;
    }

    {
        let mut guard = stats.lock().expect("stats lock poisoned");
        if is_xml {
            guard.xml_files_detected += 1;
        } else {
            guard.image_files_detected += 1;
        }
    }

    let mut entry = pending.entry(base.clone()).or_default();
    if entry.discovered_at.is_none() {
        entry.discovered_at = Some(Utc::now());
    }
    if is_xml {
        entry.xml_path = Some(path.to_path_buf());
    } else {
        entry.image_path = Some(path.to_path_buf());
    }

    if entry.is_complete() {
        let xml_path = entry.xml_path.clone()?;
        let image_path = entry.image_path.clone()?;
        drop(entry);
        pending.remove(&base);
        Some((xml_path, image_path))
    } else {
        None
    }
}

/// The first four underscore-separated tokens of the basename (date, id,
/// med, num), or the full basename when fewer tokens are present.
fn base_identifier(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let tokens: Vec<&str> = stem.splitn(5, '_').collect();
    let take = tokens.len().min(4);
    Some(tokens[..take].join("_"))
}

fn is_xml_file(path: &Path) -> bool {
    path.extension().map(|ext| ext.eq_ignore_ascii_case("xml")).unwrap_or(false)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            RECOGNIZED_IMAGE_EXTENSIONS
                .iter()
                .any(|recognized| ext.eq_ignore_ascii_case(recognized))
        })
        .unwrap_or(false)
}

fn build_work_item(pair: &(PathBuf, PathBuf), root: &Path, worker_id: u64) -> Option<WorkItem> {
    let (xml_path, image_path) = pair;
    Some(
        WorkItem::local(xml_path.display().to_string(), root.display().to_string(), worker_id)
            .with_pre_bound_image(image_path.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_identifier_takes_first_four_tokens() {
        let path = Path::new("2024-01-01_ABC123_MED_1_extra.xml");
        assert_eq!(base_identifier(path).as_deref(), Some("2024-01-01_ABC123_MED_1"));
    }

    #[test]
    fn base_identifier_uses_full_stem_when_fewer_tokens() {
        let path = Path::new("2024-01-01_ABC.xml");
        assert_eq!(base_identifier(path).as_deref(), Some("2024-01-01_ABC"));
    }

    #[test]
    fn xml_and_image_with_same_base_share_an_identifier() {
        let xml = Path::new("2024-01-01_ABC_MED_1.xml");
        let image = Path::new("2024-01-01_ABC_MED_1.jpg");
        assert_eq!(base_identifier(xml), base_identifier(image));
    }

    #[test]
    fn register_path_completes_only_once_both_halves_arrive() {
        let pending = DashMap::new();
        let stats = std::sync::Mutex::new(WatcherStats::default());
        let xml = Path::new("2024-01-01_ABC_MED_1.xml");
        let image = Path::new("2024-01-01_ABC_MED_1.jpg");

        assert!(register_path(&pending, &stats, xml).is_none());
        let completed = register_path(&pending, &stats, image);
        assert!(completed.is_some());
        assert!(pending.is_empty());
    }
}
