// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Drives the worker pool in one of three pacing strategies, checkpoints
//! progress durably, and exposes the whole run as `impl Stream<Item =
//! ProgressEvent>`. Framing each event as `data: <json>\n\n` over a socket
//! is the responsibility of whatever transport embeds this engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::Stream;
use mediadesk_domain::{
    ChunkedProcessingState, MediadeskError, ProcessingMode, ProgressEvent, RunConfig,
    SessionRecord, SessionStatus, Stats, WorkItem,
};
use mediadesk_domain::services::SessionStore;

use crate::cancellation::CancellationSignal;
use crate::enumerator;
use crate::sink::CsvSink;
use crate::worker_pool::WorkerPool;

/// Emits a streaming `progress` checkpoint every N task completions.
const STREAM_CHECKPOINT_INTERVAL: u64 = 50;

/// Builds the run's event stream. `resume_from` is `Some` only for a
/// chunked resume, carrying the persisted anchor reloaded by the caller.
pub fn run(
    config: RunConfig,
    store: Arc<dyn SessionStore>,
    cancellation: CancellationSignal,
    resume_from: Option<ChunkedProcessingState>,
) -> impl Stream<Item = ProgressEvent> {
    async_stream::stream! {
        let session = SessionRecord::new(config.clone(), Utc::now());
        if let Err(err) = store.save_current_session(&session).await {
            tracing::warn!(error = %err, "failed to persist session start");
        }

        yield ProgressEvent::Start {
            message: format!("processing {}", config.root_dir),
            timestamp: Utc::now(),
        };

        let items = match enumerator::enumerate(&config.root_dir).await {
            Ok(items) => items,
            Err(err) => {
                yield ProgressEvent::Error { message: err.to_string(), timestamp: Utc::now() };
                finalize_failed(&store, &session).await;
                return;
            }
        };

        let sink = match open_sink(&config, resume_from.is_some()) {
            Ok(sink) => sink,
            Err(err) => {
                yield ProgressEvent::Error { message: err.to_string(), timestamp: Utc::now() };
                finalize_failed(&store, &session).await;
                return;
            }
        };

        let pool = WorkerPool::new(
            config.num_workers,
            config.filter_config.clone(),
            PathBuf::from(&config.root_dir),
        );

        let mut stats = resume_from.as_ref().map(|state| state.stats).unwrap_or_default();
        stats.total_files = items.len() as u64 + stats.processed_files;

        match config.processing_mode {
            ProcessingMode::Regular => {
                for event in drive_one_shot(&pool, sink, items, &mut stats, session, store.clone()).await {
                    yield event;
                }
            }
            ProcessingMode::Stream => {
                let mut events_stream =
                    drive_streaming(pool, sink, items, stats, cancellation.clone(), session, store.clone());
                tokio::pin!(events_stream);
                while let Some(event) = futures::StreamExt::next(&mut events_stream).await {
                    yield event;
                }
            }
            ProcessingMode::Chunked => {
                let mut events_stream = drive_chunked(
                    config.clone(),
                    pool,
                    sink,
                    items,
                    stats,
                    resume_from,
                    store.clone(),
                    cancellation.clone(),
                    session,
                );
                tokio::pin!(events_stream);
                while let Some(event) = futures::StreamExt::next(&mut events_stream).await {
                    yield event;
                }
            }
        }
    }
}

/// Finalizes a session's durable record on a terminal path: records its
/// final status and stats into history, then clears the current-session
/// slot. Called exactly once per run, from whichever pacing mode actually
/// reaches a terminal event (complete, paused, or interrupted).
async fn finalize_session(
    store: &Arc<dyn SessionStore>,
    mut session: SessionRecord,
    status: SessionStatus,
    stats: Stats,
    output_path: Option<String>,
) {
    session.progress = stats;
    session.finish(status, Utc::now(), output_path);
    if let Err(err) = store.add_session(&session).await {
        tracing::warn!(error = %err, "failed to record session history");
    }
    if let Err(err) = store.clear_current_session().await {
        tracing::warn!(error = %err, "failed to clear current session");
    }
}

fn open_sink(config: &RunConfig, resuming: bool) -> Result<CsvSink, MediadeskError> {
    if resuming {
        CsvSink::append(&config.output_file)
    } else {
        CsvSink::create(&config.output_file)
    }
}

async fn drive_one_shot(
    pool: &WorkerPool,
    mut sink: CsvSink,
    items: Vec<WorkItem>,
    stats: &mut Stats,
    session: SessionRecord,
    store: Arc<dyn SessionStore>,
) -> Vec<ProgressEvent> {
    let results = pool.run_batch(items).await;
    for result in results {
        apply_result(stats, &mut sink, result);
    }
    let _ = sink.flush();
    let output_file = sink.path().display().to_string();
    finalize_session(&store, session, SessionStatus::Completed, *stats, Some(output_file.clone())).await;
    vec![
        ProgressEvent::progress(stats, None, None, Utc::now()),
        ProgressEvent::Complete {
            stats: *stats,
            output_file,
            message: "run complete".to_string(),
            timestamp: Utc::now(),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn drive_streaming(
    pool: WorkerPool,
    mut sink: CsvSink,
    items: Vec<WorkItem>,
    mut stats: Stats,
    cancellation: CancellationSignal,
    mut session: SessionRecord,
    store: Arc<dyn SessionStore>,
) -> impl Stream<Item = ProgressEvent> {
    async_stream::stream! {
        if cancellation.is_stopped() {
            finalize_session(&store, session, SessionStatus::Interrupted, stats, None).await;
            yield ProgressEvent::Shutdown { can_resume: true, stats, timestamp: Utc::now() };
            return;
        }

        let output_path = sink.path().display().to_string();
        let mut receiver = pool.dispatch_batch(items);
        let mut completions_since_checkpoint = 0u64;

        while let Some(result) = receiver.recv().await {
            apply_result(&mut stats, &mut sink, result);
            completions_since_checkpoint += 1;

            if cancellation.is_stopped() {
                let _ = sink.flush();
                finalize_session(&store, session, SessionStatus::Interrupted, stats, None).await;
                yield ProgressEvent::Shutdown { can_resume: true, stats, timestamp: Utc::now() };
                return;
            }
            if cancellation.is_paused() {
                let _ = sink.flush();
                finalize_session(&store, session, SessionStatus::Paused, stats, None).await;
                yield ProgressEvent::Paused { can_resume: true, timestamp: Utc::now() };
                return;
            }

            if completions_since_checkpoint >= STREAM_CHECKPOINT_INTERVAL {
                completions_since_checkpoint = 0;
                session.progress = stats;
                if let Err(err) = store.save_current_session(&session).await {
                    tracing::warn!(error = %err, "failed to checkpoint streaming session progress");
                }
                yield ProgressEvent::progress(&stats, None, None, Utc::now());
            }
        }

        let _ = sink.flush();
        yield ProgressEvent::progress(&stats, None, None, Utc::now());
        finalize_session(&store, session, SessionStatus::Completed, stats, Some(output_path.clone())).await;
        yield ProgressEvent::Complete {
            stats,
            output_file: output_path,
            message: "run complete".to_string(),
            timestamp: Utc::now(),
        };
    }
}

#[allow(clippy::too_many_arguments)]
fn drive_chunked(
    config: RunConfig,
    pool: WorkerPool,
    mut sink: CsvSink,
    items: Vec<WorkItem>,
    stats: Stats,
    resume_from: Option<ChunkedProcessingState>,
    store: Arc<dyn SessionStore>,
    cancellation: CancellationSignal,
    session: SessionRecord,
) -> impl Stream<Item = ProgressEvent> {
    async_stream::stream! {
        let output_path = sink.path().display().to_string();
        let origins: Vec<String> = items.iter().map(|item| item.origin.clone()).collect();

        let mut state = resume_from.unwrap_or_else(|| {
            ChunkedProcessingState::new(
                mediadesk_domain::SessionId::new(),
                config.clone(),
                config.chunk_size,
                origins,
                output_path.clone(),
                Utc::now(),
            )
        });
        state.stats = stats;

        let mut by_origin: std::collections::HashMap<String, WorkItem> =
            items.into_iter().map(|item| (item.origin.clone(), item)).collect();

        while !state.is_complete() {
            if cancellation.is_stopped() {
                let _ = sink.flush();
                let _ = store.save_chunked_state(&state).await;
                finalize_session(&store, session, SessionStatus::Interrupted, state.stats, None).await;
                yield ProgressEvent::Shutdown { can_resume: true, stats: state.stats, timestamp: Utc::now() };
                return;
            }

            let processed_index = state.current_chunk;
            let chunk_origins = state.next_chunk().to_vec();
            let chunk_items: Vec<WorkItem> = chunk_origins
                .iter()
                .filter_map(|origin| by_origin.remove(origin))
                .collect();

            yield ProgressEvent::ChunkStart {
                index: processed_index,
                total: state.total_chunks,
                size: chunk_items.len(),
                timestamp: Utc::now(),
            };

            let results = pool.run_batch(chunk_items).await;
            for result in results {
                apply_result(&mut state.stats, &mut sink, result);
            }
            let _ = sink.flush();

            state.current_chunk += 1;
            let _ = store.save_chunked_state(&state).await;

            yield ProgressEvent::ChunkComplete {
                index: processed_index,
                total: state.total_chunks,
                timestamp: Utc::now(),
            };
            yield ProgressEvent::progress(&state.stats, Some(state.current_chunk), Some(state.total_chunks), Utc::now());

            if cancellation.is_stopped() {
                let _ = store.save_chunked_state(&state).await;
                finalize_session(&store, session, SessionStatus::Interrupted, state.stats, None).await;
                yield ProgressEvent::Shutdown { can_resume: true, stats: state.stats, timestamp: Utc::now() };
                return;
            }
            if cancellation.is_paused() {
                let _ = store.save_chunked_state(&state).await;
                finalize_session(&store, session, SessionStatus::Paused, state.stats, None).await;
                yield ProgressEvent::Paused { can_resume: true, timestamp: Utc::now() };
                return;
            }

            if config.pause_between_chunks && !state.is_complete() {
                let mut remaining = config.pause_duration_secs;
                while remaining > 0 {
                    yield ProgressEvent::PauseCountdown { remaining_secs: remaining, timestamp: Utc::now() };
                    for _ in 0..5 {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        if cancellation.should_suspend() {
                            break;
                        }
                    }
                    if cancellation.is_stopped() {
                        let _ = store.save_chunked_state(&state).await;
                        finalize_session(&store, session, SessionStatus::Interrupted, state.stats, None).await;
                        yield ProgressEvent::Shutdown { can_resume: true, stats: state.stats, timestamp: Utc::now() };
                        return;
                    }
                    if cancellation.is_paused() {
                        let _ = store.save_chunked_state(&state).await;
                        finalize_session(&store, session, SessionStatus::Paused, state.stats, None).await;
                        yield ProgressEvent::Paused { can_resume: true, timestamp: Utc::now() };
                        return;
                    }
                    remaining -= 1;
                }
            }
        }

        let _ = store.clear_chunked_state().await;
        finalize_session(&store, session, SessionStatus::Completed, state.stats, Some(output_path.clone())).await;
        yield ProgressEvent::Complete {
            stats: state.stats,
            output_file: output_path,
            message: "run complete".to_string(),
            timestamp: Utc::now(),
        };
    }
}

fn apply_result(stats: &mut Stats, sink: &mut CsvSink, result: crate::worker_pool::ResultEnvelope) {
    let Some(record) = result.record else {
        stats.record_error();
        return;
    };

    stats.record_success();
    if !result.passed {
        stats.record_filtered();
        return;
    }
    match sink.write(&record) {
        Ok(()) => stats.record_written(),
        Err(err) => tracing::error!(error = %err, "CSV sink write failed"),
    }
    if result.moved {
        stats.record_moved();
    }
}

async fn finalize_failed(store: &Arc<dyn SessionStore>, session: &SessionRecord) {
    let session = session.clone();
    let stats = session.progress;
    finalize_session(store, session, SessionStatus::Failed, stats, None).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mediadesk_domain::value_objects::ChunkSize;
    use mediadesk_domain::{FilterSpec, WorkerCount};
    use tempfile::tempdir;

    fn config(root: &std::path::Path, output: &std::path::Path, mode: ProcessingMode) -> RunConfig {
        RunConfig {
            root_dir: root.display().to_string(),
            output_file: output.display().to_string(),
            output_folder: None,
            num_workers: WorkerCount::default(),
            verbose: false,
            processing_mode: mode,
            chunk_size: ChunkSize::new(2).unwrap(),
            pause_between_chunks: false,
            pause_duration_secs: 0,
            filter_config: FilterSpec::disabled(),
        }
    }

    const NEWSML: &str = r#"<NewsML><NewsItem><NewsComponent>
      <Role FormalName="PICTURE"/>
      <ContentItem><MediaType FormalName="HIGHRES"/><Href>a.jpg</Href></ContentItem>
    </NewsComponent></NewsItem></NewsML>"#;

    fn seed_xmls(root: &std::path::Path, count: usize) {
        let dir = root.join("2024/01");
        std::fs::create_dir_all(&dir).unwrap();
        for index in 0..count {
            std::fs::write(dir.join(format!("item{index}.xml")), NEWSML).unwrap();
        }
    }

    #[tokio::test]
    async fn streaming_run_produces_start_and_complete_events() {
        let root = tempdir().unwrap();
        seed_xmls(root.path(), 3);
        let output = root.path().join("out.csv");
        let store: Arc<dyn SessionStore> = Arc::new(crate::session_store::FsSessionStore::new(root.path().join("state")));

        let cfg = config(root.path(), &output, ProcessingMode::Stream);
        let events: Vec<ProgressEvent> = run(cfg, store, CancellationSignal::new(), None).collect().await;

        assert!(matches!(events.first(), Some(ProgressEvent::Start { .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));
    }

    #[tokio::test]
    async fn chunked_run_completes_all_chunks() {
        let root = tempdir().unwrap();
        seed_xmls(root.path(), 5);
        let output = root.path().join("out.csv");
        let store: Arc<dyn SessionStore> = Arc::new(crate::session_store::FsSessionStore::new(root.path().join("state")));

        let cfg = config(root.path(), &output, ProcessingMode::Chunked);
        let events: Vec<ProgressEvent> = run(cfg, store, CancellationSignal::new(), None).collect().await;

        let complete = events.iter().find_map(|event| match event {
            ProgressEvent::Complete { stats, .. } => Some(*stats),
            _ => None,
        });
        assert_eq!(complete.unwrap().processed_files, 5);
    }
}
