// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entry point: parses the CLI, wires the engine's scheduler/watcher to
//! the durable session store, and bridges OS signals and out-of-band
//! pause/stop commands into the in-process `CancellationSignal`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use futures::StreamExt;

use mediadesk_bootstrap::{init_tracing, parse_cli, Commands, ExitCode, HistoryAction};
use mediadesk_domain::services::SessionStore;
use mediadesk_domain::{FilterSpec, MediadeskError, ProgressEvent, SessionId};
use mediadesk_engine::config::{load_run_config, CliOverrides};
use mediadesk_engine::{CancellationSignal, DirectoryWatcher, FsSessionStore};

/// How often the running process checks the durable pause state written
/// by a separate `mediadesk pause`/`stop` invocation.
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where session-state JSON artifacts live. Not yet user-configurable;
/// a future `--state-dir` flag would thread through here.
fn state_dir() -> PathBuf {
    PathBuf::from(".mediadesk-state")
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    let store: Arc<dyn SessionStore> = Arc::new(FsSessionStore::new(state_dir()));

    let result = dispatch(cli.command, cli.config.as_deref(), store).await;
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            match err.downcast::<MediadeskError>() {
                Ok(domain_err) => ExitCode::from_error(&domain_err).into(),
                Err(_) => ExitCode::Error.into(),
            }
        }
    }
}

async fn dispatch(command: Commands, config_path: Option<&Path>, store: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            root,
            output,
            workers,
            mode,
            chunk_size,
            pause_between_chunks,
            pause_duration,
            filter,
        } => {
            if store.load_current_session().await?.is_some() {
                return Err(MediadeskError::SessionAlreadyRunning(
                    "a run is already active; stop it before starting a new one".to_string(),
                )
                .into());
            }

            let cli_overrides = CliOverrides {
                root_dir: Some(root),
                output_file: Some(output),
                num_workers: workers,
                processing_mode: mode.map(Into::into),
                chunk_size,
                pause_between_chunks: Some(pause_between_chunks),
                pause_duration_secs: pause_duration,
                ..Default::default()
            };
            let mut run_config =
                load_run_config(config_path, cli_overrides).context("loading run configuration")?;
            if let Some(filter_path) = filter {
                run_config.filter_config = load_filter_spec(&filter_path)?;
            }

            store.clear_pause_state().await?;
            let cancellation = CancellationSignal::new();
            spawn_shutdown_bridge(store.clone(), cancellation.clone());

            drive_to_completion(run_config, store, cancellation, None).await
        }

        Commands::Resume => {
            let state = store
                .load_chunked_state()
                .await?
                .ok_or_else(|| MediadeskError::NoActiveSession("no chunked run to resume".to_string()))?;
            let run_config = state.config.clone();

            store.clear_pause_state().await?;
            let cancellation = CancellationSignal::new();
            spawn_shutdown_bridge(store.clone(), cancellation.clone());

            drive_to_completion(run_config, store, cancellation, Some(state)).await
        }

        Commands::Pause => {
            store.save_pause_state(&mediadesk_domain::PauseState::paused(Utc::now())).await?;
            println!("pause requested");
            Ok(())
        }

        Commands::Stop => {
            store.save_pause_state(&mediadesk_domain::PauseState::stopping(Utc::now())).await?;
            println!("stop requested");
            Ok(())
        }

        Commands::Watch { root, output, filter } => {
            let filter_spec = match filter {
                Some(path) => load_filter_spec(&path)?,
                None => FilterSpec::disabled(),
            };
            let sink = mediadesk_engine::CsvSink::create(&output).context("opening watcher output CSV")?;
            let watcher = DirectoryWatcher::start(&root, filter_spec, sink).context("starting directory watcher")?;

            println!("watching {root}, writing to {output}. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
            let stats = watcher.stats();
            println!(
                "stopped: {} pairs processed, {} moved, {} errored",
                stats.pairs_processed, stats.files_moved, stats.files_errored
            );
            Ok(())
        }

        Commands::History { action } => run_history(action, store).await,
    }
}

async fn drive_to_completion(
    run_config: mediadesk_domain::RunConfig,
    store: Arc<dyn SessionStore>,
    cancellation: CancellationSignal,
    resume_from: Option<mediadesk_domain::ChunkedProcessingState>,
) -> anyhow::Result<()> {
    let mut events = Box::pin(mediadesk_engine::run_schedule(run_config, store, cancellation, resume_from));
    let mut failed = false;

    while let Some(event) = events.next().await {
        print_event(&event);
        if matches!(event, ProgressEvent::Error { .. }) {
            failed = true;
        }
    }

    if failed {
        return Err(MediadeskError::InternalError("run completed with errors; see event log above".to_string()).into());
    }
    Ok(())
}

/// Frames one event the way a transport would: `data: <json>\n\n`.
fn print_event(event: &ProgressEvent) {
    match serde_json::to_string(event) {
        Ok(json) => println!("data: {json}\n"),
        Err(err) => eprintln!("failed to serialize progress event: {err}"),
    }
}

fn load_filter_spec(path: &Path) -> anyhow::Result<FilterSpec> {
    let bytes = std::fs::read(path).with_context(|| format!("reading filter spec at {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing filter spec at {}", path.display()))
}

/// Spawns a background task bridging the durable `PauseState` (written by
/// a separate `pause`/`stop` invocation) and OS signals into the
/// in-process `CancellationSignal`.
fn spawn_shutdown_bridge(store: Arc<dyn SessionStore>, cancellation: CancellationSignal) {
    let signal_cancellation = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancellation.stop();
        }
    });

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(PAUSE_POLL_INTERVAL).await;
            match store.load_pause_state().await {
                Ok(state) if state.should_stop => {
                    cancellation.stop();
                    break;
                }
                Ok(state) if state.is_paused => cancellation.pause(),
                Ok(_) => cancellation.clear_pause(),
                Err(err) => tracing::warn!(error = %err, "failed to poll pause state"),
            }
            if cancellation.is_stopped() {
                break;
            }
        }
    });
}

async fn run_history(action: HistoryAction, store: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    match action {
        HistoryAction::List => {
            let history = store.history().await?;
            for session in history {
                println!("{} [{:?}] {}", session.id, session.status, session.config.root_dir);
            }
        }
        HistoryAction::Show { id } => {
            let id: SessionId = id.parse().context("parsing session id")?;
            let history = store.history().await?;
            let session = history
                .into_iter()
                .find(|session| session.id == id)
                .ok_or_else(|| MediadeskError::NoActiveSession(format!("no session with id {id}")))?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        HistoryAction::Delete { id } => {
            let id: SessionId = id.parse().context("parsing session id")?;
            store.delete_session(id).await?;
            println!("deleted session {id}");
        }
        HistoryAction::Clear => {
            store.clear_history().await?;
            println!("history cleared");
        }
    }
    Ok(())
}
