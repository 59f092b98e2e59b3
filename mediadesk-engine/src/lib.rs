// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure and application logic for the mediadesk batch extractor:
//! source enumeration, NewsML extraction, image resolution/filtering/moving,
//! the worker pool, the scheduler and its progress stream, durable session
//! state, layered configuration, and the directory watcher.
//!
//! This crate has no binary of its own; `mediadesk-bootstrap` wires it to a
//! CLI and owns process-level concerns (signal handling, tracing init).

pub mod cancellation;
pub mod config;
pub mod enumerator;
pub mod mover;
pub mod resolver;
pub mod scheduler;
pub mod session_store;
pub mod sink;
pub mod watcher;
pub mod worker_pool;
pub mod xml;

pub use cancellation::CancellationSignal;
pub use config::{load_run_config, CliOverrides};
pub use scheduler::run as run_schedule;
pub use session_store::FsSessionStore;
pub use sink::CsvSink;
pub use watcher::DirectoryWatcher;
pub use worker_pool::{ResultEnvelope, WorkerPool};
