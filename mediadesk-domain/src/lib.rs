// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Mediadesk Domain
//!
//! The mediadesk domain represents the core business logic and rules of the
//! news-wire XML batch extraction system. It implements Domain-Driven Design
//! (DDD) patterns and is completely independent of external concerns like
//! HTTP transports, file-watching backends, or the command line.
//!
//! ## Module Structure
//!
//! - [`entities`] — the flat record, work item, filter spec, stats and session
//!   state shapes that flow through the engine.
//! - [`value_objects`] — small validated wrapper types (`WorkerCount`,
//!   `ChunkSize`, `SessionId`).
//! - [`events`] — the progress/log/chunk event taxonomy emitted by the
//!   scheduler.
//! - [`services`] — stateless domain services (the filter evaluator) and
//!   infrastructure *ports* (the `SessionStore` trait) that the engine crate
//!   implements against the filesystem.
//! - [`error`] — the single `MediadeskError` hierarchy used across every
//!   layer.
//!
//! ## Domain-Driven Design Concepts
//!
//! ### Entities
//! Entities carry an identity that persists across mutation: `WorkItem`
//! (identified by its origin), `SessionRecord` (identified by `id`).
//!
//! ### Value Objects
//! Value objects are immutable and self-validating: `WorkerCount` is always
//! in `[1, 16]`; `ChunkSize` is always `>= 1`.
//!
//! ### Domain Services
//! `FilterEvaluator` is a stateless domain service: given a `&FilterSpec` and
//! a `&ExtractedRecord` it decides acceptance with no I/O.
//!
//! ### Ports
//! `SessionStore` is an infrastructure port: the domain declares the
//! operations it needs, the engine crate provides a filesystem-backed
//! implementation.
//!
//! ## Error Handling
//!
//! All fallible domain operations return `Result<T, MediadeskError>`. See
//! [`error::MediadeskError`] for the full hierarchy.

pub mod entities;
pub mod error;
pub mod events;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
pub use entities::{
    ChunkedProcessingState, ExtractedRecord, FilterSpec, ImageMatch, MatchType, MoveSpec,
    MoveLayout, PauseState, ProcessingMode, RunConfig, SessionRecord, SessionStatus, Stats,
    TextOperator, TextPredicate, WorkItem, CSV_COLUMNS,
};
pub use error::MediadeskError;
pub use events::ProgressEvent;
pub use value_objects::{ChunkSize, SessionId, WorkerCount};
