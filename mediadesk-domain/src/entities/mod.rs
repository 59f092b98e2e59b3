// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The entities and flat data shapes that flow through the batch extraction
//! pipeline: work items, extracted records, filter specs, run statistics,
//! and the session/pause/chunked-resume state shapes.

mod chunked_state;
mod extracted_record;
mod filter_spec;
mod image_match;
mod move_spec;
mod pause_state;
mod run_config;
mod session_record;
mod stats;
mod work_item;

pub use chunked_state::ChunkedProcessingState;
pub use extracted_record::{ExtractedRecord, CSV_COLUMNS};
pub use filter_spec::{FilterSpec, TextOperator, TextPredicate};
pub use image_match::{ImageMatch, MatchType};
pub use move_spec::{MoveLayout, MoveSpec};
pub use pause_state::PauseState;
pub use run_config::{ProcessingMode, RunConfig};
pub use session_record::{SessionRecord, SessionStatus};
pub use stats::Stats;
pub use work_item::WorkItem;
