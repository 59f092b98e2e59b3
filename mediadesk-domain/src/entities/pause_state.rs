// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide pause/stop intent, persisted so it survives a restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable, process-wide pause/stop signal. Read from many points in
/// the engine; written only through the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseState {
    pub is_paused: bool,
    pub should_stop: bool,
    pub timestamp: DateTime<Utc>,
}

impl PauseState {
    /// Neither paused nor stopping.
    pub fn running(now: DateTime<Utc>) -> Self {
        Self {
            is_paused: false,
            should_stop: false,
            timestamp: now,
        }
    }

    pub fn paused(now: DateTime<Utc>) -> Self {
        Self {
            is_paused: true,
            should_stop: false,
            timestamp: now,
        }
    }

    pub fn stopping(now: DateTime<Utc>) -> Self {
        Self {
            is_paused: false,
            should_stop: true,
            timestamp: now,
        }
    }

    /// Whether a worker should suspend at its next checkpoint.
    pub fn should_suspend(&self) -> bool {
        self.is_paused || self.should_stop
    }
}
