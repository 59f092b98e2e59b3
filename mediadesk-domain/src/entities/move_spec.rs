// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Whether and how matched images are copied into a destination tree.

use serde::{Deserialize, Serialize};

/// How a moved image's relative path is reconstructed under the
/// destination root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveLayout {
    /// Mirror the source tree's directory structure under `destination`.
    Replicate,
    /// Place every moved image directly under `destination`, flattened.
    Flat,
}

/// The post-acceptance image move configuration, nested inside
/// [`super::FilterSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSpec {
    pub enabled: bool,
    pub destination: String,
    pub layout: MoveLayout,
}

impl MoveSpec {
    /// A no-op move spec.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            destination: String::new(),
            layout: MoveLayout::Replicate,
        }
    }
}

impl Default for MoveSpec {
    fn default() -> Self {
        Self::disabled()
    }
}
