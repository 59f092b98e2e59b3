// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! NewsML XML parsing and the news-item extraction contract.

mod extractor;
mod node;

pub use extractor::extract;
pub use node::XmlNode;
