// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Acceptance criteria applied to each extracted record, and the optional
//! post-acceptance image move.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::move_spec::MoveSpec;

/// A text comparison operator used by [`TextPredicate`]. Comparison is
/// always performed on lowercase, trimmed strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOperator {
    Like,
    NotLike,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    NotBlank,
    IsBlank,
}

/// A single field-level text predicate: `field <operator> value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPredicate {
    pub operator: TextOperator,
    /// Ignored by `NotBlank`/`IsBlank`.
    pub value: String,
}

impl TextPredicate {
    /// Evaluates this predicate against a field value. Both `value` and
    /// `field` are lowercased and trimmed before comparison.
    pub fn matches(&self, field: &str) -> bool {
        let field = field.trim().to_lowercase();
        let needle = self.value.trim().to_lowercase();
        match self.operator {
            TextOperator::Like => field.contains(&needle),
            TextOperator::NotLike => !field.contains(&needle),
            TextOperator::Equals => field == needle,
            TextOperator::NotEquals => field != needle,
            TextOperator::StartsWith => field.starts_with(&needle),
            TextOperator::EndsWith => field.ends_with(&needle),
            TextOperator::NotBlank => !field.is_empty(),
            TextOperator::IsBlank => field.is_empty(),
        }
    }
}

/// The complete set of acceptance criteria for a run, plus the optional
/// post-acceptance image move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub enabled: bool,
    /// Lowercase, no leading dot (e.g. `"jpg"`, `"png"`).
    pub allowed_extensions: BTreeSet<String>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub min_file_size: Option<u64>,
    pub max_file_size: Option<u64>,
    pub creditline: Option<TextPredicate>,
    pub copyright_line: Option<TextPredicate>,
    pub usage_type: Option<TextPredicate>,
    pub rights_holder: Option<TextPredicate>,
    pub location: Option<TextPredicate>,
    #[serde(rename = "move")]
    pub move_spec: MoveSpec,
}

impl FilterSpec {
    /// A disabled filter that accepts everything and moves nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            allowed_extensions: BTreeSet::new(),
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            min_file_size: None,
            max_file_size: None,
            creditline: None,
            copyright_line: None,
            usage_type: None,
            rights_holder: None,
            location: None,
            move_spec: MoveSpec::disabled(),
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_is_case_insensitive_substring() {
        let predicate = TextPredicate {
            operator: TextOperator::Like,
            value: "Reuters".into(),
        };
        assert!(predicate.matches("© REUTERS 2024"));
        assert!(!predicate.matches("AP Photo"));
    }

    #[test]
    fn not_blank_ignores_value() {
        let predicate = TextPredicate {
            operator: TextOperator::NotBlank,
            value: String::new(),
        };
        assert!(predicate.matches("x"));
        assert!(!predicate.matches("   "));
    }

    #[test]
    fn disabled_filter_has_no_predicates() {
        let filter = FilterSpec::disabled();
        assert!(!filter.enabled);
        assert!(filter.creditline.is_none());
    }
}
