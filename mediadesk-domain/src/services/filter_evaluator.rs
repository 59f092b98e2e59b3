// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pure, I/O-free acceptance evaluation of an [`ExtractedRecord`] against a
//! [`FilterSpec`].

use crate::entities::{ExtractedRecord, FilterSpec};

/// The outcome of evaluating one record against a filter: whether it was
/// accepted, and (for telemetry) the name of the first check that
/// rejected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub passed: bool,
    pub failed_check: Option<&'static str>,
}

impl FilterOutcome {
    fn accept() -> Self {
        Self {
            passed: true,
            failed_check: None,
        }
    }

    fn reject(check: &'static str) -> Self {
        Self {
            passed: false,
            failed_check: Some(check),
        }
    }
}

/// A stateless domain service that decides whether a record is accepted
/// by a filter. Every check runs in fixed order and short-circuits on the
/// first rejection, matching the checks enumerated for acceptance.
pub trait FilterEvaluator {
    fn evaluate(&self, filter: &FilterSpec, record: &ExtractedRecord) -> FilterOutcome;
}

/// The default, and only, implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterEvaluator;

impl FilterEvaluator for DefaultFilterEvaluator {
    fn evaluate(&self, filter: &FilterSpec, record: &ExtractedRecord) -> FilterOutcome {
        if !filter.enabled {
            return FilterOutcome::accept();
        }

        if !check_extension(filter, record) {
            return FilterOutcome::reject("extension");
        }
        if !check_dimensions(filter, record) {
            return FilterOutcome::reject("dimensions");
        }
        if !check_file_size(filter, record) {
            return FilterOutcome::reject("fileSize");
        }
        if !check_text_predicate(filter.creditline.as_ref(), &record.creditline) {
            return FilterOutcome::reject("creditline");
        }
        if !check_text_predicate(filter.copyright_line.as_ref(), &record.copyright_line) {
            return FilterOutcome::reject("copyrightLine");
        }
        if !check_text_predicate(filter.usage_type.as_ref(), &record.usage_type) {
            return FilterOutcome::reject("usageType");
        }
        if !check_text_predicate(filter.rights_holder.as_ref(), &record.rights_holder) {
            return FilterOutcome::reject("rightsHolder");
        }
        if !check_text_predicate(filter.location.as_ref(), &record.location) {
            return FilterOutcome::reject("location");
        }

        FilterOutcome::accept()
    }
}

fn check_extension(filter: &FilterSpec, record: &ExtractedRecord) -> bool {
    if record.image_href.trim().is_empty() {
        return false;
    }
    let extension = record
        .image_href
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    filter.allowed_extensions.contains(&extension)
}

fn parse_dimension(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn check_dimensions(filter: &FilterSpec, record: &ExtractedRecord) -> bool {
    let width = parse_dimension(&record.image_width);
    let height = parse_dimension(&record.image_height);

    if let Some(min_width) = filter.min_width {
        if width < min_width {
            return false;
        }
    }
    if let Some(max_width) = filter.max_width {
        if width > max_width {
            return false;
        }
    }
    if let Some(min_height) = filter.min_height {
        if height < min_height {
            return false;
        }
    }
    if let Some(max_height) = filter.max_height {
        if height > max_height {
            return false;
        }
    }
    true
}

/// Parses a size string that may contain thousands separators
/// (`"1,234"`), falling back to 0 on any non-numeric remainder.
fn parse_size_with_separators(value: &str) -> u64 {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn check_file_size(filter: &FilterSpec, record: &ExtractedRecord) -> bool {
    if filter.min_file_size.is_none() && filter.max_file_size.is_none() {
        return true;
    }
    let size = if record.actual_file_size > 0 {
        record.actual_file_size
    } else {
        parse_size_with_separators(&record.image_size)
    };
    if let Some(min_size) = filter.min_file_size {
        if size < min_size {
            return false;
        }
    }
    if let Some(max_size) = filter.max_file_size {
        if size > max_size {
            return false;
        }
    }
    true
}

fn check_text_predicate(
    predicate: Option<&crate::entities::TextPredicate>,
    field: &str,
) -> bool {
    match predicate {
        Some(predicate) => predicate.matches(field),
        None => true,
    }
}
