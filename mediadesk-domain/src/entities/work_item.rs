// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A single unit of work: one XML document to extract, resolve, filter and
//! (possibly) move.

use std::path::PathBuf;

/// Identifies one XML document queued for processing.
///
/// `WorkItem` is created exactly once by source enumeration (or the
/// directory watcher), consumed exactly once by a worker task, and
/// discarded once its result has reached the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// The local path or remote URL this item originated from.
    pub origin: String,

    /// Present iff `origin` is remote: the locally staged scratch copy a
    /// worker actually reads.
    pub scratch_path: Option<PathBuf>,

    /// The root the user requested, used to compute relative paths when
    /// moving matched images.
    pub original_root: String,

    /// Monotonic within a run, assigned on dispatch.
    pub worker_id: u64,

    /// An image path already known to belong to this item (set by the
    /// directory watcher when a pair completes). When present, the image
    /// resolver short-circuits straight to it instead of searching.
    pub pre_bound_image_path: Option<PathBuf>,
}

impl WorkItem {
    /// Creates a local `WorkItem` with no pre-bound image.
    pub fn local(origin: impl Into<String>, original_root: impl Into<String>, worker_id: u64) -> Self {
        Self {
            origin: origin.into(),
            scratch_path: None,
            original_root: original_root.into(),
            worker_id,
            pre_bound_image_path: None,
        }
    }

    /// Creates a remote `WorkItem` staged to `scratch_path`.
    pub fn remote(
        origin: impl Into<String>,
        scratch_path: PathBuf,
        original_root: impl Into<String>,
        worker_id: u64,
    ) -> Self {
        Self {
            origin: origin.into(),
            scratch_path: Some(scratch_path),
            original_root: original_root.into(),
            worker_id,
            pre_bound_image_path: None,
        }
    }

    /// Binds a known image path, as done by the directory watcher when a
    /// paired XML/image set is discovered together.
    pub fn with_pre_bound_image(mut self, image_path: PathBuf) -> Self {
        self.pre_bound_image_path = Some(image_path);
        self
    }

    /// Whether this item's origin is remote.
    pub fn is_remote(&self) -> bool {
        self.scratch_path.is_some()
    }

    /// The path a worker should actually read bytes from: the scratch copy
    /// for remote items, the origin itself for local items.
    pub fn read_path(&self) -> &str {
        match &self.scratch_path {
            Some(path) => path.to_str().unwrap_or(&self.origin),
            None => &self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_item_reads_from_origin() {
        let item = WorkItem::local("/root/a.xml", "/root", 1);
        assert!(!item.is_remote());
        assert_eq!(item.read_path(), "/root/a.xml");
    }

    #[test]
    fn remote_item_reads_from_scratch_path() {
        let item = WorkItem::remote(
            "https://example.com/a.xml",
            PathBuf::from("/tmp/scratch/a.xml"),
            "https://example.com",
            2,
        );
        assert!(item.is_remote());
        assert_eq!(item.read_path(), "/tmp/scratch/a.xml");
    }

    #[test]
    fn pre_bound_image_is_retained() {
        let item = WorkItem::local("/root/a.xml", "/root", 1)
            .with_pre_bound_image(PathBuf::from("/root/media/a.jpg"));
        assert_eq!(
            item.pre_bound_image_path,
            Some(PathBuf::from("/root/media/a.jpg"))
        );
    }
}
