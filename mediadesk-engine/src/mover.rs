// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Copies a qualifying image into the destination tree, replicating the
//! source layout or flattening it, resolving name collisions.

use std::path::{Path, PathBuf};

use mediadesk_domain::{MediadeskError, MoveLayout, MoveSpec};

use crate::resolver::RECOGNIZED_IMAGE_EXTENSIONS;

/// Remote-run provenance used by the `replicate` layout when the source
/// was staged from a remote origin (`destination/city/year/month/media`).
pub struct RemoteStructure<'a> {
    pub city: &'a str,
    pub year: &'a str,
    pub month: &'a str,
}

/// Copies `source` into `spec.destination`, returning the final path on
/// success. Never moves/deletes the source.
pub fn move_image(
    source: &Path,
    spec: &MoveSpec,
    original_root: &Path,
    remote_structure: Option<RemoteStructure<'_>>,
) -> Result<PathBuf, MediadeskError> {
    if !spec.enabled {
        return Err(MediadeskError::MoveFailed("move disabled".to_string()));
    }
    if !is_recognized_image(source) {
        return Err(MediadeskError::MoveFailed(format!(
            "not a recognized image extension: {}",
            source.display()
        )));
    }
    if !source.exists() {
        return Err(MediadeskError::MoveFailed(format!(
            "source does not exist: {}",
            source.display()
        )));
    }

    let dest_dir = destination_directory(source, spec, original_root, remote_structure)?;
    std::fs::create_dir_all(&dest_dir).map_err(|err| {
        MediadeskError::MoveFailed(format!("could not create {}: {err}", dest_dir.display()))
    })?;

    let file_name = source
        .file_name()
        .ok_or_else(|| MediadeskError::MoveFailed("source has no file name".to_string()))?;
    let mut dest_path = dest_dir.join(file_name);
    if dest_path.exists() {
        dest_path = suffixed_path(&dest_dir, file_name, unix_millis());
    }

    std::fs::copy(source, &dest_path).map_err(|err| {
        MediadeskError::MoveFailed(format!("copy to {} failed: {err}", dest_path.display()))
    })?;

    Ok(dest_path)
}

fn destination_directory(
    source: &Path,
    spec: &MoveSpec,
    original_root: &Path,
    remote_structure: Option<RemoteStructure<'_>>,
) -> Result<PathBuf, MediadeskError> {
    let destination = PathBuf::from(&spec.destination);
    match spec.layout {
        MoveLayout::Flat => Ok(destination),
        MoveLayout::Replicate => {
            if let Some(remote) = remote_structure {
                Ok(destination
                    .join(remote.city)
                    .join(remote.year)
                    .join(remote.month)
                    .join("media"))
            } else {
                let source_dir = source.parent().unwrap_or(source);
                let relative = source_dir.strip_prefix(original_root).unwrap_or(source_dir);
                Ok(destination.join(relative))
            }
        }
    }
}

fn suffixed_path(dest_dir: &Path, file_name: &std::ffi::OsStr, millis: u128) -> PathBuf {
    let name = file_name.to_string_lossy();
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.to_string(), String::new()),
    };
    dest_dir.join(format!("{stem}_{millis}{ext}"))
}

fn is_recognized_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            RECOGNIZED_IMAGE_EXTENSIONS
                .iter()
                .any(|recognized| ext.eq_ignore_ascii_case(recognized))
        })
        .unwrap_or(false)
}

fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn flat_spec(destination: &Path) -> MoveSpec {
        MoveSpec {
            enabled: true,
            destination: destination.display().to_string(),
            layout: MoveLayout::Flat,
        }
    }

    #[test]
    fn copies_to_flat_destination_preserving_source() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.jpg");
        std::fs::write(&source, b"data").unwrap();
        let dest_dir = root.path().join("out");

        let spec = flat_spec(&dest_dir);
        let result = move_image(&source, &spec, root.path(), None).unwrap();

        assert!(result.exists());
        assert!(source.exists());
        assert_eq!(std::fs::read(&result).unwrap(), b"data");
    }

    #[test]
    fn suffixes_on_collision() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.jpg");
        std::fs::write(&source, b"new").unwrap();
        let dest_dir = root.path().join("out");
        std::fs::create_dir_all(&dest_dir).unwrap();
        std::fs::write(dest_dir.join("a.jpg"), b"old").unwrap();

        let spec = flat_spec(&dest_dir);
        let result = move_image(&source, &spec, root.path(), None).unwrap();

        assert_ne!(result, dest_dir.join("a.jpg"));
        assert_eq!(std::fs::read(&result).unwrap(), b"new");
    }

    #[test]
    fn replicate_layout_mirrors_relative_directory() {
        let root = tempdir().unwrap();
        let source_dir = root.path().join("2024/01/media");
        std::fs::create_dir_all(&source_dir).unwrap();
        let source = source_dir.join("a.jpg");
        std::fs::write(&source, b"data").unwrap();
        let dest_dir = root.path().join("out");

        let spec = MoveSpec {
            enabled: true,
            destination: dest_dir.display().to_string(),
            layout: MoveLayout::Replicate,
        };
        let result = move_image(&source, &spec, root.path(), None).unwrap();
        assert_eq!(result, dest_dir.join("2024/01/media").join("a.jpg"));
    }

    #[test]
    fn rejects_unrecognized_extension() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.txt");
        std::fs::write(&source, b"data").unwrap();
        let spec = flat_spec(&root.path().join("out"));
        assert!(move_image(&source, &spec, root.path(), None).is_err());
    }
}
