// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Locates the image backing an [`ExtractedRecord`]'s `imageHref`, local or
//! remote, and measures its real size. Read-only: never writes.

use std::path::{Path, PathBuf};

use mediadesk_domain::{ImageMatch, MatchType};

/// Image extensions the resolver and watcher both recognize.
pub const RECOGNIZED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg"];

/// The outcome of resolving one record's image.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub image_path: String,
    pub image_exists: bool,
    pub actual_file_size: u64,
    pub image_match: Option<ImageMatch>,
}

impl ResolvedImage {
    fn not_found() -> Self {
        Self {
            image_path: String::new(),
            image_exists: false,
            actual_file_size: 0,
            image_match: None,
        }
    }

    fn found(path: PathBuf, match_type: MatchType, file_size: u64) -> Self {
        Self {
            image_path: path.display().to_string(),
            image_exists: true,
            actual_file_size: file_size,
            image_match: Some(ImageMatch::new(path, match_type, file_size)),
        }
    }
}

/// Resolves the image for a local `xml_path`/`image_href` pair.
///
/// `pre_bound` (supplied by the directory watcher) short-circuits the
/// whole search: only its existence and size are checked.
pub fn resolve_local(
    xml_path: &Path,
    image_href: &str,
    pre_bound: Option<&Path>,
) -> ResolvedImage {
    if let Some(pre_bound) = pre_bound {
        return match std::fs::metadata(pre_bound) {
            Ok(meta) => ResolvedImage::found(pre_bound.to_path_buf(), MatchType::PreBound, meta.len()),
            Err(_) => ResolvedImage::not_found(),
        };
    }

    if image_href.is_empty() {
        return ResolvedImage::not_found();
    }

    let Some(xml_dir) = xml_path.parent() else {
        return ResolvedImage::not_found();
    };
    let Some(grandparent) = xml_dir.parent() else {
        return ResolvedImage::not_found();
    };
    let primary_dir = grandparent.join("media");

    if let Some(found) = search_directory(&primary_dir, image_href) {
        return found;
    }

    let mut alternates = Vec::new();
    if let Some(parent_of_xml_dir) = xml_dir.parent() {
        alternates.push(parent_of_xml_dir.join("media"));
        alternates.push(parent_of_xml_dir.join("images"));
        alternates.push(parent_of_xml_dir.to_path_buf());
    }
    alternates.push(xml_dir.to_path_buf());
    alternates.retain(|dir| dir != &primary_dir);

    for dir in alternates {
        if let Some(found) = search_directory(&dir, image_href) {
            return ResolvedImage {
                image_match: found.image_match.map(|m| ImageMatch::new(m.path, MatchType::AlternateDirectory, m.file_size)),
                ..found
            };
        }
    }

    ResolvedImage::not_found()
}

/// Runs the exact / case-insensitive / related-filename search within a
/// single directory (steps 1-3 of the local search order).
fn search_directory(dir: &Path, image_href: &str) -> Option<ResolvedImage> {
    let exact = dir.join(image_href);
    if let Ok(meta) = std::fs::metadata(&exact) {
        return Some(ResolvedImage::found(exact, MatchType::Exact, meta.len()));
    }

    let entries = std::fs::read_dir(dir).ok()?;
    let mut siblings = Vec::new();
    for entry in entries.flatten() {
        if entry.path().is_file() {
            siblings.push(entry.path());
        }
    }

    let target_lower = image_href.to_lowercase();
    if let Some(matched) = siblings
        .iter()
        .find(|path| has_recognized_image_ext(path) && file_name_lower(path) == target_lower)
    {
        let size = std::fs::metadata(matched).map(|m| m.len()).unwrap_or(0);
        return Some(ResolvedImage::found(matched.clone(), MatchType::CaseInsensitive, size));
    }

    related_filename_match(&siblings, image_href).map(|(path, size)| {
        ResolvedImage::found(path, MatchType::RelatedFilename, size)
    })
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn has_recognized_image_ext(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            RECOGNIZED_IMAGE_EXTENSIONS
                .iter()
                .any(|recognized| ext.eq_ignore_ascii_case(recognized))
        })
        .unwrap_or(false)
}

/// Tokens of a `YYYY-MM-DD_ID_MED_NUM(_...)` basename: the leading date
/// segment and the third (medium) token, when present.
struct BaseTokens {
    date: String,
    medium: Option<String>,
}

fn base_tokens(file_name: &str) -> Option<BaseTokens> {
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    let mut parts = stem.split('_');
    let date = parts.next()?.to_string();
    let _id = parts.next();
    let medium = parts.next().map(str::to_string);
    Some(BaseTokens { date, medium })
}

/// Picks the highest-confidence related file: the one whose date segment
/// matches the target, preferring a matching medium token.
fn related_filename_match(siblings: &[PathBuf], image_href: &str) -> Option<(PathBuf, u64)> {
    let target_tokens = base_tokens(image_href)?;

    let mut best: Option<(PathBuf, u64, bool)> = None;
    for sibling in siblings {
        if !has_recognized_image_ext(sibling) {
            continue;
        }
        let Some(name) = sibling.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(candidate_tokens) = base_tokens(name) else {
            continue;
        };
        if candidate_tokens.date != target_tokens.date {
            continue;
        }
        let high_confidence = candidate_tokens.medium.is_some() && candidate_tokens.medium == target_tokens.medium;
        let better = match &best {
            None => true,
            Some((_, _, best_high)) => high_confidence && !best_high,
        };
        if better {
            let size = std::fs::metadata(sibling).map(|m| m.len()).unwrap_or(0);
            best = Some((sibling.clone(), size, high_confidence));
        }
    }
    best.map(|(path, size, _)| (path, size))
}

/// Rewrites a remote XML URL into its image URL by replacing a literal
/// `processed` path segment with `media`, or, failing that, dropping the
/// filename and appending `media/`.
pub fn remote_image_url(xml_url: &str, image_href: &str) -> String {
    let mut segments: Vec<&str> = xml_url.split('/').collect();
    segments.pop();
    if let Some(processed_index) = segments.iter().position(|segment| *segment == "processed") {
        segments[processed_index] = "media";
    } else {
        segments.push("media");
    }
    segments.push(image_href);
    segments.join("/")
}

/// Resolves a remote image via HEAD. Existence is any `2xx`; size is
/// `Content-Length`, or 0 if absent.
pub async fn resolve_remote(client: &reqwest::Client, xml_url: &str, image_href: &str) -> ResolvedImage {
    if image_href.is_empty() {
        return ResolvedImage::not_found();
    }
    let url = remote_image_url(xml_url, image_href);
    match client.head(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let size = response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0);
            ResolvedImage {
                image_path: url,
                image_exists: true,
                actual_file_size: size,
                image_match: None,
            }
        }
        _ => ResolvedImage::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_exact_match() {
        let root = tempdir().unwrap();
        let xml_dir = root.path().join("processed/2024/01");
        let media_dir = root.path().join("processed/2024/media");
        fs::create_dir_all(&xml_dir).unwrap();
        fs::create_dir_all(&media_dir).unwrap();
        fs::write(media_dir.join("A.jpg"), b"1234").unwrap();

        let xml_path = xml_dir.join("item.xml");
        let resolved = resolve_local(&xml_path, "A.jpg", None);
        assert!(resolved.image_exists);
        assert_eq!(resolved.actual_file_size, 4);
        assert_eq!(resolved.image_match.unwrap().match_type, MatchType::Exact);
    }

    #[test]
    fn resolves_case_insensitive_match() {
        let root = tempdir().unwrap();
        let xml_dir = root.path().join("processed/2024/01");
        let media_dir = root.path().join("processed/2024/media");
        fs::create_dir_all(&xml_dir).unwrap();
        fs::create_dir_all(&media_dir).unwrap();
        fs::write(media_dir.join("image.jpg"), b"x").unwrap();

        let xml_path = xml_dir.join("item.xml");
        let resolved = resolve_local(&xml_path, "Image.JPG", None);
        assert!(resolved.image_exists);
        assert_eq!(resolved.image_match.unwrap().match_type, MatchType::CaseInsensitive);
    }

    #[test]
    fn reports_not_found_when_nothing_matches() {
        let root = tempdir().unwrap();
        let xml_dir = root.path().join("processed/2024/01");
        fs::create_dir_all(&xml_dir).unwrap();
        let xml_path = xml_dir.join("item.xml");
        let resolved = resolve_local(&xml_path, "missing.jpg", None);
        assert!(!resolved.image_exists);
        assert_eq!(resolved.actual_file_size, 0);
    }

    #[test]
    fn pre_bound_path_short_circuits_search() {
        let root = tempdir().unwrap();
        let image_path = root.path().join("watched.jpg");
        fs::write(&image_path, b"abcde").unwrap();
        let xml_path = root.path().join("item.xml");

        let resolved = resolve_local(&xml_path, "does-not-matter.jpg", Some(&image_path));
        assert!(resolved.image_exists);
        assert_eq!(resolved.actual_file_size, 5);
        assert_eq!(resolved.image_match.unwrap().match_type, MatchType::PreBound);
    }

    #[test]
    fn remote_url_replaces_processed_segment_with_media() {
        let url = remote_image_url("https://wire.example.com/processed/2024/01/item.xml", "A.jpg");
        assert_eq!(url, "https://wire.example.com/media/2024/01/A.jpg");
    }

    #[test]
    fn remote_url_appends_media_when_no_processed_segment() {
        let url = remote_image_url("https://wire.example.com/feed/2024/01/item.xml", "A.jpg");
        assert_eq!(url, "https://wire.example.com/feed/2024/01/media/A.jpg");
    }
}
