// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Produces the ordered [`WorkItem`] sequence from a local root (recursive
//! walk) or a remote HTTP index (link scrape + scratch staging).

use std::path::{Path, PathBuf};

use mediadesk_domain::{MediadeskError, WorkItem};
use tracing::warn;
use walkdir::WalkDir;

/// Enumerates `root`, which is either a local directory path or an
/// `http(s)://` URL.
pub async fn enumerate(root: &str) -> Result<Vec<WorkItem>, MediadeskError> {
    let items = if root.starts_with("http://") || root.starts_with("https://") {
        enumerate_remote(root).await?
    } else {
        enumerate_local(Path::new(root))?
    };

    if items.is_empty() {
        return Err(MediadeskError::NoInput(format!("no XML files found under {root}")));
    }
    Ok(items)
}

/// Depth-first, lexicographically-sorted walk of a local directory tree,
/// collecting `.xml` files (case-insensitive).
fn enumerate_local(root: &Path) -> Result<Vec<WorkItem>, MediadeskError> {
    if !root.exists() {
        return Err(MediadeskError::EnumerationFailed(format!(
            "root does not exist: {}",
            root.display()
        )));
    }

    let mut paths = Vec::new();
    walk_sorted(root, &mut paths)?;

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            WorkItem::local(path.display().to_string(), root.display().to_string(), index as u64)
        })
        .collect())
}

/// Walks `dir` depth-first, sorting entries by file name within each
/// directory level so the resulting order is stable across runs (the
/// chunked-resume index relies on this ordering staying fixed).
fn walk_sorted(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), MediadeskError> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_xml(entry.path()) {
            out.push(entry.path().to_path_buf());
        }
    }
    Ok(())
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}

/// Scrapes a remote directory index for `.xml` links and subdirectory
/// links, staging every collected XML to a scratch directory.
async fn enumerate_remote(root: &str) -> Result<Vec<WorkItem>, MediadeskError> {
    let client = reqwest::Client::new();
    let mut urls = Vec::new();
    scrape_index(&client, root, &mut urls, 0).await?;

    if urls.is_empty() {
        if let Some(direct) = probe_direct_file(&client, root).await? {
            urls.push(direct);
        }
    }

    let scratch_root = tempfile::tempdir()
        .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?
        .into_path();

    let mut items = Vec::with_capacity(urls.len());
    for (index, url) in urls.into_iter().enumerate() {
        let scratch_path = stage_to_scratch(&client, &scratch_root, &url).await?;
        items.push(WorkItem::remote(url, scratch_path, root.to_string(), index as u64));
    }
    Ok(items)
}

/// Maximum subdirectory recursion depth when scraping a remote index, a
/// defensive bound against a misbehaving or cyclic index.
const MAX_REMOTE_DEPTH: u32 = 8;

fn scrape_index<'a>(
    client: &'a reqwest::Client,
    url: &'a str,
    out: &'a mut Vec<String>,
    depth: u32,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), MediadeskError>> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_REMOTE_DEPTH {
            return Ok(());
        }
        let body = match client.get(url).send().await {
            Ok(response) => response
                .text()
                .await
                .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?,
            Err(err) => {
                if depth == 0 {
                    return Err(MediadeskError::EnumerationFailed(err.to_string()));
                }
                warn!(url = %url, error = %err, "skipping unreachable remote subdirectory");
                return Ok(());
            }
        };

        for link in extract_links(&body) {
            let resolved = resolve_link(url, &link);
            if resolved.to_lowercase().ends_with(".xml") {
                out.push(resolved);
            } else if looks_like_subdirectory(&link) {
                scrape_index(client, &resolved, out, depth + 1).await?;
            }
        }
        Ok(())
    })
}

/// A minimal `href="..."` anchor-link scraper; deliberately tolerant of
/// malformed HTML since index pages vary widely across wire providers.
fn extract_links(body: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("href=\"") {
        rest = &rest[start + "href=\"".len()..];
        if let Some(end) = rest.find('"') {
            links.push(rest[..end].to_string());
            rest = &rest[end + 1..];
        } else {
            break;
        }
    }
    links
}

fn looks_like_subdirectory(link: &str) -> bool {
    link.ends_with('/') && !link.starts_with("..") && link != "/"
}

fn resolve_link(base: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if let Some(stripped) = base.strip_suffix('/') {
        format!("{stripped}/{link}")
    } else {
        format!("{base}/{link}")
    }
}

async fn probe_direct_file(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<String>, MediadeskError> {
    if !url.to_lowercase().ends_with(".xml") {
        return Ok(None);
    }
    match client.head(url).send().await {
        Ok(response) if response.status().is_success() => Ok(Some(url.to_string())),
        _ => Ok(None),
    }
}

async fn stage_to_scratch(
    client: &reqwest::Client,
    scratch_root: &Path,
    url: &str,
) -> Result<PathBuf, MediadeskError> {
    let file_name = url.rsplit('/').next().unwrap_or("item.xml");
    let scratch_path = scratch_root.join(format!("{}_{file_name}", uuid::Uuid::new_v4()));

    let bytes = client
        .get(url)
        .send()
        .await
        .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?
        .bytes()
        .await
        .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?;

    std::fs::write(&scratch_path, &bytes)
        .map_err(|err| MediadeskError::EnumerationFailed(err.to_string()))?;

    Ok(scratch_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn enumerates_local_xml_files_in_sorted_order() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("b")).unwrap();
        std::fs::create_dir_all(root.path().join("a")).unwrap();
        std::fs::write(root.path().join("b/2.xml"), "<x/>").unwrap();
        std::fs::write(root.path().join("a/1.xml"), "<x/>").unwrap();
        std::fs::write(root.path().join("a/note.txt"), "not xml").unwrap();

        let items = enumerate(root.path().to_str().unwrap()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].origin.ends_with("a/1.xml") || items[0].origin.ends_with("a\\1.xml"));
    }

    #[tokio::test]
    async fn returns_no_input_when_local_root_is_empty() {
        let root = tempdir().unwrap();
        let err = enumerate(root.path().to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, MediadeskError::NoInput(_)));
    }

    #[tokio::test]
    async fn returns_enumeration_failed_when_local_root_is_missing() {
        let err = enumerate("/no/such/directory/at/all").await.unwrap_err();
        assert!(matches!(err, MediadeskError::EnumerationFailed(_)));
    }

    #[test]
    fn extracts_anchor_hrefs() {
        let body = r#"<a href="2024-01-01_ABC_MED_1.xml">x</a><a href="subdir/">y</a>"#;
        let links = extract_links(body);
        assert_eq!(links, vec!["2024-01-01_ABC_MED_1.xml", "subdir/"]);
    }
}
