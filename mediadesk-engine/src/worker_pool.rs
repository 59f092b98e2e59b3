// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Runs C2 (extract) + C3 (resolve) + C4 (filter) + C5 (move) for a batch
//! of [`WorkItem`]s with bounded, global concurrency and a per-task
//! timeout. Tasks are independent; a panicking or timed-out task never
//! affects its peers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mediadesk_domain::services::{DefaultFilterEvaluator, FilterEvaluator};
use mediadesk_domain::{ExtractedRecord, FilterSpec, MediadeskError, WorkItem, WorkerCount};
use tokio::sync::Semaphore;

use crate::mover::{self, RemoteStructure};
use crate::resolver;
use crate::xml;

/// Per-task hard upper bound (§4.6): a task that exceeds this yields a
/// timeout error rather than blocking the pool indefinitely.
const TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// The outcome of running one [`WorkItem`] through extract/resolve/filter/move.
#[derive(Debug, Clone)]
pub struct ResultEnvelope {
    pub worker_id: u64,
    pub record: Option<ExtractedRecord>,
    pub passed: bool,
    pub moved: bool,
    pub error: Option<MediadeskError>,
}

impl ResultEnvelope {
    fn error(worker_id: u64, error: MediadeskError) -> Self {
        Self {
            worker_id,
            record: None,
            passed: false,
            moved: false,
            error: Some(error),
        }
    }
}

/// Bounded, global task pool: at most `numWorkers` tasks run concurrently
/// regardless of how many batches/chunks call [`WorkerPool::run_batch`].
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    filter_spec: FilterSpec,
    original_root: PathBuf,
}

impl WorkerPool {
    pub fn new(num_workers: WorkerCount, filter_spec: FilterSpec, original_root: PathBuf) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(usize::from(num_workers))),
            filter_spec,
            original_root,
        }
    }

    /// Dispatches every item in `items` and returns once all have
    /// completed (or timed out). Completion order is task-completion
    /// order, not submission order.
    pub async fn run_batch(&self, items: Vec<WorkItem>) -> Vec<ResultEnvelope> {
        let mut receiver = self.dispatch_batch(items);
        let mut results = Vec::new();
        while let Some(envelope) = receiver.recv().await {
            results.push(envelope);
        }
        results
    }

    /// Dispatches every item in `items`, forwarding each [`ResultEnvelope`]
    /// on the returned channel as soon as its task completes (not in
    /// submission order). The channel closes once every task has
    /// completed.
    pub fn dispatch_batch(&self, items: Vec<WorkItem>) -> tokio::sync::mpsc::UnboundedReceiver<ResultEnvelope> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        if items.is_empty() {
            return rx;
        }

        for item in items {
            let semaphore = self.semaphore.clone();
            let filter_spec = self.filter_spec.clone();
            let original_root = self.original_root.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let permit = semaphore.acquire().await.expect("semaphore not closed");
                let envelope = run_one(item, &filter_spec, &original_root).await;
                drop(permit);
                let _ = tx.send(envelope);
            });
        }
        rx
    }
}

async fn run_one(item: WorkItem, filter_spec: &FilterSpec, original_root: &std::path::Path) -> ResultEnvelope {
    let worker_id = item.worker_id;
    match tokio::time::timeout(TASK_TIMEOUT, process(item, filter_spec, original_root)).await {
        Ok(envelope) => envelope,
        Err(_) => ResultEnvelope::error(
            worker_id,
            MediadeskError::TaskTimeout(format!("worker {worker_id} exceeded 30s")),
        ),
    }
}

async fn process(item: WorkItem, filter_spec: &FilterSpec, original_root: &std::path::Path) -> ResultEnvelope {
    let worker_id = item.worker_id;

    let bytes = match std::fs::read(item.read_path()) {
        Ok(bytes) => bytes,
        Err(err) => return ResultEnvelope::error(worker_id, MediadeskError::IoError(err.to_string())),
    };

    let mut record = match xml::extract(&bytes, &item.origin) {
        Ok(record) => record,
        Err(err) => return ResultEnvelope::error(worker_id, err),
    };

    if item.is_remote() {
        let client = reqwest::Client::new();
        let resolved = resolver::resolve_remote(&client, &item.origin, &record.image_href).await;
        apply_resolution(&mut record, resolved);
    } else {
        let resolved = resolver::resolve_local(
            std::path::Path::new(&item.origin),
            &record.image_href,
            item.pre_bound_image_path.as_deref(),
        );
        apply_resolution(&mut record, resolved);
    }

    let outcome = DefaultFilterEvaluator.evaluate(filter_spec, &record);
    if !outcome.passed {
        return ResultEnvelope {
            worker_id,
            record: Some(record),
            passed: false,
            moved: false,
            error: None,
        };
    }

    let mut moved = false;
    if filter_spec.move_spec.enabled && record.has_image() {
        let source = std::path::PathBuf::from(&record.image_path);
        let remote_structure = item.is_remote().then(|| RemoteStructure {
            city: &record.city,
            year: &record.year,
            month: &record.month,
        });
        match mover::move_image(&source, &filter_spec.move_spec, original_root, remote_structure) {
            Ok(_) => moved = true,
            Err(err) => tracing::warn!(worker_id, error = %err, "image move failed"),
        }
    }

    ResultEnvelope {
        worker_id,
        record: Some(record),
        passed: true,
        moved,
        error: None,
    }
}

fn apply_resolution(record: &mut ExtractedRecord, resolved: resolver::ResolvedImage) {
    record.image_path = resolved.image_path;
    record.image_exists = if resolved.image_exists { "Yes" } else { "No" }.to_string();
    record.actual_file_size = resolved.actual_file_size;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadesk_domain::MoveSpec;
    use std::collections::BTreeSet;

    fn disabled_filter() -> FilterSpec {
        FilterSpec {
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

    const NEWSML: &str = r#"<NewsML><NewsItem><NewsComponent>
      <Role FormalName="PICTURE"/>
      <ContentItem><MediaType FormalName="HIGHRES"/><Href>a.jpg</Href></ContentItem>
    </NewsComponent></NewsItem></NewsML>"#;

    #[tokio::test]
    async fn runs_a_batch_and_reports_missing_image_as_not_exists() {
        let dir = tempfile::tempdir().unwrap();
        let xml_dir = dir.path().join("2024/01");
        std::fs::create_dir_all(&xml_dir).unwrap();
        let xml_path = xml_dir.join("item.xml");
        std::fs::write(&xml_path, NEWSML).unwrap();

        let item = WorkItem::local(xml_path.display().to_string(), dir.path().display().to_string(), 0);
        let pool = WorkerPool::new(WorkerCount::default_count(), disabled_filter(), dir.path().to_path_buf());
        let results = pool.run_batch(vec![item]).await;

        assert_eq!(results.len(), 1);
        let record = results[0].record.as_ref().unwrap();
        assert_eq!(record.image_exists, "No");
        assert!(results[0].passed);
    }

    #[tokio::test]
    async fn malformed_xml_yields_an_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let xml_path = dir.path().join("item.xml");
        std::fs::write(&xml_path, "<Other/>").unwrap();

        let item = WorkItem::local(xml_path.display().to_string(), dir.path().display().to_string(), 0);
        let pool = WorkerPool::new(WorkerCount::default_count(), disabled_filter(), dir.path().to_path_buf());
        let results = pool.run_batch(vec![item]).await;

        assert!(results[0].error.is_some());
        assert!(results[0].record.is_none());
    }
}
