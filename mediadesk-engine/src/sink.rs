// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Single-writer, append-only CSV sink. The only writer to `outputPath`;
//! the header is written exactly once per output file per run.

use std::path::{Path, PathBuf};

use mediadesk_domain::{ExtractedRecord, MediadeskError, CSV_COLUMNS};

/// Wraps a `csv::Writer` so every accepted [`ExtractedRecord`] is
/// serialized in the fixed 37-column order.
pub struct CsvSink {
    writer: csv::Writer<std::fs::File>,
    path: PathBuf,
}

impl CsvSink {
    /// Opens `path` for a fresh run: truncates and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, MediadeskError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))?;
        }
        let mut writer = csv::WriterBuilder::new()
            .from_path(&path)
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))?;
        writer
            .write_record(CSV_COLUMNS)
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))?;
        Ok(Self { writer, path })
    }

    /// Reopens `path` in append mode for a resumed run. The header is
    /// assumed already present and is not rewritten (invariant I5).
    pub fn append(path: impl AsRef<Path>) -> Result<Self, MediadeskError> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))?;
        let writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        Ok(Self { writer, path })
    }

    /// Writes one accepted record as a single CSV row.
    pub fn write(&mut self, record: &ExtractedRecord) -> Result<(), MediadeskError> {
        self.writer
            .write_record(record.to_csv_fields())
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))
    }

    pub fn flush(&mut self) -> Result<(), MediadeskError> {
        self.writer
            .flush()
            .map_err(|err| MediadeskError::SinkWriteError(err.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_header_exactly_once_on_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut sink = CsvSink::create(&path).unwrap();
            sink.write(&ExtractedRecord::default()).unwrap();
            sink.flush().unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().next().unwrap().starts_with("city,year,month"));
    }

    #[test]
    fn append_does_not_rewrite_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut sink = CsvSink::create(&path).unwrap();
            sink.write(&ExtractedRecord::default()).unwrap();
        }
        {
            let mut sink = CsvSink::append(&path).unwrap();
            sink.write(&ExtractedRecord::default()).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn escapes_values_containing_commas_and_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut record = ExtractedRecord::default();
        record.headline = "Breaking, \"News\"".to_string();
        {
            let mut sink = CsvSink::create(&path).unwrap();
            sink.write(&record).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Breaking, \"\"News\"\"\""));
    }
}
