//! CSV file sink
//!
//! Appends are serialized in memory and written with a single `write_all`
//! on an append-mode handle; a failed write truncates the file back to its
//! previous length. Full rewrites go through a temporary file in the same
//! directory that is renamed over the destination.

use crate::storage::traits::{Record, RecordSink, SinkError, SinkResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A record sink backed by one CSV file
#[derive(Debug)]
pub struct CsvSink<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> CsvSink<R> {
    /// Creates a sink for `path`; the file is not touched until the first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// The destination file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Record> RecordSink<R> for CsvSink<R> {
    fn append_record(&mut self, record: &R) -> SinkResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let prior_len = file.metadata()?.len();
        let bytes = encode_rows(std::slice::from_ref(record), prior_len == 0)?;

        if let Err(e) = file.write_all(&bytes).and_then(|_| file.flush()) {
            roll_back(&file, &self.path, prior_len);
            return Err(e.into());
        }

        Ok(())
    }

    fn write_all(&mut self, records: &[R]) -> SinkResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let bytes = encode_rows(records, true)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        tracing::debug!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Truncates `file` to `len` after a failed append
///
/// Returns false, after logging, when the partial row could not be removed.
fn roll_back(file: &File, path: &Path, len: u64) -> bool {
    match file.set_len(len) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "Failed to truncate {} back to {} bytes after a failed append: {}",
                path.display(),
                len,
                e
            );
            false
        }
    }
}

/// Serializes `records` (optionally preceded by the header row) into CSV bytes
fn encode_rows<R: Record>(records: &[R], with_header: bool) -> SinkResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(R::SCHEMA)?;
    }

    for record in records {
        writer.write_record(record.to_row()?)?;
    }

    writer
        .into_inner()
        .map_err(|e| SinkError::Io(e.into_error()))
}

/// Reads every record from a CSV file written by [`CsvSink`]
///
/// # Returns
///
/// * `Ok(Vec<R>)` - Records in file order
/// * `Err(SinkError::SchemaMismatch)` - The header row does not match `R::SCHEMA`
/// * `Err(SinkError::Malformed)` - A row could not be decoded
pub fn read_records<R: Record>(path: &Path) -> SinkResult<Vec<R>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if !headers.iter().eq(R::SCHEMA.iter().copied()) {
        return Err(SinkError::SchemaMismatch {
            path: path.display().to_string(),
            expected: R::SCHEMA.iter().map(|s| s.to_string()).collect(),
            found: headers.iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = R::from_row(&row).map_err(|message| SinkError::Malformed {
            path: path.display().to_string(),
            line: row.position().map(|p| p.line()).unwrap_or(0),
            message,
        })?;
        records.push(record);
    }

    Ok(records)
}
