//! Record sink traits and error types
//!
//! This module defines the row schema every persisted record follows and
//! the sink interface the crawler writes through.

use csv::StringRecord;
use thiserror::Error;

/// Errors that can occur while writing or reading records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace destination file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Unexpected header in {path}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Malformed row in {path} at line {line}: {message}")]
    Malformed {
        path: String,
        line: u64,
        message: String,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A value that maps onto one tabular row
pub trait Record: Sized {
    /// Column names, written as the header row
    const SCHEMA: &'static [&'static str];

    /// Serializes the record into cells, in `SCHEMA` order
    fn to_row(&self) -> SinkResult<Vec<String>>;

    /// Rebuilds a record from a row read back from storage
    fn from_row(row: &StringRecord) -> Result<Self, String>;
}

/// Destination for completed records
///
/// Each call is atomic from the caller's point of view: it either fully
/// succeeds or leaves the destination as it was before the call.
pub trait RecordSink<R: Record>: Send {
    /// Appends one record, creating the destination with a header row first
    /// if it does not exist yet
    fn append_record(&mut self, record: &R) -> SinkResult<()>;

    /// Replaces the destination with a header row followed by `records`
    fn write_all(&mut self, records: &[R]) -> SinkResult<()>;
}
