use crate::storage::traits::{Record, RecordSink, SinkResult};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory record sink
///
/// Clones share the same buffer, so a test can hand one clone to the
/// crawler and inspect the records through another.
#[derive(Debug)]
pub struct MemorySink<R> {
    records: Arc<Mutex<Vec<R>>>,
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<R> Clone for MemorySink<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R: Clone> MemorySink<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records written so far
    pub fn records(&self) -> Vec<R> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record + Clone + Send> RecordSink<R> for MemorySink<R> {
    fn append_record(&mut self, record: &R) -> SinkResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn write_all(&mut self, records: &[R]) -> SinkResult<()> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        Ok(())
    }
}
