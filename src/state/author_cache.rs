//! Run-scoped author dedup cache
//!
//! Holds the canonical URLs of every author already claimed in the current
//! run. A fresh cache is built for each run and shared with the author
//! workers behind an `Arc`; there is no global instance.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Set of canonical author URLs resolved during one run
#[derive(Debug, Default)]
pub struct AuthorCache {
    seen: Mutex<HashSet<String>>,
}

impl AuthorCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks for and inserts `url`
    ///
    /// Returns true if the URL was absent, in which case the caller now owns
    /// the one and only fetch for that author. Membership test and insert
    /// happen under a single lock acquisition, so two concurrent claims of
    /// the same URL can never both succeed.
    pub fn claim(&self, url: &Url) -> bool {
        self.lock().insert(url.as_str().to_string())
    }

    /// Returns true if `url` has already been claimed in this run
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(url.as_str())
    }

    /// Number of distinct authors claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a HashSet half-inserted,
    // so a poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
