//! Output module for crawl reporting
//!
//! This module handles:
//! - Recording per-run counters (pages, quotes, author fetches, cache hits)
//! - Printing a run summary after a successful crawl
//! - Summarizing existing CSV datasets for `--stats`

pub mod stats;

pub use stats::{
    dataset_statistics, load_dataset_statistics, print_dataset_statistics, print_statistics,
    CrawlStatistics, DatasetStatistics,
};
