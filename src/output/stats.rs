//! Crawl and dataset statistics
//!
//! `CrawlStatistics` is filled in by the walker while a run progresses.
//! `DatasetStatistics` is computed from the CSV files a run left behind.

use crate::storage::{read_records, Author, Quote, SinkError};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Counters for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished successfully
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages fetched
    pub pages_fetched: u64,

    /// Quotes extracted across all pages
    pub quotes_extracted: u64,

    /// Author references seen (one per quote)
    pub author_references: u64,

    /// Author pages fetched and recorded
    pub authors_fetched: u64,

    /// Author references answered by the dedup cache
    pub cache_hits: u64,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    /// Creates zeroed statistics stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_fetched: 0,
            quotes_extracted: 0,
            author_references: 0,
            authors_fetched: 0,
            cache_hits: 0,
        }
    }

    /// Marks the run as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Share of author references served without a fetch, as a percentage
    pub fn cache_hit_rate(&self) -> f64 {
        if self.author_references == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / self.author_references as f64) * 100.0
    }
}

/// Prints crawl statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Quote-Ripple Crawl Summary ===\n");
    println!("Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(secs) = stats.duration_seconds() {
        println!("Duration: {:.1}s", secs);
    }

    println!("\nPages fetched:      {}", stats.pages_fetched);
    println!("Quotes extracted:   {}", stats.quotes_extracted);
    println!("Author references:  {}", stats.author_references);
    println!("Authors fetched:    {}", stats.authors_fetched);
    println!(
        "Cache hits:         {} ({:.1}%)",
        stats.cache_hits,
        stats.cache_hit_rate()
    );
}

/// Summary of the datasets on disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStatistics {
    /// Rows in the quotes file
    pub quotes: usize,

    /// Distinct author display names among the quotes
    pub quoted_authors: usize,

    /// Rows in the authors file
    pub authors: usize,

    /// Author rows sharing their full name with another row
    ///
    /// Rows carry no author URL, so this matches on names only. Two distinct
    /// authors with the same name are counted too.
    pub name_collisions: usize,

    /// Distinct tags across all quotes
    pub unique_tags: usize,

    /// Most used tags, highest count first, ties by name
    pub top_tags: Vec<(String, usize)>,
}

/// Computes dataset statistics from in-memory records
pub fn dataset_statistics(quotes: &[Quote], authors: &[Author], top: usize) -> DatasetStatistics {
    let quoted_authors: HashSet<&str> = quotes.iter().map(|q| q.author.as_str()).collect();

    let mut tag_counts: HashMap<&str, usize> = HashMap::new();
    for tag in quotes.iter().flat_map(|q| q.tags.iter()) {
        *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for author in authors {
        *name_counts.entry(author.full_name.as_str()).or_insert(0) += 1;
    }
    let name_collisions = name_counts.values().filter(|c| **c > 1).sum();

    let mut top_tags: Vec<(String, usize)> = tag_counts
        .iter()
        .map(|(tag, count)| (tag.to_string(), *count))
        .collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_tags.truncate(top);

    DatasetStatistics {
        quotes: quotes.len(),
        quoted_authors: quoted_authors.len(),
        authors: authors.len(),
        name_collisions,
        unique_tags: tag_counts.len(),
        top_tags,
    }
}

/// Loads both datasets and computes their statistics
///
/// A missing file counts as an empty dataset.
pub fn load_dataset_statistics(
    quotes_path: &Path,
    authors_path: &Path,
    top: usize,
) -> Result<DatasetStatistics, SinkError> {
    let quotes: Vec<Quote> = if quotes_path.exists() {
        read_records(quotes_path)?
    } else {
        Vec::new()
    };

    let authors: Vec<Author> = if authors_path.exists() {
        read_records(authors_path)?
    } else {
        Vec::new()
    };

    Ok(dataset_statistics(&quotes, &authors, top))
}

/// Prints dataset statistics to stdout
pub fn print_dataset_statistics(stats: &DatasetStatistics) {
    println!("Quotes:            {}", stats.quotes);
    println!("Quoted authors:    {}", stats.quoted_authors);
    println!("Author records:    {}", stats.authors);
    if stats.name_collisions > 0 {
        println!(
            "Repeated names:    {} (matched by full name; usually several runs appended)",
            stats.name_collisions
        );
    }
    println!("Unique tags:       {}", stats.unique_tags);

    if !stats.top_tags.is_empty() {
        println!("\nTop tags:");
        for (tag, count) in &stats.top_tags {
            println!("  {:<20} {}", tag, count);
        }
    }
}
