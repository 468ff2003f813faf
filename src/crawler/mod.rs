//! Crawler module for listing traversal and author resolution
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Quote and author extraction from HTML
//! - Author dedup and resolution, inline or through a worker pool
//! - The pagination walk itself

mod fetcher;
mod parser;
mod pool;
mod resolver;
mod walker;

pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use parser::{extract_quotes, has_next_page, parse_author, parse_listing, ListingPage, QuoteEntry};
pub use pool::{AuthorPool, Batch};
pub use resolver::{AuthorResolver, Claim, Resolution};
pub use walker::Walker;

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::storage::{Author, CsvSink, Quote, RecordSink};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Crawls the listing, streaming authors to `authors` and writing all
/// quotes to `quotes` once the walk completes
///
/// Nothing is written to `quotes` if the walk fails.
pub async fn crawl_into(
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    authors: Box<dyn RecordSink<Author>>,
    quotes: &mut dyn RecordSink<Quote>,
) -> Result<CrawlStatistics, CrawlError> {
    let mut walker = Walker::new(config, fetcher, authors)?;
    let collected = walker.crawl().await?;
    quotes.write_all(&collected)?;
    Ok(walker.into_statistics())
}

/// Runs a complete crawl over HTTP into two CSV files
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `quotes_path` - Quotes file, replaced at the end of a successful run
/// * `authors_path` - Authors file, appended to as authors are discovered
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed; the authors file may hold the authors
///   resolved before the failure
///
/// # Example
///
/// ```no_run
/// use quote_ripple::config::Config;
/// use quote_ripple::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(Config::default(), Path::new("quotes.csv"), Path::new("authors.csv")).await?;
/// println!("{} quotes", stats.quotes_extracted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    quotes_path: &Path,
    authors_path: &Path,
) -> Result<CrawlStatistics, CrawlError> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
    let authors = Box::new(CsvSink::<Author>::new(authors_path));
    let mut quotes = CsvSink::<Quote>::new(quotes_path);

    let stats = crawl_into(config, fetcher, authors, &mut quotes).await?;

    tracing::info!(
        "Wrote {} quotes to {}",
        stats.quotes_extracted,
        quotes_path.display()
    );
    Ok(stats)
}
