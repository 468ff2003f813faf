//! Author resolution with run-scoped dedup
//!
//! The resolver turns an author reference into a canonical URL, claims it in
//! the [`AuthorCache`] and, only on first sight, fetches and parses the
//! author page. Claiming happens before the fetch starts, so a concurrent
//! resolution of the same reference sees the URL as taken and never fetches.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::parse_author;
use crate::state::AuthorCache;
use crate::storage::Author;
use crate::url::resolve_reference;
use crate::CrawlError;
use std::sync::Arc;
use url::Url;

/// Outcome of resolving one author reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First sight of this author in the run; the record was fetched
    NewAuthor(Author),

    /// The author was already resolved earlier in the run; nothing fetched
    AlreadyResolved,
}

/// Outcome of claiming an author URL without fetching it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller now owns the fetch for this URL
    New(Url),

    /// Another reference already claimed this URL
    AlreadyResolved(Url),
}

/// Resolves author references against one listing base URL
pub struct AuthorResolver {
    base: Url,
    cache: Arc<AuthorCache>,
    fetcher: Arc<dyn PageFetcher>,
}

impl AuthorResolver {
    /// Creates a resolver sharing `cache` for the lifetime of one run
    pub fn new(base: Url, cache: Arc<AuthorCache>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            base,
            cache,
            fetcher,
        }
    }

    /// The dedup cache of the current run
    pub fn cache(&self) -> &AuthorCache {
        &self.cache
    }

    /// Resolves a reference to its canonical absolute URL
    pub fn canonical_url(&self, reference: &str) -> Result<Url, CrawlError> {
        Ok(resolve_reference(&self.base, reference)?)
    }

    /// Canonicalizes `reference` and atomically claims it in the cache
    pub fn claim(&self, reference: &str) -> Result<Claim, CrawlError> {
        let url = self.canonical_url(reference)?;
        if self.cache.claim(&url) {
            Ok(Claim::New(url))
        } else {
            Ok(Claim::AlreadyResolved(url))
        }
    }

    /// Fetches and parses the author page at `url`, bypassing the cache
    ///
    /// Callers must have claimed `url` first.
    pub async fn fetch_author(&self, url: &Url) -> Result<Author, CrawlError> {
        let body = self.fetcher.fetch(url).await?;
        let author = parse_author(&body, url)?;
        Ok(author)
    }

    /// Resolves one author reference
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution::NewAuthor)` - First sight; the author page was fetched
    /// * `Ok(Resolution::AlreadyResolved)` - Seen earlier in this run; no fetch
    /// * `Err(CrawlError::Fetch | CrawlError::Parse)` - The author page could not be loaded
    pub async fn resolve(&self, reference: &str) -> Result<Resolution, CrawlError> {
        match self.claim(reference)? {
            Claim::New(url) => {
                tracing::debug!("Fetching author {}", url);
                let author = self.fetch_author(&url).await?;
                Ok(Resolution::NewAuthor(author))
            }
            Claim::AlreadyResolved(url) => {
                tracing::debug!("Author {} already resolved", url);
                Ok(Resolution::AlreadyResolved)
            }
        }
    }
}
