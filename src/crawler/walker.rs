//! Pagination walker - main crawl orchestration logic
//!
//! The walker drives the listing one page at a time through the
//! [`WalkState`] machine:
//! - fetch page `n` (page 1 is the bare base URL)
//! - extract its quotes and resolve their authors
//! - check for the next page affordance and either continue or stop
//!
//! Page fetches are strictly sequential. Author pages are fetched inline
//! with one worker, or through an [`AuthorPool`] with more.

use crate::config::Config;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::parse_listing;
use crate::crawler::pool::AuthorPool;
use crate::crawler::resolver::{AuthorResolver, Claim, Resolution};
use crate::output::CrawlStatistics;
use crate::state::{AuthorCache, WalkState};
use crate::storage::{Author, Quote, RecordSink};
use crate::url::{page_url, site_base};
use crate::CrawlError;
use std::sync::Arc;
use url::Url;

/// Main crawler structure for one run
pub struct Walker {
    config: Arc<Config>,
    base: Url,
    fetcher: Arc<dyn PageFetcher>,
    resolver: Arc<AuthorResolver>,
    authors: Box<dyn RecordSink<Author>>,
    state: WalkState,
    stats: CrawlStatistics,
}

impl Walker {
    /// Creates a walker with a fresh, empty author cache
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Transport used for listing and author pages
    /// * `authors` - Sink receiving each newly resolved author
    ///
    /// # Returns
    ///
    /// * `Ok(Walker)` - Ready to crawl
    /// * `Err(CrawlError)` - The configured base URL is invalid
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        authors: Box<dyn RecordSink<Author>>,
    ) -> Result<Self, CrawlError> {
        let base = site_base(&config.site)?;
        let resolver = fresh_resolver(&base, &fetcher);

        Ok(Self {
            config: Arc::new(config),
            base,
            fetcher,
            resolver,
            authors,
            state: WalkState::Start,
            stats: CrawlStatistics::new(),
        })
    }

    /// Current position in the walk
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Counters collected so far
    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Consumes the walker, returning its counters
    pub fn into_statistics(self) -> CrawlStatistics {
        self.stats
    }

    /// The author dedup cache of this run
    pub fn cache(&self) -> &AuthorCache {
        self.resolver.cache()
    }

    /// Walks every listing page and returns the quotes in traversal order
    ///
    /// New authors are appended to the author sink as they are resolved, in
    /// first-encountered order. Any fetch, parse or sink failure aborts the
    /// walk; quotes gathered so far are discarded with it.
    ///
    /// Every call is a new run with an empty author cache and zeroed counters.
    pub async fn crawl(&mut self) -> Result<Vec<Quote>, CrawlError> {
        self.resolver = fresh_resolver(&self.base, &self.fetcher);
        self.stats = CrawlStatistics::new();

        let workers = self.config.crawler.author_workers as usize;
        let mut pool = (workers > 1).then(|| {
            AuthorPool::spawn(
                Arc::clone(&self.resolver),
                workers,
                self.config.crawler.queue_depth as usize,
            )
        });

        let result = self.walk(pool.as_mut()).await;

        if let Some(pool) = pool {
            let shutdown = pool.shutdown().await;
            if result.is_ok() {
                shutdown?;
            }
        }

        if result.is_ok() {
            self.stats.finish();
        }
        result
    }

    async fn walk(&mut self, mut pool: Option<&mut AuthorPool>) -> Result<Vec<Quote>, CrawlError> {
        tracing::info!("Starting crawl of {}", self.base);

        let mut quotes = Vec::new();
        let mut page = self.base.clone();
        let mut body = String::new();
        let mut has_next = false;

        self.state = WalkState::Start;

        loop {
            let next = match self.state {
                WalkState::Start => WalkState::FetchPage(1),

                WalkState::FetchPage(n) => {
                    page = page_url(&self.base, &self.config.site.page_path, n)?;
                    tracing::info!("Fetching page {}: {}", n, page);
                    body = self.fetcher.fetch(&page).await?;
                    self.stats.pages_fetched += 1;
                    WalkState::ExtractPage(n)
                }

                WalkState::ExtractPage(n) => {
                    let listing = parse_listing(&std::mem::take(&mut body), &page)?;
                    has_next = listing.has_next;

                    let mut references = Vec::with_capacity(listing.entries.len());
                    let page_quotes = listing.entries.len();
                    for entry in listing.entries {
                        references.push(entry.author_ref);
                        quotes.push(entry.quote);
                    }
                    self.stats.quotes_extracted += page_quotes as u64;
                    tracing::debug!("Page {} yielded {} quotes", n, page_quotes);

                    self.resolve_authors(&references, pool.as_deref_mut())
                        .await?;
                    WalkState::CheckNext(n)
                }

                WalkState::CheckNext(n) => {
                    if !has_next {
                        WalkState::Done
                    } else {
                        if let Some(limit) = self.config.crawler.page_limit() {
                            if n >= limit {
                                return Err(CrawlError::PageLimitExceeded { limit });
                            }
                        }
                        let following = n
                            .checked_add(1)
                            .ok_or(CrawlError::PageLimitExceeded { limit: u32::MAX })?;
                        WalkState::FetchPage(following)
                    }
                }

                WalkState::Done => break,
            };

            tracing::trace!("Walk transition {} -> {}", self.state, next);
            self.state = self.state.transition(next)?;
        }

        tracing::info!(
            "Crawl finished: {} pages, {} quotes, {} authors",
            self.stats.pages_fetched,
            quotes.len(),
            self.stats.authors_fetched
        );

        Ok(quotes)
    }

    /// Resolves the author references of one page, in document order
    async fn resolve_authors(
        &mut self,
        references: &[String],
        pool: Option<&mut AuthorPool>,
    ) -> Result<(), CrawlError> {
        match pool {
            None => {
                for reference in references {
                    self.stats.author_references += 1;
                    match self.resolver.resolve(reference).await? {
                        Resolution::NewAuthor(author) => self.record_author(&author)?,
                        Resolution::AlreadyResolved => self.stats.cache_hits += 1,
                    }
                }
            }
            Some(pool) => {
                // Claim in document order so discovery order is fixed before
                // any fetch starts
                let mut fresh = Vec::new();
                for reference in references {
                    self.stats.author_references += 1;
                    match self.resolver.claim(reference)? {
                        Claim::New(url) => fresh.push(url),
                        Claim::AlreadyResolved(url) => {
                            tracing::debug!("Author {} already resolved", url);
                            self.stats.cache_hits += 1;
                        }
                    }
                }

                let batch = pool.fetch_all(fresh).await?;
                for author in &batch.authors {
                    self.record_author(author)?;
                }
                if let Some(failure) = batch.failure {
                    return Err(failure);
                }
            }
        }

        Ok(())
    }

    fn record_author(&mut self, author: &Author) -> Result<(), CrawlError> {
        self.authors.append_record(author)?;
        self.stats.authors_fetched += 1;
        tracing::info!("New author: {}", author.full_name.trim());
        Ok(())
    }
}

fn fresh_resolver(base: &Url, fetcher: &Arc<dyn PageFetcher>) -> Arc<AuthorResolver> {
    Arc::new(AuthorResolver::new(
        base.clone(),
        Arc::new(AuthorCache::new()),
        Arc::clone(fetcher),
    ))
}
