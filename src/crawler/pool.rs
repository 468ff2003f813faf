//! Bounded worker pool for author page fetches
//!
//! The walker claims author URLs in document order, then hands the newly
//! claimed ones to this pool. Jobs travel over a bounded queue to a fixed
//! number of worker tasks; outcomes come back tagged with their discovery
//! sequence number and are re-ordered before being returned, so authors
//! reach the sink in first-encountered order regardless of completion order.

use crate::crawler::resolver::AuthorResolver;
use crate::storage::Author;
use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use url::Url;

/// One author page to fetch
#[derive(Debug)]
struct AuthorJob {
    seq: usize,
    url: Url,
}

/// Result of one job
#[derive(Debug)]
struct AuthorOutcome {
    seq: usize,
    result: Result<Author, CrawlError>,
}

/// Authors fetched by one batch, up to its first failure
#[derive(Debug)]
pub struct Batch {
    /// Authors in submission order, stopping before the first failed job
    pub authors: Vec<Author>,

    /// The failure with the lowest sequence number, if any
    pub failure: Option<CrawlError>,
}

/// Fixed-size pool of author fetch workers
pub struct AuthorPool {
    jobs: mpsc::Sender<AuthorJob>,
    outcomes: mpsc::UnboundedReceiver<AuthorOutcome>,
    workers: Vec<JoinHandle<()>>,
}

impl AuthorPool {
    /// Spawns `workers` tasks fed by a queue holding at most `queue_depth` jobs
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(resolver: Arc<AuthorResolver>, workers: usize, queue_depth: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel(queue_depth.max(1));
        let job_rx = Arc::new(Mutex::new(job_rx));
        // Unbounded so workers never block on reporting; the job queue is the bound
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let handles = (0..workers.max(1))
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&resolver),
                    Arc::clone(&job_rx),
                    outcome_tx.clone(),
                ))
            })
            .collect();

        tracing::debug!("Started {} author workers", workers.max(1));

        Self {
            jobs: job_tx,
            outcomes: outcome_rx,
            workers: handles,
        }
    }

    /// Fetches every URL in `urls` and returns the authors in the same order
    ///
    /// Waits for all submitted jobs before returning. If any job failed, the
    /// batch holds the authors submitted before the earliest failure together
    /// with that failure. `Err` is reserved for failures of the pool itself.
    pub async fn fetch_all(&mut self, urls: Vec<Url>) -> Result<Batch, CrawlError> {
        let total = urls.len();

        // Sending may wait on a full queue, but workers keep draining it into
        // the unbounded outcome channel, so this loop always makes progress.
        for (seq, url) in urls.into_iter().enumerate() {
            self.jobs
                .send(AuthorJob { seq, url })
                .await
                .map_err(|_| CrawlError::WorkerPool("author job queue closed".to_string()))?;
        }

        let mut slots: Vec<Option<Result<Author, CrawlError>>> =
            std::iter::repeat_with(|| None).take(total).collect();

        for _ in 0..total {
            let outcome = self.outcomes.recv().await.ok_or_else(|| {
                CrawlError::WorkerPool("all author workers exited".to_string())
            })?;
            if let Some(slot) = slots.get_mut(outcome.seq) {
                *slot = Some(outcome.result);
            }
        }

        let mut authors = Vec::with_capacity(total);
        for (seq, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(author)) => authors.push(author),
                Some(Err(e)) => {
                    return Ok(Batch {
                        authors,
                        failure: Some(e),
                    })
                }
                None => {
                    return Ok(Batch {
                        authors,
                        failure: Some(CrawlError::WorkerPool(format!(
                            "no outcome for author job {}",
                            seq
                        ))),
                    })
                }
            }
        }

        Ok(Batch {
            authors,
            failure: None,
        })
    }

    /// Closes the queue and waits for every worker to exit
    pub async fn shutdown(self) -> Result<(), CrawlError> {
        drop(self.jobs);
        for handle in self.workers {
            handle
                .await
                .map_err(|e| CrawlError::WorkerPool(format!("author worker failed: {}", e)))?;
        }
        Ok(())
    }
}

async fn worker_loop(
    id: usize,
    resolver: Arc<AuthorResolver>,
    jobs: Arc<Mutex<mpsc::Receiver<AuthorJob>>>,
    outcomes: mpsc::UnboundedSender<AuthorOutcome>,
) {
    loop {
        let job = {
            let mut rx = jobs.lock().await;
            rx.recv().await
        };
        let Some(AuthorJob { seq, url }) = job else {
            break;
        };

        tracing::debug!("Worker {} fetching author {}", id, url);

        // Run each fetch in its own task so a panic becomes an error outcome
        // instead of a job that never reports back
        let task_resolver = Arc::clone(&resolver);
        let task_url = url.clone();
        let result = tokio::spawn(async move { task_resolver.fetch_author(&task_url).await })
            .await
            .unwrap_or_else(|e| {
                Err(CrawlError::WorkerPool(format!(
                    "author fetch for {} panicked: {}",
                    url, e
                )))
            });

        if outcomes.send(AuthorOutcome { seq, result }).is_err() {
            // The pool owner is gone; nobody is waiting for results
            break;
        }
    }

    tracing::debug!("Author worker {} exiting", id);
}
