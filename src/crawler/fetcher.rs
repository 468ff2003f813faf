//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests for listing and author pages
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{Config, HttpConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Source of page content
///
/// The walker and the author resolver only ever see this trait, which keeps
/// the transport swappable in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its body
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and transport sections)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.http.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 4xx | Immediate `FetchError::Status` |
/// | HTTP 5xx | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection refused | Retry up to `max_retries` times |
/// | Other transport error | Immediate `FetchError::Http` |
///
/// The delay before attempt `k` (1-based retry count) is `retry_delay * k`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client, http: &HttpConfig) -> Self {
        Self {
            client,
            max_retries: http.max_retries,
            retry_delay: Duration::from_millis(http.retry_delay_ms),
        }
    }

    /// Builds the client from the configuration and wraps it
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, &config.http))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match fetch_once(&self.client, url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Performs a single GET and classifies the outcome
async fn fetch_once(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify(url, e))
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
