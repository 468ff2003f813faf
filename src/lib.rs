//! Quote-Ripple: a paginated quote crawler
//!
//! This crate walks a paginated listing of quotes, extracts one record per
//! quote and fetches each referenced author's detail page exactly once per run.
//! Quotes and authors are written to two CSV datasets.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Quote-Ripple operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::WalkState,
        to: state::WalkState,
    },

    #[error("Listing still advertises a next page after {limit} pages")]
    PageLimitExceeded { limit: u32 },

    #[error("Author worker pool failure: {0}")]
    WorkerPool(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Transport-level failures while fetching a listing or author page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Http { url, .. } => url,
        }
    }

    /// Returns true if a later attempt may succeed (5xx, timeout, connect)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Http { .. } => false,
        }
    }
}

/// An expected element or attribute is absent from fetched content
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing field '{field}' in {url}")]
    MissingField { url: String, field: &'static str },

    #[error("Missing attribute '{attribute}' on field '{field}' in {url}")]
    MissingAttribute {
        url: String,
        field: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{input}': {source}")]
    Parse {
        input: String,
        source: ::url::ParseError,
    },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Quote-Ripple operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Walker};
pub use state::{AuthorCache, WalkState};
pub use storage::{Author, Quote};
