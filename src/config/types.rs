use serde::Deserialize;

/// Main configuration structure for Quote-Ripple
///
/// Every section is optional in the TOML file; missing sections fall back
/// to the defaults that target the public quotes listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Listing location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the listing; page 1 is fetched from here verbatim
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path template for pages 2 and up, `{n}` is replaced by the page index
    #[serde(rename = "page-path")]
    pub page_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quotes.toscrape.com/".to_string(),
            page_path: "/page/{n}".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of listing pages to walk (0 = follow the site until it stops)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Number of concurrent author page fetches
    #[serde(rename = "author-workers")]
    pub author_workers: u32,

    /// Capacity of the author job queue
    #[serde(rename = "queue-depth")]
    pub queue_depth: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            author_workers: 4,
            queue_depth: 32,
        }
    }
}

impl CrawlerConfig {
    /// Returns the page bound, if one is configured
    pub fn page_limit(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Retries for transient failures (5xx, timeout, connect)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds, multiplied by the attempt number
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler (optional)
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "QuoteRipple".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}
