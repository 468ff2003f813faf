//! URL handling module for Quote-Ripple
//!
//! This module builds listing page URLs from the configured template and
//! resolves relative author references into canonical absolute URLs.

mod normalize;

pub use normalize::canonicalize;

use crate::config::SiteConfig;
use crate::{UrlError, UrlResult};
use url::Url;

/// Placeholder replaced by the page index in `site.page-path`
pub const PAGE_PLACEHOLDER: &str = "{n}";

/// Parses a base URL, rejecting anything that is not absolute http(s)
pub fn parse_base(base: &str) -> UrlResult<Url> {
    let url = Url::parse(base).map_err(|source| UrlError::Parse {
        input: base.to_string(),
        source,
    })?;
    canonicalize(url)
}

/// Builds the URL for listing page `n`
///
/// Page 1 is the bare base URL. Later pages substitute `n` into the path
/// template and join it against the base, so `/page/{n}` on
/// `https://quotes.toscrape.com/` yields `https://quotes.toscrape.com/page/2`.
pub fn page_url(base: &Url, page_path: &str, n: u32) -> UrlResult<Url> {
    if n <= 1 {
        return Ok(base.clone());
    }

    let path = page_path.replace(PAGE_PLACEHOLDER, &n.to_string());
    base.join(&path).map_err(|source| UrlError::Parse {
        input: path,
        source,
    })
}

/// Resolves an author reference (usually a relative link) to its canonical URL
pub fn resolve_reference(base: &Url, reference: &str) -> UrlResult<Url> {
    let reference = reference.trim();
    let joined = base.join(reference).map_err(|source| UrlError::Parse {
        input: reference.to_string(),
        source,
    })?;
    canonicalize(joined)
}

/// Parses the configured base URL of a site
pub fn site_base(site: &SiteConfig) -> UrlResult<Url> {
    parse_base(&site.base_url)
}
