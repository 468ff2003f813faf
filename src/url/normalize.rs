use crate::UrlError;
use url::Url;

/// Reduces an absolute URL to its canonical form, the author dedup key
///
/// # Normalization Steps
///
/// 1. Reject schemes other than http and https
/// 2. Reject URLs without a host
/// 3. Remove fragment (everything after #)
/// 4. Remove empty query string (trailing ?)
///
/// Host lowercasing and default-port removal are already performed by the
/// `url` parser. Paths are left untouched: `/author/x` and `/author/x/` are
/// different references.
///
/// # Examples
///
/// ```
/// use quote_ripple::url::canonicalize;
/// use url::Url;
///
/// let url = canonicalize(Url::parse("HTTP://Example.COM:80/author/Jane?#bio").unwrap()).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/author/Jane");
/// ```
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
