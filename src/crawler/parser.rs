//! HTML extraction for listing and author pages
//!
//! This module turns fetched markup into records:
//! - Listing pages yield quotes (text, author name, tags) in document order,
//!   each paired with the author reference link found next to it
//! - Author pages yield one author record
//! - Listing pages are also checked for the "next page" affordance
//!
//! Field text is taken verbatim (all descendant text nodes, untrimmed).

use crate::storage::{Author, Quote};
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const QUOTE: &str = ".quote";
const QUOTE_TEXT: &str = ".text";
const QUOTE_AUTHOR: &str = ".author";
const QUOTE_TAGS: &str = ".tags > .tag";
const AUTHOR_LINK: &str = "span > a";
const NEXT_PAGE: &str = ".next";

const AUTHOR_DETAILS: &str = ".author-details";
const AUTHOR_TITLE: &str = ".author-title";
const AUTHOR_BORN_DATE: &str = ".author-born-date";
const AUTHOR_BORN_LOCATION: &str = ".author-born-location";
const AUTHOR_DESCRIPTION: &str = ".author-description";

/// A quote together with the raw author reference found beside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteEntry {
    pub quote: Quote,
    /// The `href` of the author link, usually relative
    pub author_ref: String,
}

/// Everything the walker needs from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Quotes in document order
    pub entries: Vec<QuoteEntry>,

    /// Whether the page advertises a following page
    pub has_next: bool,
}

/// Parses a listing page
///
/// # Arguments
///
/// * `html` - The page content
/// * `page_url` - The URL the content came from, used in error reports
///
/// # Returns
///
/// * `Ok(ListingPage)` - Quotes in document order plus the next-page flag;
///   a page without quotes yields an empty list
/// * `Err(ParseError)` - A quote element lacks its text, author name or author link
///
/// # Example
///
/// ```
/// use quote_ripple::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<div class="quote">
///     <span class="text">Hello</span>
///     <span>by <small class="author">Someone</small> <a href="/author/Someone">(about)</a></span>
/// </div>"#;
/// let page = parse_listing(html, &Url::parse("https://example.com/").unwrap()).unwrap();
/// assert_eq!(page.entries[0].quote.author, "Someone");
/// assert!(!page.has_next);
/// ```
pub fn parse_listing(html: &str, page_url: &Url) -> Result<ListingPage, ParseError> {
    let document = Html::parse_document(html);

    let entries = extract_quotes(&document, page_url)?;
    let has_next = has_next_page(&document)?;

    Ok(ListingPage { entries, has_next })
}

/// Extracts every quote element of a listing page, in document order
pub fn extract_quotes(document: &Html, page_url: &Url) -> Result<Vec<QuoteEntry>, ParseError> {
    let quote_selector = selector(QUOTE)?;
    let text_selector = selector(QUOTE_TEXT)?;
    let author_selector = selector(QUOTE_AUTHOR)?;
    let tag_selector = selector(QUOTE_TAGS)?;
    let link_selector = selector(AUTHOR_LINK)?;

    let mut entries = Vec::new();

    for element in document.select(&quote_selector) {
        let text = required_text(element, &text_selector, page_url, "text")?;
        let author = required_text(element, &author_selector, page_url, "author")?;

        // A missing tag container is an empty tag list, not an error
        let tags = element
            .select(&tag_selector)
            .map(|tag| tag.text().collect::<String>())
            .collect();

        let link = element
            .select(&link_selector)
            .next()
            .ok_or_else(|| ParseError::MissingField {
                url: page_url.to_string(),
                field: "author link",
            })?;

        let author_ref = link
            .value()
            .attr("href")
            .ok_or_else(|| ParseError::MissingAttribute {
                url: page_url.to_string(),
                field: "author link",
                attribute: "href",
            })?
            .to_string();

        entries.push(QuoteEntry {
            quote: Quote { text, author, tags },
            author_ref,
        });
    }

    Ok(entries)
}

/// Returns true if the page shows a "next page" affordance
pub fn has_next_page(document: &Html) -> Result<bool, ParseError> {
    let next_selector = selector(NEXT_PAGE)?;
    Ok(document.select(&next_selector).next().is_some())
}

/// Parses an author detail page
///
/// `born` is the birth date text immediately followed by the birth location
/// text, joined without a separator.
pub fn parse_author(html: &str, page_url: &Url) -> Result<Author, ParseError> {
    let document = Html::parse_document(html);

    let details_selector = selector(AUTHOR_DETAILS)?;
    let details = document
        .select(&details_selector)
        .next()
        .ok_or_else(|| ParseError::MissingField {
            url: page_url.to_string(),
            field: "author details",
        })?;

    let full_name = required_text(details, &selector(AUTHOR_TITLE)?, page_url, "author title")?;
    let born_date = required_text(
        details,
        &selector(AUTHOR_BORN_DATE)?,
        page_url,
        "author born date",
    )?;
    let born_location = required_text(
        details,
        &selector(AUTHOR_BORN_LOCATION)?,
        page_url,
        "author born location",
    )?;
    let description = required_text(
        details,
        &selector(AUTHOR_DESCRIPTION)?,
        page_url,
        "author description",
    )?;

    Ok(Author {
        full_name,
        born: born_date + &born_location,
        description,
    })
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::InvalidSelector(format!("{}: {:?}", css, e)))
}

/// Text of the first element under `scope` matching `selector`
fn required_text(
    scope: ElementRef<'_>,
    selector: &Selector,
    page_url: &Url,
    field: &'static str,
) -> Result<String, ParseError> {
    scope
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .ok_or_else(|| ParseError::MissingField {
            url: page_url.to_string(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://quotes.toscrape.com/page/2").unwrap()
    }

    fn quote_html(text: &str, author: &str, href: &str, tags: &[&str]) -> String {
        let tags: String = tags
            .iter()
            .map(|t| format!(r#"<a class="tag" href="/tag/{t}/page/1/">{t}</a>"#))
            .collect();
        format!(
            r#"<div class="quote">
                <span class="text">{text}</span>
                <span>by <small class="author">{author}</small>
                <a href="{href}">(about)</a></span>
                <div class="tags">Tags: {tags}</div>
            </div>"#
        )
    }

    #[test]
    fn test_extracts_quotes_in_document_order() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            quote_html("First", "Albert Einstein", "/author/Albert-Einstein", &["change", "thinking"]),
            quote_html("Second", "J.K. Rowling", "/author/J-K-Rowling", &["abilities"]),
        );

        let page = parse_listing(&html, &page_url()).unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].quote.text, "First");
        assert_eq!(page.entries[0].quote.author, "Albert Einstein");
        assert_eq!(page.entries[0].quote.tags, vec!["change", "thinking"]);
        assert_eq!(page.entries[0].author_ref, "/author/Albert-Einstein");
        assert_eq!(page.entries[1].quote.text, "Second");
        assert_eq!(page.entries[1].author_ref, "/author/J-K-Rowling");
    }

    #[test]
    fn test_tag_order_and_duplicates_preserved() {
        let html = quote_html("T", "A", "/author/A", &["zeta", "alpha", "zeta"]);
        let page = parse_listing(&html, &page_url()).unwrap();
        assert_eq!(page.entries[0].quote.tags, vec!["zeta", "alpha", "zeta"]);
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let html = r#"<div class="quote">
            <span class="text">  “Spaced” <b>bold</b> </span>
            <span>by <small class="author">A</small> <a href="/author/A">(about)</a></span>
        </div>"#;
        let page = parse_listing(html, &page_url()).unwrap();
        assert_eq!(page.entries[0].quote.text, "  “Spaced” bold ");
    }

    #[test]
    fn test_empty_page_yields_no_quotes() {
        let page = parse_listing("<html><body><p>No quotes found!</p></body></html>", &page_url())
            .unwrap();
        assert!(page.entries.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn test_missing_tag_container_is_empty_list() {
        let html = r#"<div class="quote">
            <span class="text">No tags here</span>
            <span>by <small class="author">Someone</small> <a href="/author/Someone">(about)</a></span>
        </div>"#;
        let page = parse_listing(html, &page_url()).unwrap();
        assert_eq!(page.entries.len(), 1);
        assert!(page.entries[0].quote.tags.is_empty());
    }

    #[test]
    fn test_missing_author_is_error() {
        let html = r#"<div class="quote">
            <span class="text">Orphan</span>
            <span>by <a href="/author/Nobody">(about)</a></span>
        </div>"#;
        let err = parse_listing(html, &page_url()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "author", .. }));
        assert!(err.to_string().contains("https://quotes.toscrape.com/page/2"));
    }

    #[test]
    fn test_missing_text_is_error() {
        let html = r#"<div class="quote">
            <span>by <small class="author">A</small> <a href="/author/A">(about)</a></span>
        </div>"#;
        let err = parse_listing(html, &page_url()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "text", .. }));
    }

    #[test]
    fn test_missing_author_link_is_error() {
        let html = r#"<div class="quote">
            <span class="text">T</span>
            <small class="author">A</small>
        </div>"#;
        let err = parse_listing(html, &page_url()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "author link", .. }));
    }

    #[test]
    fn test_author_link_without_href_is_error() {
        let html = r#"<div class="quote">
            <span class="text">T</span>
            <span>by <small class="author">A</small> <a>(about)</a></span>
        </div>"#;
        let err = parse_listing(html, &page_url()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingAttribute { attribute: "href", .. }
        ));
    }

    #[test]
    fn test_detects_next_affordance() {
        let html = r#"<ul class="pager"><li class="next"><a href="/page/3/">Next</a></li></ul>"#;
        assert!(parse_listing(html, &page_url()).unwrap().has_next);

        let html = r#"<ul class="pager"><li class="previous"><a href="/page/1/">Previous</a></li></ul>"#;
        assert!(!parse_listing(html, &page_url()).unwrap().has_next);
    }

    #[test]
    fn test_parse_author_concatenates_born() {
        let html = r#"<html><body><div class="author-details">
            <h3 class="author-title">Albert Einstein</h3>
            <p><strong>Born:</strong> <span class="author-born-date">March 14, 1879</span>
            <span class="author-born-location">in Ulm, Germany</span></p>
            <div class="author-description">Theoretical physicist.</div>
        </div></body></html>"#;
        let url = Url::parse("https://quotes.toscrape.com/author/Albert-Einstein").unwrap();

        let author = parse_author(html, &url).unwrap();

        assert_eq!(author.full_name, "Albert Einstein");
        assert_eq!(author.born, "March 14, 1879in Ulm, Germany");
        assert_eq!(author.description, "Theoretical physicist.");
    }

    #[test]
    fn test_parse_author_missing_details() {
        let url = Url::parse("https://quotes.toscrape.com/author/X").unwrap();
        let err = parse_author("<html><body></body></html>", &url).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField {
                field: "author details",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_author_missing_born_location() {
        let html = r#"<div class="author-details">
            <h3 class="author-title">X</h3>
            <span class="author-born-date">1900</span>
            <div class="author-description">d</div>
        </div>"#;
        let url = Url::parse("https://quotes.toscrape.com/author/X").unwrap();
        let err = parse_author(html, &url).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField {
                field: "author born location",
                ..
            }
        ));
    }
}
