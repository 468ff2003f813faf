//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small quotes site and run the full
//! crawl cycle end-to-end, from the first listing page to the CSV files.

use quote_ripple::config::{Config, CrawlerConfig, HttpConfig, SiteConfig, UserAgentConfig};
use quote_ripple::crawler::run_crawl;
use quote_ripple::storage::{read_records, Author, Quote};
use quote_ripple::{CrawlError, FetchError, ParseError};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, author_workers: u32) -> Config {
    Config {
        site: SiteConfig {
            base_url: format!("{}/", base_url),
            page_path: "/page/{n}/".to_string(),
        },
        crawler: CrawlerConfig {
            max_pages: 0,
            author_workers,
            queue_depth: 4,
        },
        http: HttpConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            max_retries: 0,
            retry_delay_ms: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
    }
}

/// Renders one quote element
fn quote_html(text: &str, author: &str, slug: &str, tags: &[&str]) -> String {
    let tags: String = tags
        .iter()
        .map(|t| format!(r#"<a class="tag" href="/tag/{t}/">{t}</a>"#))
        .collect();
    format!(
        r#"<div class="quote">
            <span class="text">{text}</span>
            <span>by <small class="author">{author}</small>
            <a href="/author/{slug}">(about)</a></span>
            <div class="tags">Tags: {tags}</div>
        </div>"#
    )
}

/// Renders a listing page from quote elements
fn listing_html(quotes: &[String], has_next: bool) -> String {
    let next = if has_next {
        r##"<nav><ul class="pager"><li class="next"><a href="#">Next</a></li></ul></nav>"##
    } else {
        ""
    };
    format!(
        "<html><body><div class=\"col-md-8\">{}</div>{}</body></html>",
        quotes.concat(),
        next
    )
}

/// Renders an author detail page
fn author_html(name: &str, date: &str, location: &str, description: &str) -> String {
    format!(
        r#"<html><body><div class="author-details">
            <h3 class="author-title">{name}</h3>
            <p><strong>Born:</strong> <span class="author-born-date">{date}</span>
            <span class="author-born-location">{location}</span></p>
            <div class="author-description">{description}</div>
        </div></body></html>"#
    )
}

/// Mounts a GET handler expected to be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn output_paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (dir.path().join("quotes.csv"), dir.path().join("authors.csv"))
}

/// Two pages, three quotes, two distinct authors
async fn mount_two_page_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        listing_html(
            &[
                quote_html("First", "Author A", "A", &["life", "love"]),
                quote_html("Second", "Author A", "A", &[]),
            ],
            true,
        ),
        1,
    )
    .await;
    mount_page(
        server,
        "/page/2/",
        listing_html(&[quote_html("Third", "Author B", "B", &["humor"])], false),
        1,
    )
    .await;
    mount_page(
        server,
        "/author/A",
        author_html("Author A", "March 14, 1879", "in Ulm, Germany", "Physicist."),
        1,
    )
    .await;
    mount_page(
        server,
        "/author/B",
        author_html("Author B", "July 6, 1907", "in Mexico", "Painter."),
        1,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_writes_both_files() {
    let mock_server = MockServer::start().await;
    mount_two_page_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);
    let config = create_test_config(&mock_server.uri(), 1);

    let stats = run_crawl(config, &quotes_path, &authors_path)
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.quotes_extracted, 3);
    assert_eq!(stats.author_references, 3);
    assert_eq!(stats.authors_fetched, 2);
    assert_eq!(stats.cache_hits, 1);
    assert!(stats.finished_at.is_some());

    let quotes: Vec<Quote> = read_records(&quotes_path).expect("Failed to read quotes");
    let texts: Vec<_> = quotes.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, ["First", "Second", "Third"]);
    assert_eq!(quotes[0].tags, ["life", "love"]);
    assert!(quotes[1].tags.is_empty());
    assert_eq!(quotes[2].author, "Author B");

    let authors: Vec<Author> = read_records(&authors_path).expect("Failed to read authors");
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].full_name, "Author A");
    assert_eq!(authors[0].born, "March 14, 1879in Ulm, Germany");
    assert_eq!(authors[1].full_name, "Author B");
}

#[tokio::test]
async fn test_pooled_crawl_fetches_each_author_once() {
    let mock_server = MockServer::start().await;

    // Every page repeats authors already seen on earlier pages
    let slugs = ["A", "B", "C"];
    for n in 1..=3u32 {
        let quotes: Vec<String> = slugs
            .iter()
            .map(|s| quote_html(&format!("{} on page {}", s, n), s, s, &["x"]))
            .collect();
        let route = if n == 1 {
            "/".to_string()
        } else {
            format!("/page/{}/", n)
        };
        mount_page(&mock_server, &route, listing_html(&quotes, n < 3), 1).await;
    }
    for slug in slugs {
        mount_page(
            &mock_server,
            &format!("/author/{}", slug),
            author_html(slug, "Jan 1", " in X", "Bio."),
            1,
        )
        .await;
    }

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);
    let config = create_test_config(&mock_server.uri(), 4);

    let stats = run_crawl(config, &quotes_path, &authors_path)
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.quotes_extracted, 9);
    assert_eq!(stats.authors_fetched, 3);
    assert_eq!(stats.cache_hits, 6);

    let authors: Vec<Author> = read_records(&authors_path).expect("Failed to read authors");
    let names: Vec<_> = authors.iter().map(|a| a.full_name.as_str()).collect();
    assert_eq!(names, slugs);
}

#[tokio::test]
async fn test_pagination_stops_without_next_affordance() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        listing_html(&[quote_html("Only", "Solo", "Solo", &[])], false),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/author/Solo",
        author_html("Solo", "d", "l", "b"),
        1,
    )
    .await;
    // Must never be requested
    mount_page(&mock_server, "/page/2/", listing_html(&[], false), 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);

    let stats = run_crawl(
        create_test_config(&mock_server.uri(), 1),
        &quotes_path,
        &authors_path,
    )
    .await
    .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_missing_author_field_aborts_without_quotes_file() {
    let mock_server = MockServer::start().await;

    let broken = r#"<div class="quote">
        <span class="text">No author here</span>
        <span><a href="/author/Nobody">(about)</a></span>
    </div>"#
        .to_string();
    mount_page(&mock_server, "/", listing_html(&[broken], true), 1).await;
    mount_page(&mock_server, "/page/2/", listing_html(&[], false), 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);

    let err = run_crawl(
        create_test_config(&mock_server.uri(), 1),
        &quotes_path,
        &authors_path,
    )
    .await
    .expect_err("Crawl should fail");

    assert!(matches!(
        err,
        CrawlError::Parse(ParseError::MissingField {
            field: "author",
            ..
        })
    ));
    assert!(!quotes_path.exists());
    assert!(!authors_path.exists());
}

/// Runs a crawl whose second author page is missing, with `workers` author workers
async fn assert_author_failure_keeps_earlier_authors(workers: u32) {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        listing_html(
            &[
                quote_html("Kept", "Good", "Good", &[]),
                quote_html("Lost", "Gone", "Gone", &[]),
            ],
            false,
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/author/Good",
        author_html("Good", "d", "l", "b"),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/author/Gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);

    let err = run_crawl(
        create_test_config(&mock_server.uri(), workers),
        &quotes_path,
        &authors_path,
    )
    .await
    .expect_err("Crawl should fail");

    assert!(matches!(
        err,
        CrawlError::Fetch(FetchError::Status { status: 404, .. })
    ));
    assert!(!quotes_path.exists());

    // The author resolved before the failure stays in the appended file
    let authors: Vec<Author> = read_records(&authors_path).expect("Failed to read authors");
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].full_name, "Good");
}

#[tokio::test]
async fn test_author_fetch_failure_aborts_run() {
    assert_author_failure_keeps_earlier_authors(1).await;
}

#[tokio::test]
async fn test_author_fetch_failure_aborts_pooled_run() {
    assert_author_failure_keeps_earlier_authors(4).await;
}

#[tokio::test]
async fn test_transient_page_failure_is_retried() {
    let mock_server = MockServer::start().await;

    // First attempt fails with 503, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", listing_html(&[], false), 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);
    let mut config = create_test_config(&mock_server.uri(), 1);
    config.http.max_retries = 1;

    let stats = run_crawl(config, &quotes_path, &authors_path)
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.quotes_extracted, 0);

    // An empty listing still produces a quotes file with only the header
    let quotes: Vec<Quote> = read_records(&quotes_path).expect("Failed to read quotes");
    assert!(quotes.is_empty());
}

#[tokio::test]
async fn test_page_limit_is_fatal() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", listing_html(&[], true), 1).await;
    mount_page(&mock_server, "/page/2/", listing_html(&[], true), 1).await;
    mount_page(&mock_server, "/page/3/", listing_html(&[], false), 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);
    let mut config = create_test_config(&mock_server.uri(), 1);
    config.crawler.max_pages = 2;

    let err = run_crawl(config, &quotes_path, &authors_path)
        .await
        .expect_err("Crawl should fail");

    assert!(matches!(err, CrawlError::PageLimitExceeded { limit: 2 }));
    assert!(!quotes_path.exists());
}

#[tokio::test]
async fn test_authors_accumulate_across_runs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (quotes_path, authors_path) = output_paths(&dir);

    for _ in 0..2 {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            listing_html(&[quote_html("Q", "Same", "Same", &[])], false),
            1,
        )
        .await;
        mount_page(
            &mock_server,
            "/author/Same",
            author_html("Same", "d", "l", "b"),
            1,
        )
        .await;

        run_crawl(
            create_test_config(&mock_server.uri(), 1),
            &quotes_path,
            &authors_path,
        )
        .await
        .expect("Crawl failed");
    }

    // Each run starts with an empty cache; the quotes file is replaced
    let quotes: Vec<Quote> = read_records(&quotes_path).expect("Failed to read quotes");
    let authors: Vec<Author> = read_records(&authors_path).expect("Failed to read authors");
    assert_eq!(quotes.len(), 1);
    assert_eq!(authors.len(), 2);
}
