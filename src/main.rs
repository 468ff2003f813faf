//! Quote-Ripple main entry point
//!
//! This is the command-line interface for the Quote-Ripple quote harvester.

use anyhow::Context;
use clap::Parser;
use quote_ripple::config::{load_config_with_hash, validate, Config};
use quote_ripple::crawler::run_crawl;
use quote_ripple::output::{load_dataset_statistics, print_dataset_statistics, print_statistics};
use quote_ripple::storage::{AUTHORS_PATH, DEFAULT_QUOTES_PATH};
use quote_ripple::url::{page_url, site_base};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Number of tags listed by --stats
const TOP_TAGS: usize = 10;

/// Quote-Ripple: a paginated quote harvester
///
/// Quote-Ripple walks a quotes listing page by page, writes every quote to
/// a CSV file and fetches each distinct author's biography exactly once.
#[derive(Parser, Debug)]
#[command(name = "quote-ripple")]
#[command(version)]
#[command(about = "A paginated quote harvester", long_about = None)]
struct Cli {
    /// Quotes CSV file to write
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_QUOTES_PATH)]
    output: PathBuf,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after this many listing pages (0 = no limit)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Number of concurrent author fetches
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Remove the existing authors file before crawling
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the existing CSV files and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli).context("invalid command-line override")?;

    let authors_path = Path::new(AUTHORS_PATH);

    if cli.dry_run {
        handle_dry_run(&config, &cli.output, authors_path)?;
    } else if cli.stats {
        handle_stats(&cli.output, authors_path)?;
    } else {
        handle_crawl(config, &cli.output, authors_path, cli.fresh, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quote_ripple=info,warn"),
            1 => EnvFilter::new("quote_ripple=debug,info"),
            2 => EnvFilter::new("quote_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.author_workers = workers;
    }
    validate(config)?;
    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, quotes_path: &Path, authors_path: &Path) -> anyhow::Result<()> {
    let base = site_base(&config.site)?;
    let second = page_url(&base, &config.site.page_path, 2)?;

    println!("=== Quote-Ripple Dry Run ===\n");

    println!("Site:");
    println!("  First page:  {}", base);
    println!("  Second page: {}", second);

    println!("\nCrawler:");
    match config.crawler.page_limit() {
        Some(limit) => println!("  Max pages: {}", limit),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Author workers: {}", config.crawler.author_workers);
    println!("  Queue depth: {}", config.crawler.queue_depth);

    println!("\nHTTP:");
    println!("  Request timeout: {}s", config.http.request_timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.http.max_retries, config.http.retry_delay_ms
    );
    println!("  User-Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Quotes:  {}", quotes_path.display());
    println!("  Authors: {}", authors_path.display());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: summarizes the CSV files on disk
fn handle_stats(quotes_path: &Path, authors_path: &Path) -> anyhow::Result<()> {
    println!("Quotes file:  {}", quotes_path.display());
    println!("Authors file: {}\n", authors_path.display());

    let stats = load_dataset_statistics(quotes_path, authors_path, TOP_TAGS)
        .context("failed to read datasets")?;
    print_dataset_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    quotes_path: &Path,
    authors_path: &Path,
    fresh: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if fresh && authors_path.exists() {
        tracing::info!("Removing {} before a fresh crawl", authors_path.display());
        std::fs::remove_file(authors_path)
            .with_context(|| format!("failed to remove {}", authors_path.display()))?;
    }

    tracing::info!(
        "Starting crawl of {} with {} author worker(s)",
        config.site.base_url,
        config.crawler.author_workers
    );

    match run_crawl(config, quotes_path, authors_path).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
