//! Configuration module for Quote-Ripple
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so running without a file
//! crawls the public quotes listing.
//!
//! # Example
//!
//! ```no_run
//! use quote_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quote-ripple.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
