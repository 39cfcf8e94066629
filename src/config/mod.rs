//! Configuration module for Civic-Calendar
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use civic_calendar::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("calendar.toml")).unwrap();
//! println!("Crawling calendar at: {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
