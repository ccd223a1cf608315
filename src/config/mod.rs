//! Configuration module for scrapeddit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use scrapeddit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrapeddit.toml")).unwrap();
//! println!("Syncing comments with {} workers", config.scrape.max_workers);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{ApiConfig, Config, DatabaseConfig, ScrapeConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_max_workers;
