//! Scrapeddit: bulk extraction of discussion threads into a relational store
//!
//! This crate fetches submissions, their comment trees and per-author comment
//! histories from Reddit's public JSON API and synchronizes them into SQLite
//! under an append-or-update policy. The interesting parts are:
//!
//! - [`reconcile`]: classifies freshly fetched comments as new, changed or
//!   unchanged against what is already stored
//! - [`crawler::Dispatcher`]: syncs many threads across a bounded worker pool
//! - [`crawler::FrontierCrawler`]: discovers new communities by following
//!   authors outward from a seed community

pub mod config;
pub mod crawler;
pub mod output;
pub mod reconcile;
pub mod record;
pub mod resources;
pub mod source;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for scrapeddit operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Record error: {0}")]
    Record(#[from] record::RecordError),

    #[error("Unknown sort order '{sort}' (expected one of: {expected})")]
    UnknownSort { sort: String, expected: &'static str },
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

/// Result type alias for scrapeddit operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Dispatcher, FrontierCrawler, ScrapeTarget};
pub use reconcile::{reconcile, Reconciliation};
pub use record::{CommentRecord, SubmissionRecord};
pub use resources::{ResourceProvider, Resources};
pub use state::{CrawlState, Progress};
