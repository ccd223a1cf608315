use serde::Deserialize;

/// Main configuration structure for scrapeddit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the JSON API (no trailing slash needed)
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request; the API rejects generic agents
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Persisted store settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Defaults for scrape commands; CLI flags override these per invocation
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Worker pool width for comment syncing
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,

    /// Submissions fetched per community listing
    #[serde(rename = "listing-limit", default = "default_listing_limit")]
    pub listing_limit: usize,

    /// Minimum child count for a "more comments" stub to be expanded
    #[serde(rename = "more-threshold", default)]
    pub more_threshold: u32,

    /// Comments fetched per author
    #[serde(rename = "author-comment-limit", default = "default_author_comment_limit")]
    pub author_comment_limit: usize,

    /// Authors pulled per community during a frontier crawl
    #[serde(rename = "author-limit", default = "default_author_limit")]
    pub author_limit: usize,

    /// Recursion depth of a frontier crawl
    #[serde(rename = "crawl-depth", default = "default_crawl_depth")]
    pub crawl_depth: u32,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            listing_limit: default_listing_limit(),
            more_threshold: 0,
            author_comment_limit: default_author_comment_limit(),
            author_limit: default_author_limit(),
            crawl_depth: default_crawl_depth(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_workers() -> usize {
    crate::crawler::DEFAULT_MAX_WORKERS
}

fn default_listing_limit() -> usize {
    10
}

fn default_author_comment_limit() -> usize {
    100
}

fn default_author_limit() -> usize {
    10
}

fn default_crawl_depth() -> u32 {
    1
}
