//! State module for tracking a running scrape
//!
//! Both pieces of state are created per top-level call and passed down
//! explicitly; nothing here is process-wide.
//!
//! # Components
//!
//! - `Progress`: completion counter shared between dispatch workers and an observer
//! - `CrawlState`: visited authors and communities of one frontier crawl

mod progress;
mod visited;

// Re-export main types
pub use progress::{Progress, ProgressSnapshot};
pub use visited::CrawlState;
