//! Statistics generation from the scrape database
//!
//! This module provides functionality for extracting and displaying
//! store statistics for the `stats` command.

use crate::storage::{RunRecord, Storage};
use crate::ScrapeError;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    pub submissions: u64,
    pub comments: u64,

    /// Distinct communities across both tables
    pub communities: u64,

    /// Distinct known authors across both tables
    pub authors: u64,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `recent` - How many of the latest runs to include
pub fn load_statistics(storage: &dyn Storage, recent: usize) -> Result<StoreStatistics, ScrapeError> {
    Ok(StoreStatistics {
        submissions: storage.count_submissions()?,
        comments: storage.count_comments()?,
        communities: storage.count_communities()?,
        authors: storage.count_authors()?,
        recent_runs: storage.recent_runs(recent)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Submissions: {}", stats.submissions);
    println!("  Comments: {}", stats.comments);
    println!("  Communities: {}", stats.communities);
    println!("  Authors: {}", stats.authors);
    println!();

    if stats.recent_runs.is_empty() {
        println!("No runs recorded yet.");
        return;
    }

    println!("Recent Runs:");
    for run in &stats.recent_runs {
        println!(
            "  #{} [{}] {} started {} ({} new, {} changed, {} unchanged, {} errors)",
            run.id,
            run.status.to_db_string(),
            run.command,
            run.started_at,
            run.counts.new,
            run.counts.changed,
            run.counts.unchanged,
            run.counts.errors
        );
    }
}
