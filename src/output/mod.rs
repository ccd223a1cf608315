//! Output module for command summaries and reports
//!
//! This module handles:
//! - Final summary lines for every scrape operation
//! - Rendering results of raw SQL statements
//! - Store statistics for the `stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::crawler::{ItemOutcome, ScrapeReport};
use crate::storage::{ClearedCounts, RawQueryOutcome};
use std::time::Duration;

/// Formats a duration as `HH:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Builds the one-line summary printed after a scrape
pub fn summarize(report: &ScrapeReport) -> String {
    match report {
        ScrapeReport::Thread(report) => {
            let submission = describe_item(&report.submission, "Submission");
            match &report.comments {
                Some(comments) => format!(
                    "{}; comments: new={}, changed={}, unchanged={}",
                    submission, comments.new, comments.changed, comments.unchanged
                ),
                None => format!("{}; comments unavailable", submission),
            }
        }
        ScrapeReport::Item(outcome) => describe_item(outcome, "Item"),
        ScrapeReport::Community(report) => format!(
            "r/{}: processed={}, scraped={}, skipped={}, unavailable={}; \
             comments: new={}, changed={}, unchanged={}, errors={} ({})",
            report.community,
            report.processed,
            report.written,
            report.skipped,
            report.unavailable,
            report.totals.new,
            report.totals.changed,
            report.totals.unchanged,
            report.totals.errors,
            format_elapsed(report.elapsed)
        ),
        ScrapeReport::Author(outcome) => format!(
            "u/{}: fetched {} comments, inserted {}, skipped {}, errors={}",
            outcome.author,
            outcome.fetched,
            outcome.written,
            outcome.fetched.saturating_sub(outcome.written),
            u8::from(outcome.failed)
        ),
        ScrapeReport::Crawl(report) => format!(
            "Crawl: {} communities ({}), {} authors synced, {} comments fetched, {} new, errors={}",
            report.communities.len(),
            report.communities.join(", "),
            report.authors_synced,
            report.comments_fetched,
            report.comments_written,
            report.authors_failed
        ),
    }
}

fn describe_item(outcome: &ItemOutcome, kind: &str) -> String {
    match outcome {
        ItemOutcome::Written(id) => format!("{} {} written", kind, id),
        ItemOutcome::Unchanged(id) => format!("{} {} already stored", kind, id),
        ItemOutcome::Unavailable => format!("{} unavailable", kind),
    }
}

/// Renders the outcome of a raw SQL statement
pub fn render_raw_outcome(outcome: &RawQueryOutcome) -> String {
    match outcome {
        RawQueryOutcome::Affected(count) => format!("Query OK, {} rows affected.", count),
        RawQueryOutcome::Rows { columns, rows } => {
            let mut out = columns.join(" | ");
            for row in rows {
                out.push('\n');
                out.push_str(&row.join(" | "));
            }
            out.push_str(&format!("\n({} rows)", rows.len()));
            out
        }
    }
}

/// Summary of a `delete` command
pub fn summarize_cleared(cleared: &ClearedCounts) -> String {
    format!(
        "Deleted {} submissions and {} comments.",
        cleared.submissions, cleared.comments
    )
}
