//! Crawler module: every scrape operation the CLI can trigger
//!
//! This module contains the core scraping logic, including:
//! - Single submission and comment upserts
//! - Whole-thread sync through the reconciler
//! - Concurrent comment sync across a worker pool
//! - Community listings, author histories and frontier crawls

mod author;
mod community;
mod dispatcher;
mod frontier;
mod item;
mod thread;

#[cfg(test)]
mod testing;

pub use author::{sync_author, AuthorOutcome};
pub use community::{scrape_subreddit, CommunityReport};
pub use dispatcher::{DispatchTotals, Dispatcher, DEFAULT_MAX_WORKERS};
pub use frontier::{CrawlReport, FrontierCrawler};
pub use item::{scrape_comment, scrape_submission, ItemOutcome};
pub use thread::{ThreadOutcome, ThreadReport, ThreadScraper};

use crate::resources::ResourceProvider;
use crate::source::{AuthorSort, CommentExpansion, ListingSort, SubmissionRef};
use crate::state::{CrawlState, Progress};
use crate::storage::RunCounts;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Arguments of `scrape thread`
#[derive(Debug, Clone)]
pub struct ThreadArgs {
    pub target: SubmissionRef,
    pub expansion: CommentExpansion,
    pub overwrite: bool,
}

/// Arguments of `scrape submission`
#[derive(Debug, Clone)]
pub struct SubmissionArgs {
    pub target: SubmissionRef,
    pub overwrite: bool,
}

/// Arguments of `scrape comment`
#[derive(Debug, Clone)]
pub struct CommentArgs {
    pub id: String,
    pub overwrite: bool,
}

/// Arguments of `scrape subreddit`
#[derive(Debug, Clone)]
pub struct SubredditArgs {
    pub name: String,
    pub sort: ListingSort,
    pub limit: usize,
    pub overwrite: bool,
    pub skip_existing: bool,
    pub subs_only: bool,
    pub max_workers: usize,
    pub expansion: CommentExpansion,
}

/// Arguments of `scrape redditor`
#[derive(Debug, Clone)]
pub struct RedditorArgs {
    pub name: String,
    pub sort: AuthorSort,
    pub limit: usize,
    pub overwrite: bool,
}

/// Arguments of `scrape crawl`
#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub seed: String,
    pub depth: u32,
    pub author_limit: usize,
    pub comment_limit: usize,
    pub sort: AuthorSort,
    pub overwrite: bool,
}

/// One scrape operation with its typed arguments
#[derive(Debug, Clone)]
pub enum ScrapeTarget {
    Thread(ThreadArgs),
    Submission(SubmissionArgs),
    Comment(CommentArgs),
    Subreddit(SubredditArgs),
    Redditor(RedditorArgs),
    Crawl(CrawlArgs),
}

impl fmt::Display for ScrapeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread(args) => write!(f, "scrape thread {}", args.target),
            Self::Submission(args) => write!(f, "scrape submission {}", args.target),
            Self::Comment(args) => write!(f, "scrape comment {}", args.id),
            Self::Subreddit(args) => write!(f, "scrape subreddit {}", args.name),
            Self::Redditor(args) => write!(f, "scrape redditor {}", args.name),
            Self::Crawl(args) => write!(f, "scrape crawl {} (depth {})", args.seed, args.depth),
        }
    }
}

/// Result of one scrape operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeReport {
    Thread(ThreadReport),
    Item(ItemOutcome),
    Community(CommunityReport),
    Author(AuthorOutcome),
    Crawl(CrawlReport),
}

impl ScrapeReport {
    /// Flattens the report into the counts recorded for a run
    pub fn run_counts(&self) -> RunCounts {
        match self {
            Self::Thread(report) => {
                let mut counts = match &report.comments {
                    Some(outcome) => RunCounts {
                        new: outcome.new as u64,
                        changed: outcome.changed as u64,
                        unchanged: outcome.unchanged as u64,
                        errors: 0,
                    },
                    None => RunCounts {
                        errors: 1,
                        ..RunCounts::default()
                    },
                };
                if report.submission.is_written() {
                    counts.new += 1;
                }
                counts
            }
            Self::Item(ItemOutcome::Written(_)) => RunCounts {
                new: 1,
                ..RunCounts::default()
            },
            Self::Item(ItemOutcome::Unchanged(_)) => RunCounts {
                unchanged: 1,
                ..RunCounts::default()
            },
            Self::Item(ItemOutcome::Unavailable) => RunCounts {
                errors: 1,
                ..RunCounts::default()
            },
            Self::Community(report) => RunCounts {
                new: (report.written + report.totals.new) as u64,
                changed: report.totals.changed as u64,
                unchanged: (report.skipped + report.totals.unchanged) as u64,
                errors: (report.unavailable + report.totals.errors) as u64,
            },
            Self::Author(outcome) => RunCounts {
                new: outcome.written as u64,
                unchanged: outcome.fetched.saturating_sub(outcome.written) as u64,
                errors: u64::from(outcome.failed),
                ..RunCounts::default()
            },
            Self::Crawl(report) => RunCounts {
                new: report.comments_written as u64,
                unchanged: report.comments_fetched.saturating_sub(report.comments_written) as u64,
                errors: report.authors_failed as u64,
                ..RunCounts::default()
            },
        }
    }
}

/// Runs one scrape operation to completion
///
/// `progress` is advanced by operations that dispatch comment sync across
/// workers; the others leave it untouched.
pub async fn run(
    target: ScrapeTarget,
    resources: Arc<dyn ResourceProvider>,
    progress: &Progress,
) -> Result<ScrapeReport> {
    tracing::info!("Starting {}", target);

    let report = match target {
        ScrapeTarget::Thread(args) => {
            let mut scraper = ThreadScraper::open(resources.as_ref())?;
            let report = scraper
                .scrape_thread(&args.target, args.expansion, args.overwrite)
                .await?;
            ScrapeReport::Thread(report)
        }
        ScrapeTarget::Submission(args) => {
            let source = resources.open_source()?;
            let mut store = resources.open_store()?;
            let outcome =
                scrape_submission(&*source, &mut *store, &args.target, args.overwrite).await?;
            ScrapeReport::Item(outcome)
        }
        ScrapeTarget::Comment(args) => {
            let source = resources.open_source()?;
            let mut store = resources.open_store()?;
            let outcome = scrape_comment(&*source, &mut *store, &args.id, args.overwrite).await?;
            ScrapeReport::Item(outcome)
        }
        ScrapeTarget::Subreddit(args) => {
            let report = scrape_subreddit(resources, &args, progress).await?;
            ScrapeReport::Community(report)
        }
        ScrapeTarget::Redditor(args) => {
            let source = resources.open_source()?;
            let mut store = resources.open_store()?;
            let outcome = sync_author(
                &*source,
                &mut *store,
                &args.name,
                args.sort,
                args.limit,
                args.overwrite,
            )
            .await?;
            ScrapeReport::Author(outcome)
        }
        ScrapeTarget::Crawl(args) => {
            let crawler = FrontierCrawler::from_args(resources, &args);
            let mut state = CrawlState::new();
            let report = crawler.crawl(&args.seed, args.depth, &mut state).await?;
            ScrapeReport::Crawl(report)
        }
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_target_display() {
        let target = ScrapeTarget::Crawl(CrawlArgs {
            seed: "rust".to_string(),
            depth: 2,
            author_limit: 10,
            comment_limit: 100,
            sort: AuthorSort::New,
            overwrite: false,
        });
        assert_eq!(target.to_string(), "scrape crawl rust (depth 2)");

        let target = ScrapeTarget::Submission(SubmissionArgs {
            target: SubmissionRef::parse("abc"),
            overwrite: true,
        });
        assert_eq!(target.to_string(), "scrape submission abc");
    }

    #[test]
    fn test_community_run_counts() {
        let report = ScrapeReport::Community(CommunityReport {
            community: "rust".to_string(),
            processed: 10,
            written: 6,
            skipped: 3,
            unavailable: 1,
            totals: DispatchTotals {
                new: 40,
                changed: 2,
                unchanged: 7,
                errors: 1,
            },
            elapsed: Duration::from_secs(5),
        });

        assert_eq!(
            report.run_counts(),
            RunCounts {
                new: 46,
                changed: 2,
                unchanged: 10,
                errors: 2
            }
        );
    }

    #[test]
    fn test_failed_authors_count_as_errors() {
        let report = ScrapeReport::Author(AuthorOutcome {
            author: "ghost".to_string(),
            fetched: 0,
            written: 0,
            failed: true,
        });
        assert_eq!(report.run_counts().errors, 1);

        let report = ScrapeReport::Crawl(CrawlReport {
            communities: vec!["a".to_string()],
            authors_synced: 1,
            authors_failed: 2,
            comments_fetched: 4,
            comments_written: 3,
        });
        assert_eq!(
            report.run_counts(),
            RunCounts {
                new: 3,
                changed: 0,
                unchanged: 1,
                errors: 2
            }
        );
    }

    #[test]
    fn test_thread_run_counts_without_comments() {
        let report = ScrapeReport::Thread(ThreadReport {
            submission: ItemOutcome::Written("t3_abc".to_string()),
            comments: None,
        });
        assert_eq!(
            report.run_counts(),
            RunCounts {
                new: 1,
                errors: 1,
                ..RunCounts::default()
            }
        );
    }
}
