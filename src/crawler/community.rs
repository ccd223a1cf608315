//! Community scrape: a listing of submissions, then their comment trees
//!
//! Submissions are stored straight from the listing payload, one by one.
//! Comment sync for every stored submission then goes through the
//! [`Dispatcher`] worker pool.

use crate::crawler::dispatcher::{DispatchTotals, Dispatcher};
use crate::crawler::SubredditArgs;
use crate::record::{format_submission, normalize_community};
use crate::resources::ResourceProvider;
use crate::source::SubmissionRef;
use crate::state::Progress;
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one community scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityReport {
    pub community: String,
    /// Submissions returned by the listing
    pub processed: usize,
    /// Submissions inserted or updated
    pub written: usize,
    /// Submissions left alone because they were already stored
    pub skipped: usize,
    /// Submissions that could not be formatted or stored
    pub unavailable: usize,
    /// Comment sync totals; zero when only submissions were scraped
    pub totals: DispatchTotals,
    pub elapsed: Duration,
}

/// Scrapes a community listing and syncs the comments of its threads
///
/// An already stored submission is skipped when `skip_existing` is set and
/// `overwrite` is not; skipped threads get no comment sync either.
pub async fn scrape_subreddit(
    resources: Arc<dyn ResourceProvider>,
    args: &SubredditArgs,
    progress: &Progress,
) -> Result<CommunityReport> {
    let started = Instant::now();
    let community = normalize_community(&args.name);

    let source = resources.open_source()?;
    let listing = source.listing(&community, args.sort, args.limit).await?;
    let total = listing.len();
    tracing::info!(
        "Fetched {} submissions from r/{} ({})",
        total,
        community,
        args.sort.as_str()
    );

    let mut report = CommunityReport {
        community: community.clone(),
        processed: 0,
        written: 0,
        skipped: 0,
        unavailable: 0,
        totals: DispatchTotals::default(),
        elapsed: Duration::ZERO,
    };
    let mut threads = Vec::with_capacity(total);

    {
        let mut store = resources.open_store()?;

        for (index, raw) in listing.iter().enumerate() {
            report.processed += 1;
            let prefix = format!("[{}/{}]", index + 1, total);

            let record = match format_submission(raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("{} Skipping submission in r/{}: {}", prefix, community, e);
                    report.unavailable += 1;
                    continue;
                }
            };

            if args.skip_existing && !args.overwrite && store.submission_exists(&record.name)? {
                tracing::debug!("{} {} already stored, skipping", prefix, record.name);
                report.skipped += 1;
                continue;
            }

            match store.upsert_submission(&record, args.overwrite)? {
                Some(name) => {
                    tracing::info!("{} Stored {}: {}", prefix, name, record.title);
                    report.written += 1;
                }
                None => {
                    tracing::debug!("{} {} unchanged", prefix, record.name);
                }
            }

            threads.push(SubmissionRef::Id(record.name));
        }
    }

    if !args.subs_only && !threads.is_empty() {
        let dispatcher = Dispatcher::new(resources, args.max_workers, args.expansion);
        report.totals = dispatcher.dispatch(threads, args.overwrite, progress).await?;
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::FakeSource;
    use crate::source::{CommentExpansion, ContentSource, ListingSort, RawComment, RawSubmission};
    use crate::storage::{SqliteStorage, Storage};
    use std::path::PathBuf;

    struct FileResources {
        path: PathBuf,
        source: Arc<FakeSource>,
    }

    impl ResourceProvider for FileResources {
        fn open_store(&self) -> Result<Box<dyn Storage + Send>> {
            Ok(Box::new(SqliteStorage::new(&self.path)?))
        }

        fn open_source(&self) -> Result<Arc<dyn ContentSource>> {
            let source: Arc<dyn ContentSource> = self.source.clone();
            Ok(source)
        }
    }

    fn post(id: &str) -> RawSubmission {
        RawSubmission {
            id: id.to_string(),
            name: format!("t3_{}", id),
            title: format!("Post {}", id),
            created_utc: 1_700_000_000.0,
            subreddit: "rust".to_string(),
            permalink: format!("/r/rust/comments/{}/", id),
            ..Default::default()
        }
    }

    fn reply(thread: &str) -> RawComment {
        RawComment {
            id: format!("{}_reply", thread),
            name: format!("t1_{}_reply", thread),
            author: Some("alice".to_string()),
            link_id: Some(format!("t3_{}", thread)),
            subreddit: "rust".to_string(),
            ..Default::default()
        }
    }

    fn args(skip_existing: bool, subs_only: bool) -> SubredditArgs {
        SubredditArgs {
            name: "r/rust".to_string(),
            sort: ListingSort::New,
            limit: 10,
            overwrite: false,
            skip_existing,
            subs_only,
            max_workers: 2,
            expansion: CommentExpansion::default(),
        }
    }

    fn setup(dir: &tempfile::TempDir) -> Arc<FileResources> {
        let source = FakeSource::new()
            .with_listing("rust", vec![post("a"), post("b")])
            .with_thread("a", vec![reply("a")])
            .with_thread("b", vec![reply("b")]);
        Arc::new(FileResources {
            path: dir.path().join("reddit.db"),
            source: Arc::new(source),
        })
    }

    #[tokio::test]
    async fn test_scrape_subreddit_stores_threads() {
        let dir = tempfile::tempdir().unwrap();
        let resources = setup(&dir);

        let report = scrape_subreddit(resources.clone(), &args(false, false), &Progress::new())
            .await
            .unwrap();

        assert_eq!(report.community, "rust");
        assert_eq!(report.processed, 2);
        assert_eq!(report.written, 2);
        assert_eq!(report.totals.new, 2);
        assert_eq!(report.totals.errors, 0);

        let store = resources.open_store().unwrap();
        assert_eq!(store.count_comments().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_skip_existing_and_subs_only() {
        let dir = tempfile::tempdir().unwrap();
        let resources = setup(&dir);

        let first = scrape_subreddit(resources.clone(), &args(true, true), &Progress::new())
            .await
            .unwrap();
        assert_eq!(first.written, 2);
        assert_eq!(first.totals, DispatchTotals::default());
        assert_eq!(resources.open_store().unwrap().count_comments().unwrap(), 0);

        let second = scrape_subreddit(resources.clone(), &args(true, false), &Progress::new())
            .await
            .unwrap();
        assert_eq!(second.skipped, 2);
        assert_eq!(second.written, 0);
        assert_eq!(second.totals, DispatchTotals::default());
    }

    #[tokio::test]
    async fn test_unknown_community_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let resources = setup(&dir);
        let mut missing = args(false, false);
        missing.name = "golang".to_string();

        let result = scrape_subreddit(resources, &missing, &Progress::new()).await;
        assert!(result.is_err());
    }
}
