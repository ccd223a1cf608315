//! Frontier crawler: discovering communities by following authors
//!
//! Starting from a seed community, the most active known authors are read
//! from the store (not the API), their recent comment histories are synced,
//! and every community those histories touch becomes the next frontier.
//! Expansion is depth-first and bounded by `depth`. One [`CrawlState`] is
//! threaded through the whole recursion so no community is expanded twice
//! and no author is fetched twice.

use crate::crawler::author::sync_author;
use crate::crawler::CrawlArgs;
use crate::record::normalize_community;
use crate::resources::ResourceProvider;
use crate::source::{AuthorSort, ContentSource};
use crate::state::CrawlState;
use crate::storage::Storage;
use crate::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What one crawl touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Communities expanded, in visiting order
    pub communities: Vec<String>,
    pub authors_synced: usize,
    /// Authors whose history could not be fetched
    pub authors_failed: usize,
    pub comments_fetched: usize,
    pub comments_written: usize,
}

type CrawlFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Recursive author/community expansion over the store
pub struct FrontierCrawler {
    resources: Arc<dyn ResourceProvider>,
    author_limit: usize,
    comment_limit: usize,
    sort: AuthorSort,
    overwrite: bool,
}

impl FrontierCrawler {
    pub fn new(
        resources: Arc<dyn ResourceProvider>,
        author_limit: usize,
        comment_limit: usize,
        sort: AuthorSort,
        overwrite: bool,
    ) -> Self {
        Self {
            resources,
            author_limit,
            comment_limit,
            sort,
            overwrite,
        }
    }

    /// Builds a crawler from command arguments
    pub fn from_args(resources: Arc<dyn ResourceProvider>, args: &CrawlArgs) -> Self {
        Self::new(
            resources,
            args.author_limit,
            args.comment_limit,
            args.sort,
            args.overwrite,
        )
    }

    /// Crawls outward from `seed`, `depth` levels deep
    ///
    /// `state` must be created by the caller for this crawl. Passing the same
    /// state to a later crawl continues to skip everything already visited.
    pub async fn crawl(
        &self,
        seed: &str,
        depth: u32,
        state: &mut CrawlState,
    ) -> Result<CrawlReport> {
        let source = self.resources.open_source()?;
        let mut store = self.resources.open_store()?;
        let mut report = CrawlReport::default();

        let seed = normalize_community(seed);
        self.expand(&*source, &mut *store, &seed, depth, state, &mut report)
            .await?;

        tracing::info!(
            "Crawl from r/{} visited {} communities, synced {} authors ({} failed, {} new comments)",
            seed,
            report.communities.len(),
            report.authors_synced,
            report.authors_failed,
            report.comments_written
        );
        Ok(report)
    }

    fn expand<'a>(
        &'a self,
        source: &'a dyn ContentSource,
        store: &'a mut (dyn Storage + Send),
        community: &'a str,
        depth: u32,
        state: &'a mut CrawlState,
        report: &'a mut CrawlReport,
    ) -> CrawlFuture<'a> {
        Box::pin(async move {
            // A sibling branch may have reached this community first
            if !state.mark_community(community) {
                tracing::debug!("r/{} already visited", community);
                return Ok(());
            }
            report.communities.push(community.to_string());

            let authors: Vec<String> = store
                .authors_in_community(community, self.author_limit)?
                .into_iter()
                .filter(|author| !state.is_author_visited(author))
                .collect();
            tracing::info!(
                "r/{} (depth {}): syncing {} authors",
                community,
                depth,
                authors.len()
            );

            for author in &authors {
                let outcome = sync_author(
                    source,
                    &mut *store,
                    author,
                    self.sort,
                    self.comment_limit,
                    self.overwrite,
                )
                .await?;
                state.mark_author(author);

                if outcome.failed {
                    report.authors_failed += 1;
                } else {
                    report.authors_synced += 1;
                }
                report.comments_fetched += outcome.fetched;
                report.comments_written += outcome.written;
            }

            if depth == 0 {
                return Ok(());
            }

            let frontier: Vec<String> = store
                .communities_for_authors(&authors)?
                .into_iter()
                .filter(|next| !state.is_community_visited(next))
                .collect();
            tracing::debug!("r/{}: {} communities to expand", community, frontier.len());

            for next in &frontier {
                self.expand(source, &mut *store, next, depth - 1, &mut *state, &mut *report)
                    .await?;
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::FakeSource;
    use crate::record::CommentRecord;
    use crate::source::RawComment;
    use crate::storage::SqliteStorage;
    use chrono::Utc;
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

    fn stored(name: &str, author: &str, community: &str) -> CommentRecord {
        CommentRecord {
            name: name.to_string(),
            author: Some(author.to_string()),
            body: String::new(),
            created_utc: Utc::now(),
            edited: false,
            ups: 1,
            parent_id: None,
            submission_id: "t3_seed".to_string(),
            subreddit: community.to_string(),
        }
    }

    fn history(author: &str, community: &str) -> Vec<RawComment> {
        vec![RawComment {
            id: format!("{}_{}", author, community),
            name: format!("t1_{}_{}", author, community),
            author: Some(author.to_string()),
            link_id: Some("t3_elsewhere".to_string()),
            subreddit: community.to_string(),
            ..Default::default()
        }]
    }

    #[tokio::test]
    async fn test_depth_zero_only_syncs_seed_authors() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(
            FakeSource::new()
                .with_author("alice", history("alice", "golang"))
                .with_author("bob", history("bob", "python")),
        );
        let resources = Arc::new(FileResources {
            path: dir.path().join("reddit.db"),
            source: source.clone(),
        });
        resources
            .open_store()
            .unwrap()
            .insert_comments(&[stored("t1_1", "alice", "rust")])
            .unwrap();

        let crawler = FrontierCrawler::new(resources, 10, 5, AuthorSort::New, false);
        let mut state = CrawlState::new();
        let report = crawler.crawl("r/rust", 0, &mut state).await.unwrap();

        assert_eq!(report.communities, vec!["rust"]);
        assert_eq!(report.authors_synced, 1);
        assert_eq!(report.comments_written, 1);
        assert_eq!(*source.author_requests.lock().unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_state_carries_across_crawls() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new().with_author("alice", history("alice", "rust")));
        let resources = Arc::new(FileResources {
            path: dir.path().join("reddit.db"),
            source: source.clone(),
        });
        resources
            .open_store()
            .unwrap()
            .insert_comments(&[stored("t1_1", "alice", "rust")])
            .unwrap();

        let crawler = FrontierCrawler::new(resources, 10, 5, AuthorSort::New, false);
        let mut state = CrawlState::new();
        crawler.crawl("rust", 3, &mut state).await.unwrap();
        let again = crawler.crawl("rust", 3, &mut state).await.unwrap();

        assert!(again.communities.is_empty());
        assert_eq!(source.author_requests.lock().unwrap().len(), 1);
    }
}
