//! Author sync: an author's recent comment history

use crate::record::format_comment;
use crate::source::{AuthorSort, ContentSource};
use crate::storage::Storage;
use crate::Result;

/// Counts of one author sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorOutcome {
    pub author: String,
    /// Comments returned by the API
    pub fetched: usize,
    /// Comments inserted (or updated under overwrite)
    pub written: usize,
    /// The history could not be fetched
    pub failed: bool,
}

/// Fetches up to `limit` of an author's comments and stores them
///
/// Histories are not reconciled: without `overwrite`, comments already
/// stored are skipped. A failed fetch is logged and yields `fetched == 0`
/// with `failed` set.
pub async fn sync_author(
    source: &dyn ContentSource,
    storage: &mut (dyn Storage + Send),
    author: &str,
    sort: AuthorSort,
    limit: usize,
    overwrite: bool,
) -> Result<AuthorOutcome> {
    let (raw, failed) = match source.author_comments(author, sort, limit).await {
        Ok(raw) => (raw, false),
        Err(e) => {
            tracing::warn!("Could not fetch comments of u/{}: {}", author, e);
            (Vec::new(), true)
        }
    };

    let records: Vec<_> = raw
        .iter()
        .filter_map(|comment| match format_comment(comment, None) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping comment of u/{}: {}", author, e);
                None
            }
        })
        .collect();

    let written = storage.upsert_comments(&records, overwrite)?;
    tracing::debug!(
        "u/{}: fetched {}, written {}",
        author,
        raw.len(),
        written
    );

    Ok(AuthorOutcome {
        author: author.to_string(),
        fetched: raw.len(),
        written,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::FakeSource;
    use crate::source::RawComment;
    use crate::storage::SqliteStorage;

    fn history(author: &str, n: usize) -> Vec<RawComment> {
        (0..n)
            .map(|i| RawComment {
                id: format!("{}{}", author, i),
                name: format!("t1_{}{}", author, i),
                author: Some(author.to_string()),
                link_id: Some(format!("t3_post{}", i)),
                subreddit: format!("r/community{}", i % 2),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sync_author_is_insert_only() {
        let source = FakeSource::new().with_author("alice", history("alice", 4));
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let first = sync_author(&source, &mut storage, "alice", AuthorSort::New, 3, false)
            .await
            .unwrap();
        assert_eq!(first.fetched, 3);
        assert_eq!(first.written, 3);
        assert!(!first.failed);

        let second = sync_author(&source, &mut storage, "alice", AuthorSort::New, 4, false)
            .await
            .unwrap();
        assert_eq!(second.fetched, 4);
        assert_eq!(second.written, 1);

        let stored = storage.get_comment("t1_alice1").unwrap().unwrap();
        assert_eq!(stored.subreddit, "community1");
    }

    #[tokio::test]
    async fn test_unknown_author_fetches_nothing() {
        let source = FakeSource::new();
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let outcome = sync_author(&source, &mut storage, "ghost", AuthorSort::Top, 10, false)
            .await
            .unwrap();

        assert_eq!(outcome.fetched, 0);
        assert_eq!(outcome.written, 0);
        assert!(outcome.failed);
    }
}
