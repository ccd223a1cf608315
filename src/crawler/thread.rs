//! Thread scraper: one submission and its full comment tree

use crate::crawler::item::{scrape_submission, ItemOutcome};
use crate::reconcile::reconcile;
use crate::record::format_comment;
use crate::resources::ResourceProvider;
use crate::source::{CommentExpansion, ContentSource, SubmissionRef};
use crate::storage::Storage;
use crate::{Result, ScrapeError};
use std::sync::Arc;

/// Comment counts of one synced thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadOutcome {
    /// Fullname of the submission
    pub thread_id: String,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
}

/// Result of a full thread scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadReport {
    pub submission: ItemOutcome,
    /// `None` when the submission or its comments could not be fetched
    pub comments: Option<ThreadOutcome>,
}

/// Syncs threads through one store connection and one API session
pub struct ThreadScraper {
    source: Arc<dyn ContentSource>,
    store: Box<dyn Storage + Send>,
}

impl ThreadScraper {
    pub fn new(source: Arc<dyn ContentSource>, store: Box<dyn Storage + Send>) -> Self {
        Self { source, store }
    }

    /// Acquires a fresh connection and session from the provider
    pub fn open(resources: &dyn ResourceProvider) -> Result<Self> {
        Ok(Self::new(resources.open_source()?, resources.open_store()?))
    }

    /// Fetches every comment of a thread and reconciles it with the store
    ///
    /// The submission itself is not touched. Fetch failures propagate so a
    /// dispatcher can count them against this thread.
    pub async fn sync_comments(
        &mut self,
        thread: &SubmissionRef,
        expansion: CommentExpansion,
        overwrite: bool,
    ) -> Result<ThreadOutcome> {
        let thread_id = thread.fullname()?;
        let raw = self.source.thread_comments(thread, expansion).await?;

        let mut fresh = Vec::with_capacity(raw.len());
        for comment in &raw {
            match format_comment(comment, Some(&thread_id)) {
                Ok(record) => fresh.push(record),
                Err(e) => tracing::warn!("Skipping comment in {}: {}", thread_id, e),
            }
        }

        let result = reconcile(&mut *self.store, &thread_id, fresh, overwrite)?;

        Ok(ThreadOutcome {
            thread_id,
            new: result.new.len(),
            changed: result.changed.len(),
            unchanged: result.unchanged,
        })
    }

    /// Upserts the submission, then syncs its comments
    pub async fn scrape_thread(
        &mut self,
        thread: &SubmissionRef,
        expansion: CommentExpansion,
        overwrite: bool,
    ) -> Result<ThreadReport> {
        let submission =
            scrape_submission(&*self.source, &mut *self.store, thread, overwrite).await?;

        if submission == ItemOutcome::Unavailable {
            return Ok(ThreadReport {
                submission,
                comments: None,
            });
        }

        let comments = match self.sync_comments(thread, expansion, overwrite).await {
            Ok(outcome) => Some(outcome),
            Err(ScrapeError::Source(e)) => {
                tracing::warn!("Could not fetch comments of {}: {}", thread, e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(ThreadReport {
            submission,
            comments,
        })
    }
}
