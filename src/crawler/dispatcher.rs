//! Concurrent comment sync across a bounded worker pool
//!
//! One task per thread, at most `max_workers` running at once. Each task
//! opens its own store connection and API session, so nothing but the
//! [`Progress`] counter is shared between workers. A failing task is logged
//! and counted; it never stops its siblings.

use crate::crawler::thread::{ThreadOutcome, ThreadScraper};
use crate::resources::ResourceProvider;
use crate::source::{CommentExpansion, SubmissionRef};
use crate::state::Progress;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// Default worker pool width; kept low to stay under the API's rate limits
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Aggregated counts of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchTotals {
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub errors: usize,
}

impl DispatchTotals {
    fn absorb(&mut self, outcome: &ThreadOutcome) {
        self.new += outcome.new;
        self.changed += outcome.changed;
        self.unchanged += outcome.unchanged;
    }
}

/// Fans comment sync for many threads out over a worker pool
pub struct Dispatcher {
    resources: Arc<dyn ResourceProvider>,
    max_workers: usize,
    expansion: CommentExpansion,
}

impl Dispatcher {
    pub fn new(
        resources: Arc<dyn ResourceProvider>,
        max_workers: usize,
        expansion: CommentExpansion,
    ) -> Self {
        Self {
            resources,
            max_workers: max_workers.max(1),
            expansion,
        }
    }

    /// Syncs the comments of every thread and returns the summed counts
    ///
    /// The submissions must already be stored. Blocks until every task has
    /// finished. Only a store that cannot be opened up front is an error;
    /// per-thread failures end up in `errors`.
    pub async fn dispatch(
        &self,
        threads: Vec<SubmissionRef>,
        overwrite: bool,
        progress: &Progress,
    ) -> Result<DispatchTotals> {
        // Fail fast before spawning anything if the store is unreachable
        drop(self.resources.open_store()?);

        progress.begin(threads.len());
        tracing::info!(
            "Syncing comments of {} threads with {} workers",
            threads.len(),
            self.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();
        let mut spawned: HashMap<task::Id, SubmissionRef> = HashMap::with_capacity(threads.len());

        for thread in threads {
            let semaphore = Arc::clone(&semaphore);
            let resources = Arc::clone(&self.resources);
            let expansion = self.expansion;
            let target = thread.clone();

            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                sync_thread(resources.as_ref(), &target, expansion, overwrite).await
            });
            spawned.insert(handle.id(), thread);
        }

        let mut totals = DispatchTotals::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            let current = progress.advance();

            // A panicking task only leaves its id behind
            let task_id = match &joined {
                Ok((id, _)) => *id,
                Err(e) => e.id(),
            };
            let thread = spawned
                .remove(&task_id)
                .map_or_else(|| format!("task {}", task_id), |thread| thread.to_string());

            match joined {
                Ok((_, Ok(outcome))) => {
                    tracing::debug!(
                        "[{}] {}: {} new, {} changed, {} unchanged",
                        current,
                        thread,
                        outcome.new,
                        outcome.changed,
                        outcome.unchanged
                    );
                    totals.absorb(&outcome);
                }
                Ok((_, Err(e))) => {
                    totals.errors += 1;
                    tracing::error!("Failed to sync thread {}: {}", thread, e);
                }
                Err(e) => {
                    totals.errors += 1;
                    tracing::error!("Worker for thread {} aborted: {}", thread, e);
                }
            }
        }

        progress.finish();
        Ok(totals)
    }
}

/// One unit of work: acquire resources, sync, release on drop
async fn sync_thread(
    resources: &dyn ResourceProvider,
    thread: &SubmissionRef,
    expansion: CommentExpansion,
    overwrite: bool,
) -> Result<ThreadOutcome> {
    let mut scraper = ThreadScraper::open(resources)?;
    scraper.sync_comments(thread, expansion, overwrite).await
}
