//! Single-item scrapes: one submission or one comment
//!
//! A failed fetch is not an error here. It is logged and reported as
//! [`ItemOutcome::Unavailable`] so batch callers can carry on. Store
//! failures still propagate.

use crate::record::{format_comment, format_submission};
use crate::source::{ContentSource, SubmissionRef};
use crate::storage::Storage;
use crate::Result;

/// What happened to one scraped item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Inserted, or updated under overwrite
    Written(String),
    /// Already stored and left untouched
    Unchanged(String),
    /// Could not be fetched or formatted
    Unavailable,
}

impl ItemOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Fetches one submission and upserts it
pub async fn scrape_submission(
    source: &dyn ContentSource,
    storage: &mut (dyn Storage + Send),
    target: &SubmissionRef,
    overwrite: bool,
) -> Result<ItemOutcome> {
    let raw = match source.submission(target).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Could not fetch submission {}: {}", target, e);
            return Ok(ItemOutcome::Unavailable);
        }
    };

    let record = match format_submission(&raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Skipping submission {}: {}", target, e);
            return Ok(ItemOutcome::Unavailable);
        }
    };

    let outcome = match storage.upsert_submission(&record, overwrite)? {
        Some(name) => ItemOutcome::Written(name),
        None => ItemOutcome::Unchanged(record.name),
    };
    tracing::debug!("Submission {}: {:?}", target, outcome);

    Ok(outcome)
}

/// Fetches one comment and upserts it
pub async fn scrape_comment(
    source: &dyn ContentSource,
    storage: &mut (dyn Storage + Send),
    id: &str,
    overwrite: bool,
) -> Result<ItemOutcome> {
    let raw = match source.comment(id).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Could not fetch comment {}: {}", id, e);
            return Ok(ItemOutcome::Unavailable);
        }
    };

    let record = match format_comment(&raw, None) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Skipping comment {}: {}", id, e);
            return Ok(ItemOutcome::Unavailable);
        }
    };

    let outcome = match storage.upsert_comment(&record, overwrite)? {
        Some(name) => ItemOutcome::Written(name),
        None => ItemOutcome::Unchanged(record.name),
    };
    tracing::debug!("Comment {}: {:?}", id, outcome);

    Ok(outcome)
}
