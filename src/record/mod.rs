//! Fixed-shape records persisted in the store
//!
//! Every fetched item is mapped into one of these before it touches the
//! database. The mapping itself lives in [`format`] and has no side effects.

mod format;

pub use format::{fullname, normalize_community, format_comment, format_submission};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while mapping a fetched item into a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Item has neither a fullname nor an id")]
    MissingName,

    #[error("Comment {0} has no owning submission")]
    MissingSubmission(String),
}

/// A root post, keyed by its fullname (`t3_…`)
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub name: String,
    /// `None` when the author account no longer exists
    pub author: Option<String>,
    pub title: String,
    pub selftext: String,
    pub url: String,
    pub created_utc: DateTime<Utc>,
    pub edited: bool,
    pub ups: i64,
    /// Bare community name, without the `r/` prefix
    pub subreddit: String,
    pub permalink: String,
}

/// A reply to a submission or to another comment, keyed by its fullname (`t1_…`)
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub name: String,
    /// `None` when the author account no longer exists
    pub author: Option<String>,
    /// May be a tombstone such as `[deleted]`; stored as-is
    pub body: String,
    pub created_utc: DateTime<Utc>,
    pub edited: bool,
    pub ups: i64,
    pub parent_id: Option<String>,
    /// Fullname of the owning submission
    pub submission_id: String,
    /// Bare community name, without the `r/` prefix
    pub subreddit: String,
}
