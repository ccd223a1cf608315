//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::{CommentRecord, SubmissionRecord};
use crate::storage::{
    ClearTarget, ClearedCounts, PersistedState, RawQueryOutcome, RunCounts, RunRecord, RunStatus,
};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// One value of this trait is one connection. Workers each open their own,
/// so implementations only need to be `Send`, not `Sync`.
pub trait Storage {
    // ===== Submissions =====

    /// Inserts a submission, or updates every non-key field when `overwrite` is set
    ///
    /// # Returns
    ///
    /// The submission's fullname when a row was inserted or updated, `None`
    /// when a conflicting row was left untouched
    fn upsert_submission(
        &mut self,
        record: &SubmissionRecord,
        overwrite: bool,
    ) -> StorageResult<Option<String>>;

    /// Checks whether a submission is already stored
    fn submission_exists(&self, name: &str) -> StorageResult<bool>;

    /// Gets a submission by fullname
    fn get_submission(&self, name: &str) -> StorageResult<Option<SubmissionRecord>>;

    // ===== Comments =====

    /// Inserts a comment, or updates every non-key field when `overwrite` is set
    ///
    /// Same return contract as [`Storage::upsert_submission`].
    fn upsert_comment(
        &mut self,
        record: &CommentRecord,
        overwrite: bool,
    ) -> StorageResult<Option<String>>;

    /// Upserts a batch of comments in one transaction
    ///
    /// Without `overwrite`, conflicting rows are skipped. Returns the number
    /// of rows inserted or updated.
    fn upsert_comments(&mut self, records: &[CommentRecord], overwrite: bool)
        -> StorageResult<usize>;

    /// Inserts a batch of comments, skipping any that already exist
    fn insert_comments(&mut self, records: &[CommentRecord]) -> StorageResult<usize> {
        self.upsert_comments(records, false)
    }

    /// Applies field-level updates keyed by fullname in one transaction
    ///
    /// `name` and `submission_id` are never touched. Returns the number of
    /// rows updated.
    fn update_comments(&mut self, records: &[CommentRecord]) -> StorageResult<usize>;

    /// Gets a comment by fullname
    fn get_comment(&self, name: &str) -> StorageResult<Option<CommentRecord>>;

    /// Loads `(edited, ups)` for every stored comment of a submission
    fn comment_snapshot(&self, submission_id: &str)
        -> StorageResult<HashMap<String, PersistedState>>;

    // ===== Frontier Queries =====

    /// Gets up to `limit` distinct authors active in a community, most active first
    fn authors_in_community(&self, community: &str, limit: usize) -> StorageResult<Vec<String>>;

    /// Gets every community the given authors have commented in
    fn communities_for_authors(&self, authors: &[String]) -> StorageResult<Vec<String>>;

    // ===== Maintenance =====

    /// Deletes rows from one or both tables
    fn clear(&mut self, target: ClearTarget) -> StorageResult<ClearedCounts>;

    /// Executes an arbitrary SQL statement
    fn execute_raw(&mut self, sql: &str) -> StorageResult<RawQueryOutcome>;

    // ===== Run Management =====

    /// Records the start of a top-level command
    fn create_run(&mut self, command: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records the end of a top-level command with its final counts
    fn finish_run(&mut self, run_id: i64, status: RunStatus, counts: &RunCounts)
        -> StorageResult<()>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    // ===== Statistics =====

    /// Gets total submission count
    fn count_submissions(&self) -> StorageResult<u64>;

    /// Gets total comment count
    fn count_comments(&self) -> StorageResult<u64>;

    /// Gets count of distinct communities across both tables
    fn count_communities(&self) -> StorageResult<u64>;

    /// Gets count of distinct known authors across both tables
    fn count_authors(&self) -> StorageResult<u64>;
}
