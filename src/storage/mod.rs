//! Storage module for persisting scraped content
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Submission and comment upserts with insert-only or overwrite semantics
//! - Reconciliation snapshots and frontier queries
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// The stored fields of a comment that reconciliation compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub edited: bool,
    pub ups: i64,
}

/// Which tables a `delete` command empties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Submissions,
    Comments,
    All,
}

impl ClearTarget {
    pub fn clears_submissions(&self) -> bool {
        matches!(self, Self::Submissions | Self::All)
    }

    pub fn clears_comments(&self) -> bool {
        matches!(self, Self::Comments | Self::All)
    }
}

/// Rows removed by a clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub submissions: usize,
    pub comments: usize,
}

/// Result of an arbitrary SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum RawQueryOutcome {
    /// The statement produced a result set; values are rendered as text
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// The statement modified rows
    Affected(usize),
}

/// Represents a recorded command run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub command: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counts: RunCounts,
}

/// Final tallies of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub new: u64,
    pub changed: u64,
    pub unchanged: u64,
    pub errors: u64,
}

/// Status of a command run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
