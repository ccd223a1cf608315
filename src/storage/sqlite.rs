//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::record::{CommentRecord, SubmissionRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{
    ClearTarget, ClearedCounts, PersistedState, RawQueryOutcome, RunCounts, RunRecord, RunStatus,
};
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// How long a connection waits on a lock held by another worker
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const INSERT_SUBMISSION: &str = "
    INSERT INTO submissions
        (name, author, title, selftext, url, created_utc, edited, ups, subreddit, permalink)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const INSERT_COMMENT: &str = "
    INSERT INTO comments
        (name, author, body, created_utc, edited, ups, parent_id, submission_id, subreddit)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const SUBMISSION_OVERWRITE: &str = "
    ON CONFLICT(name) DO UPDATE SET
        author = excluded.author,
        title = excluded.title,
        selftext = excluded.selftext,
        url = excluded.url,
        created_utc = excluded.created_utc,
        edited = excluded.edited,
        ups = excluded.ups,
        subreddit = excluded.subreddit,
        permalink = excluded.permalink";

const COMMENT_OVERWRITE: &str = "
    ON CONFLICT(name) DO UPDATE SET
        author = excluded.author,
        body = excluded.body,
        created_utc = excluded.created_utc,
        edited = excluded.edited,
        ups = excluded.ups,
        parent_id = excluded.parent_id,
        submission_id = excluded.submission_id,
        subreddit = excluded.subreddit";

const SKIP_CONFLICT: &str = " ON CONFLICT(name) DO NOTHING";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ScrapeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScrapeError> {
        let conn = Connection::open(path)?;

        // Several workers write to the same file concurrently
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, ScrapeError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// Builds an insert statement with the conflict policy appended
fn upsert_sql(insert: &str, overwrite_clause: &str, overwrite: bool) -> String {
    if overwrite {
        format!("{}{}", insert, overwrite_clause)
    } else {
        format!("{}{}", insert, SKIP_CONFLICT)
    }
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<SubmissionRecord> {
    Ok(SubmissionRecord {
        name: row.get(0)?,
        author: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        selftext: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        created_utc: parse_timestamp(5, row.get(5)?)?,
        edited: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
        ups: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
        subreddit: row.get(8)?,
        permalink: row.get(9)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        name: row.get(0)?,
        author: row.get(1)?,
        body: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        created_utc: parse_timestamp(3, row.get(3)?)?,
        edited: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
        ups: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
        parent_id: row.get(6)?,
        submission_id: row.get(7)?,
        subreddit: row.get(8)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        command: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        counts: RunCounts {
            new: row.get::<_, i64>(6)?.max(0) as u64,
            changed: row.get::<_, i64>(7)?.max(0) as u64,
            unchanged: row.get::<_, i64>(8)?.max(0) as u64,
            errors: row.get::<_, i64>(9)?.max(0) as u64,
        },
    })
}

/// Renders a raw column value for display
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(blob) => format!("<{} bytes>", blob.len()),
    }
}

impl Storage for SqliteStorage {
    // ===== Submissions =====

    fn upsert_submission(
        &mut self,
        record: &SubmissionRecord,
        overwrite: bool,
    ) -> StorageResult<Option<String>> {
        let sql = format!(
            "{} RETURNING name",
            upsert_sql(INSERT_SUBMISSION, SUBMISSION_OVERWRITE, overwrite)
        );

        let name = self
            .conn
            .query_row(
                &sql,
                params![
                    record.name,
                    record.author,
                    record.title,
                    record.selftext,
                    record.url,
                    record.created_utc.to_rfc3339(),
                    record.edited,
                    record.ups,
                    record.subreddit,
                    record.permalink,
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(name)
    }

    fn submission_exists(&self, name: &str) -> StorageResult<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM submissions WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    fn get_submission(&self, name: &str) -> StorageResult<Option<SubmissionRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT name, author, title, selftext, url, created_utc, edited, ups, subreddit, permalink
                 FROM submissions WHERE name = ?1",
                params![name],
                submission_from_row,
            )
            .optional()?;
        Ok(record)
    }

    // ===== Comments =====

    fn upsert_comment(
        &mut self,
        record: &CommentRecord,
        overwrite: bool,
    ) -> StorageResult<Option<String>> {
        let sql = format!(
            "{} RETURNING name",
            upsert_sql(INSERT_COMMENT, COMMENT_OVERWRITE, overwrite)
        );

        let name = self
            .conn
            .query_row(
                &sql,
                params![
                    record.name,
                    record.author,
                    record.body,
                    record.created_utc.to_rfc3339(),
                    record.edited,
                    record.ups,
                    record.parent_id,
                    record.submission_id,
                    record.subreddit,
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(name)
    }

    fn upsert_comments(
        &mut self,
        records: &[CommentRecord],
        overwrite: bool,
    ) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let sql = upsert_sql(INSERT_COMMENT, COMMENT_OVERWRITE, overwrite);
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                written += stmt.execute(params![
                    record.name,
                    record.author,
                    record.body,
                    record.created_utc.to_rfc3339(),
                    record.edited,
                    record.ups,
                    record.parent_id,
                    record.submission_id,
                    record.subreddit,
                ])?;
            }
        }
        tx.commit()?;

        Ok(written)
    }

    fn update_comments(&mut self, records: &[CommentRecord]) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE comments SET
                    author = ?1, body = ?2, created_utc = ?3, edited = ?4,
                    ups = ?5, parent_id = ?6, subreddit = ?7
                 WHERE name = ?8",
            )?;
            for record in records {
                updated += stmt.execute(params![
                    record.author,
                    record.body,
                    record.created_utc.to_rfc3339(),
                    record.edited,
                    record.ups,
                    record.parent_id,
                    record.subreddit,
                    record.name,
                ])?;
            }
        }
        tx.commit()?;

        Ok(updated)
    }

    fn get_comment(&self, name: &str) -> StorageResult<Option<CommentRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT name, author, body, created_utc, edited, ups, parent_id, submission_id, subreddit
                 FROM comments WHERE name = ?1",
                params![name],
                comment_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn comment_snapshot(
        &self,
        submission_id: &str,
    ) -> StorageResult<HashMap<String, PersistedState>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, edited, ups FROM comments WHERE submission_id = ?1")?;

        let rows = stmt.query_map(params![submission_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                PersistedState {
                    edited: row.get::<_, Option<bool>>(1)?.unwrap_or(false),
                    ups: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                },
            ))
        })?;

        let mut snapshot = HashMap::new();
        for row in rows {
            let (name, state) = row?;
            snapshot.insert(name, state);
        }
        Ok(snapshot)
    }

    // ===== Frontier Queries =====

    fn authors_in_community(&self, community: &str, limit: usize) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT author FROM (
                SELECT author FROM comments
                WHERE subreddit = ?1 COLLATE NOCASE AND author IS NOT NULL
                UNION ALL
                SELECT author FROM submissions
                WHERE subreddit = ?1 COLLATE NOCASE AND author IS NOT NULL
             )
             GROUP BY author
             ORDER BY COUNT(*) DESC, author ASC
             LIMIT ?2",
        )?;

        let authors = stmt
            .query_map(params![community, limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(authors)
    }

    fn communities_for_authors(&self, authors: &[String]) -> StorageResult<Vec<String>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; authors.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT subreddit FROM comments WHERE author IN ({}) ORDER BY subreddit",
            placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let communities = stmt
            .query_map(params_from_iter(authors.iter()), |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(communities)
    }

    // ===== Maintenance =====

    fn clear(&mut self, target: ClearTarget) -> StorageResult<ClearedCounts> {
        let tx = self.conn.transaction()?;
        let mut cleared = ClearedCounts::default();

        if target.clears_comments() {
            cleared.comments = tx.execute("DELETE FROM comments", [])?;
        }
        if target.clears_submissions() {
            cleared.submissions = tx.execute("DELETE FROM submissions", [])?;
        }

        tx.commit()?;
        Ok(cleared)
    }

    fn execute_raw(&mut self, sql: &str) -> StorageResult<RawQueryOutcome> {
        let mut stmt = self.conn.prepare(sql)?;

        if stmt.column_count() == 0 {
            let affected = stmt.execute([])?;
            return Ok(RawQueryOutcome::Affected(affected));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut result = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(render_value(row.get_ref(idx)?));
            }
            result.push(values);
        }

        Ok(RawQueryOutcome::Rows {
            columns,
            rows: result,
        })
    }

    // ===== Run Management =====

    fn create_run(&mut self, command: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (command, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![command, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET
                status = ?1, finished_at = ?2,
                new_count = ?3, changed_count = ?4, unchanged_count = ?5, error_count = ?6
             WHERE id = ?7",
            params![
                status.to_db_string(),
                now,
                counts.new as i64,
                counts.changed as i64,
                counts.unchanged as i64,
                counts.errors as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, command, started_at, finished_at, config_hash, status,
                    new_count, changed_count, unchanged_count, error_count
             FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Statistics =====

    fn count_submissions(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM submissions")
    }

    fn count_comments(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM comments")
    }

    fn count_communities(&self) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM (
                SELECT subreddit FROM submissions
                UNION
                SELECT subreddit FROM comments
             )",
        )
    }

    fn count_authors(&self) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM (
                SELECT author FROM submissions WHERE author IS NOT NULL
                UNION
                SELECT author FROM comments WHERE author IS NOT NULL
             )",
        )
    }
}
