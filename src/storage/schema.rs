//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the scrapeddit database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Root posts
CREATE TABLE IF NOT EXISTS submissions (
    name TEXT PRIMARY KEY,
    author TEXT,
    title TEXT,
    selftext TEXT,
    url TEXT,
    created_utc TEXT NOT NULL,
    edited BOOLEAN DEFAULT 0,
    ups INTEGER DEFAULT 0,
    subreddit TEXT NOT NULL,
    permalink TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_subreddit ON submissions(subreddit);
CREATE INDEX IF NOT EXISTS idx_submissions_author ON submissions(author);

-- Replies to submissions or other comments
CREATE TABLE IF NOT EXISTS comments (
    name TEXT PRIMARY KEY,
    author TEXT,
    body TEXT,
    created_utc TEXT NOT NULL,
    edited BOOLEAN DEFAULT 0,
    ups INTEGER DEFAULT 0,
    parent_id TEXT,
    submission_id TEXT NOT NULL,
    subreddit TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_submission ON comments(submission_id);
CREATE INDEX IF NOT EXISTS idx_comments_subreddit ON comments(subreddit);
CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author);

-- One row per top-level command
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    command TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    new_count INTEGER NOT NULL DEFAULT 0,
    changed_count INTEGER NOT NULL DEFAULT 0,
    unchanged_count INTEGER NOT NULL DEFAULT 0,
    error_count INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["submissions", "comments", "runs"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_column_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO comments (name, created_utc, submission_id, subreddit)
             VALUES ('t1_a', '2024-01-01T00:00:00+00:00', 't3_x', 'rust')",
            [],
        )
        .unwrap();

        let (edited, ups): (bool, i64) = conn
            .query_row("SELECT edited, ups FROM comments WHERE name='t1_a'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert!(!edited);
        assert_eq!(ups, 0);
    }
}
