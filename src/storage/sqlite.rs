//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PostingStore
//! trait plus the run bookkeeping used by the bootstrap and `--stats`.

use crate::reconcile::PostingStatus;
use crate::state::RunSummary;
use crate::storage::schema::{initialize_schema, EXPIRES_AT_FORMAT};
use crate::storage::traits::{PostingStore, StorageError, StorageResult, StoredPosting};
use crate::storage::{RunRecord, RunStatus};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

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
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Run Management =====

    /// Records the start of a run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    pub fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Marks a run as completed and stores its counters
    pub fn complete_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, created = ?3, updated = ?4,
             skipped = ?5, failed_listings = ?6 WHERE id = ?7",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                summary.created as i64,
                summary.updated as i64,
                summary.skipped as i64,
                summary.failed_listings as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, created, updated,
                 skipped, failed_listings FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent run
    pub fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, created, updated,
                 skipped, failed_listings FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Statistics =====

    /// Counts postings per status value, most frequent first
    pub fn count_postings_by_status(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM postings GROUP BY status ORDER BY COUNT(*) DESC, status",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// Total number of stored postings
    pub fn count_postings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM postings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        summary: RunSummary {
            created: row.get::<_, i64>(5)? as u64,
            updated: row.get::<_, i64>(6)? as u64,
            skipped: row.get::<_, i64>(7)? as u64,
            failed_listings: row.get::<_, i64>(8)? as u64,
        },
    })
}

fn format_expiry(expires_at: NaiveDateTime) -> String {
    expires_at.format(EXPIRES_AT_FORMAT).to_string()
}

impl PostingStore for SqliteStorage {
    fn find_by_external_url(&self, url: &str) -> StorageResult<Option<StoredPosting>> {
        let posting = self
            .conn
            .query_row(
                "SELECT id, external_url, description, status, expires_at
                 FROM postings WHERE external_url = ?1",
                params![url],
                |row| {
                    let expires_at: String = row.get(4)?;
                    Ok(StoredPosting {
                        id: row.get(0)?,
                        external_url: row.get(1)?,
                        description: row.get(2)?,
                        status: row.get(3)?,
                        expires_at: NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT)
                            .ok(),
                    })
                },
            )
            .optional()?;
        Ok(posting)
    }

    fn insert(
        &mut self,
        url: &str,
        status: PostingStatus,
        expires_at: NaiveDateTime,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO postings (external_url, description, status, expires_at, created_at, updated_at)
             VALUES (?1, '', ?2, ?3, ?4, ?4)",
            params![url, status.as_str(), format_expiry(expires_at), now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(
        &mut self,
        id: i64,
        status: PostingStatus,
        expires_at: NaiveDateTime,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE postings SET status = ?1, expires_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![status.as_str(), format_expiry(expires_at), now, id],
        )?;

        if changed == 0 {
            return Err(StorageError::PostingNotFound(id));
        }
        Ok(())
    }
}
