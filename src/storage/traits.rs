//! Storage traits and error types
//!
//! This module defines the contract the reconciliation engine holds against
//! a posting store, and the associated error types.

use crate::reconcile::PostingStatus;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Posting not found: {0}")]
    PostingNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A posting as currently persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPosting {
    pub id: i64,

    /// Canonical external URL, the record's unique key
    pub external_url: String,

    pub description: String,

    /// Raw status column; compared against [`PostingStatus::as_str`]
    pub status: String,

    /// `None` when the stored value is not a valid timestamp
    pub expires_at: Option<NaiveDateTime>,
}

/// Keyed posting store
///
/// These three operations are all the crawl core ever issues.
pub trait PostingStore {
    /// Looks up the record for a canonical external URL
    fn find_by_external_url(&self, url: &str) -> StorageResult<Option<StoredPosting>>;

    /// Inserts a new record with an empty description
    ///
    /// # Returns
    ///
    /// The ID of the new record
    fn insert(
        &mut self,
        url: &str,
        status: PostingStatus,
        expires_at: NaiveDateTime,
    ) -> StorageResult<i64>;

    /// Rewrites status and expiry of an existing record
    fn update(&mut self, id: i64, status: PostingStatus, expires_at: NaiveDateTime)
        -> StorageResult<()>;
}
