//! Reconciliation engine
//!
//! Turns one extracted posting into at most one store mutation. The external
//! URL is the only key: a posting seen again with the same status and expiry
//! causes no write at all.

use crate::storage::{PostingStore, StorageError};
use crate::url::canonicalize;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fmt;

/// Status of a stored posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingStatus {
    Aktiv,
    Ende,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aktiv => "Aktiv",
            Self::Ende => "Ende",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "Aktiv" => Some(Self::Aktiv),
            "Ende" => Some(Self::Ende),
            _ => None,
        }
    }

    /// Status of a posting expiring at `expires_at`, as seen on `today`
    ///
    /// A posting is over once its expiry lies before the start of today. A
    /// deadline falling on today itself is still `Aktiv`, whichever time of
    /// day the profile truncates to.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use gewinn_crawler::PostingStatus;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    /// let yesterday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
    /// let expiry = yesterday.and_hms_opt(23, 59, 59).unwrap();
    ///
    /// assert_eq!(PostingStatus::from_expiry(expiry, today), PostingStatus::Ende);
    /// ```
    pub fn from_expiry(expires_at: NaiveDateTime, today: NaiveDate) -> Self {
        if expires_at < today.and_time(Default::default()) {
            Self::Ende
        } else {
            Self::Aktiv
        }
    }

    /// Status relative to the local calendar date
    pub fn derive(expires_at: NaiveDateTime) -> Self {
        Self::from_expiry(expires_at, Local::now().date_naive())
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What reconciling one posting did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No record existed; one was inserted
    Created,
    /// Status or expiry differed; both were rewritten
    Updated,
    /// Stored record already matched; nothing was written
    Skipped,
}

/// Creates, updates or skips the stored record for `external_url`
///
/// The URL is canonicalized before lookup, so two spellings of the same
/// destination always land on one record.
///
/// # Arguments
///
/// * `store` - The posting store
/// * `external_url` - Final destination of the posting's action link
/// * `expires_at` - Extracted deadline, already truncated per profile
/// * `status` - Status derived from `expires_at`
///
/// # Returns
///
/// * `Ok(ReconcileOutcome)` - What happened
/// * `Err(StorageError)` - The store rejected a lookup or write
pub fn reconcile<S: PostingStore + ?Sized>(
    store: &mut S,
    external_url: &str,
    expires_at: NaiveDateTime,
    status: PostingStatus,
) -> Result<ReconcileOutcome, StorageError> {
    let key = canonicalize(external_url);

    match store.find_by_external_url(&key)? {
        None => {
            store.insert(&key, status, expires_at)?;
            Ok(ReconcileOutcome::Created)
        }
        Some(existing) => {
            let unchanged =
                existing.status == status.as_str() && existing.expires_at == Some(expires_at);
            if unchanged {
                return Ok(ReconcileOutcome::Skipped);
            }

            store.update(existing.id, status, expires_at)?;
            Ok(ReconcileOutcome::Updated)
        }
    }
}
