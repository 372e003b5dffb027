//! Statistics generation from the posting database
//!
//! This module provides functionality for extracting and displaying
//! posting and run statistics from the storage layer.

use crate::storage::{RunRecord, SqliteStorage, StorageError};
use std::fmt::Write as _;

/// Posting database statistics
#[derive(Debug, Clone)]
pub struct PostingStatistics {
    /// Total number of stored postings
    pub total_postings: u64,

    /// Postings per status value, most frequent first
    pub postings_by_status: Vec<(String, u64)>,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The database to query
///
/// # Returns
///
/// * `Ok(PostingStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> Result<PostingStatistics, StorageError> {
    Ok(PostingStatistics {
        total_postings: storage.count_postings()?,
        postings_by_status: storage.count_postings_by_status()?,
        latest_run: storage.latest_run()?,
    })
}

/// Renders statistics as the text printed by `--stats`
pub fn format_statistics(stats: &PostingStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Posting Statistics ===\n");
    let _ = writeln!(out, "Postings: {}", stats.total_postings);
    for (status, count) in &stats.postings_by_status {
        let percentage = if stats.total_postings > 0 {
            (*count as f64 / stats.total_postings as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", status, count, percentage);
    }
    let _ = writeln!(out);

    match &stats.latest_run {
        Some(run) => {
            let _ = writeln!(out, "Latest Run #{} ({:?}):", run.id, run.status);
            let _ = writeln!(out, "  Started: {}", run.started_at);
            let _ = writeln!(
                out,
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("-")
            );
            let _ = writeln!(out, "  Config hash: {}", run.config_hash);
            let _ = writeln!(out, "  {}", run.summary);
            if run.summary.failed_listings > 0 {
                let _ = writeln!(
                    out,
                    "  Listing pages not loaded: {}",
                    run.summary.failed_listings
                );
            }
        }
        None => {
            let _ = writeln!(out, "No runs recorded yet");
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &PostingStatistics) {
    print!("{}", format_statistics(stats));
}
