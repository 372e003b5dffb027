//! Output module for run summaries and statistics
//!
//! This module handles:
//! - The run summary printed when a crawl ends
//! - Posting and run statistics for `--stats`

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, PostingStatistics};

use crate::state::RunSummary;

/// Prints the end-of-run summary
///
/// The first line is the fixed summary format; failed listing fetches follow
/// on a line of their own when there were any.
pub fn print_run_summary(summary: &RunSummary) {
    println!("{}", summary);
    if summary.failed_listings > 0 {
        println!(
            "{} listing page(s) could not be loaded",
            summary.failed_listings
        );
    }
}
