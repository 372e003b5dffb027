//! Per-run session state
//!
//! Everything here is created fresh for each run and shared between the
//! workers of that run only.
//!
//! # Components
//!
//! - `VisitedSet`: canonical URLs already claimed, per URL class
//! - `RunStats`: created/updated/skipped counters and failed listing fetches

mod stats;
mod visited;

pub use stats::{RunStats, RunSummary};
pub use visited::VisitedSet;
