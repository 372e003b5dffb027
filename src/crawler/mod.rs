//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirect resolution and rate limiting
//! - Best-effort HTML parsing into a queryable document
//! - The per-chain frontier
//! - Overall crawl coordination

mod coordinator;
mod document;
mod fetcher;
mod frontier;

pub use coordinator::Coordinator;
pub use document::Document;
pub use fetcher::{build_http_client, decode_body, fetch_document, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierItem, UrlClass};

use crate::config::Config;
use crate::state::RunSummary;
use crate::storage::open_storage;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Compile the selected site profiles
/// 2. Open the posting database (failure here is fatal)
/// 3. Record a new run
/// 4. Build the HTTP client
/// 5. Walk every listing chain and reconcile the postings found
/// 6. Store the run's counters
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `sites` - Names of the sites to crawl; empty means all
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed; counters of this run
/// * `Err(CrawlError)` - Setup or run bookkeeping failed
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    sites: &[String],
) -> crate::Result<RunSummary> {
    let profiles = config.select_profiles(sites)?;

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let run_id = storage.create_run(config_hash)?;
    tracing::info!(
        "Starting run {} with {} site(s), {} worker(s)",
        run_id,
        profiles.len(),
        config.crawler.workers
    );

    let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent)?;
    let store = Arc::new(Mutex::new(storage));
    let coordinator = Coordinator::new(fetcher, Arc::clone(&store), config.crawler.workers as usize);

    let summary = coordinator.run(profiles).await;

    store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .complete_run(run_id, &summary)?;

    Ok(summary)
}
