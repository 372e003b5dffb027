//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one run:
//! - Expanding each site's entry points into the set of listing pages
//! - Walking every listing chain through its pagination
//! - Handling each newly seen detail page
//! - Handing extracted postings to reconciliation
//!
//! Chains run as independent tasks, at most `workers` at a time. Within a chain
//! everything is sequential. Fetch failures and extraction misses only end the
//! chain or detail item they belong to.

use crate::crawler::fetcher::{fetch_document, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierItem, UrlClass};
use crate::extract::SiteProfile;
use crate::reconcile::{reconcile, PostingStatus, ReconcileOutcome};
use crate::state::{RunStats, RunSummary, VisitedSet};
use crate::storage::{PostingStore, StorageError};
use crate::url::canonicalize;
use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Main crawler coordinator structure
///
/// Cloning is cheap and yields a handle onto the same run: the visited set,
/// the counters and the store are shared.
pub struct Coordinator<F, S> {
    fetcher: Arc<F>,
    store: Arc<Mutex<S>>,
    visited: Arc<VisitedSet>,
    stats: Arc<RunStats>,
    workers: usize,
}

impl<F, S> Clone for Coordinator<F, S> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            store: Arc::clone(&self.store),
            visited: Arc::clone(&self.visited),
            stats: Arc::clone(&self.stats),
            workers: self.workers,
        }
    }
}

impl<F, S> Coordinator<F, S>
where
    F: Fetcher + 'static,
    S: PostingStore + Send + 'static,
{
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Network access
    /// * `store` - Posting store, locked only around single reconcile calls
    /// * `workers` - Maximum number of listing chains in flight
    pub fn new(fetcher: F, store: Arc<Mutex<S>>, workers: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store,
            visited: Arc::new(VisitedSet::new()),
            stats: Arc::new(RunStats::new()),
            workers: workers.max(1),
        }
    }

    /// Crawls every profile and returns the run's counters
    pub async fn run(&self, profiles: Vec<SiteProfile>) -> RunSummary {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut chains = JoinSet::new();

        for profile in profiles {
            let profile = Arc::new(profile);
            let listings = self.discover_listings(&profile).await;
            tracing::info!(
                "Site '{}': {} listing chain(s) to walk",
                profile.name,
                listings.len()
            );

            for start in listings {
                let start = FrontierItem::listing(start);
                if !self.visited.insert_if_new(UrlClass::Listing, &start.key) {
                    tracing::debug!("Listing {} already claimed by another chain", start.url);
                    continue;
                }

                let coordinator = self.clone();
                let profile = Arc::clone(&profile);
                let permits = Arc::clone(&permits);
                chains.spawn(async move {
                    // The semaphore is never closed
                    let _permit = permits.acquire_owned().await;
                    coordinator.run_chain(&profile, start).await;
                });
            }
        }

        while let Some(joined) = chains.join_next().await {
            if let Err(e) = joined {
                tracing::error!("[ERROR] Listing chain aborted: {}", e);
            }
        }

        let summary = self.stats.snapshot();
        tracing::info!("{}", summary);
        summary
    }

    /// Breadth-first expansion of a site's entry points
    ///
    /// Seeds are always chain starts. Every page reached this way is fetched
    /// once and its listing links are queued, until no new listing URL turns
    /// up or the profile's discovery depth is reached.
    ///
    /// # Returns
    ///
    /// Listing URLs as resolved, unique by canonical form, in discovery order
    pub async fn discover_listings(&self, profile: &SiteProfile) -> Vec<String> {
        let mut listings = Vec::new();
        let mut queue: VecDeque<(String, u32)> = profile
            .entry_points
            .iter()
            .map(|url| (url.clone(), 0))
            .collect();

        while let Some((url, depth)) = queue.pop_front() {
            if !self.visited.insert_if_new(UrlClass::Entry, &canonicalize(&url)) {
                continue;
            }
            listings.push(url.clone());

            if profile.max_discovery_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            let found = match fetch_document(self.fetcher.as_ref(), &url).await {
                Ok(document) => profile.listing_links(&document),
                Err(e) => {
                    tracing::error!("[ERROR] Einstiegsseite nicht ladbar: {} ({})", url, e);
                    continue;
                }
            };

            for link in found {
                if !self.visited.contains(UrlClass::Entry, &canonicalize(&link)) {
                    tracing::trace!("Discovered listing {} at depth {}", link, depth + 1);
                    queue.push_back((link, depth + 1));
                }
            }
        }

        listings
    }

    /// Walks one listing chain until pagination ends or a fetch fails
    ///
    /// `start` must already be claimed in the listing visited set.
    pub async fn run_chain(&self, profile: &SiteProfile, start: FrontierItem) {
        let mut frontier = Frontier::starting_at(start);

        while let Some(item) = frontier.pop() {
            match item.class {
                UrlClass::Listing => self.process_listing(profile, &item.url, &mut frontier).await,
                UrlClass::Detail => self.process_detail(profile, &item.url).await,
                UrlClass::Entry => {}
            }
        }
    }

    async fn process_listing(&self, profile: &SiteProfile, url: &str, frontier: &mut Frontier) {
        let (details, next) = match fetch_document(self.fetcher.as_ref(), url).await {
            Ok(document) => (profile.detail_links(&document), profile.next_page(&document)),
            Err(e) => {
                tracing::error!("[ERROR] Konnte Listing nicht laden: {} ({})", url, e);
                self.stats.record_failed_listing();
                return;
            }
        };

        tracing::debug!(
            "Listing {}: {} detail link(s), next: {}",
            url,
            details.len(),
            next.as_deref().unwrap_or("-")
        );

        for detail in details.into_iter().map(FrontierItem::detail) {
            if self.visited.insert_if_new(UrlClass::Detail, &detail.key) {
                frontier.push(detail);
            }
        }

        match next.map(FrontierItem::listing) {
            Some(next) if self.visited.insert_if_new(UrlClass::Listing, &next.key) => {
                frontier.push(next);
            }
            Some(next) => tracing::debug!("Pagination of {} ends at visited {}", url, next.url),
            None => tracing::debug!("Pagination ends at {}", url),
        }
    }

    async fn process_detail(&self, profile: &SiteProfile, url: &str) {
        let (expiry, candidates) = match fetch_document(self.fetcher.as_ref(), url).await {
            Ok(document) => (profile.expiry(&document), profile.action_links(&document)),
            Err(e) => {
                tracing::error!("[ERROR] Detailseite nicht erreichbar: {} ({})", url, e);
                self.stats.record_skip();
                return;
            }
        };

        let Some(expires_at) = expiry else {
            tracing::warn!("[SKIP] Kein Datum erkannt: {}", url);
            self.stats.record_skip();
            return;
        };

        if candidates.is_empty() {
            tracing::warn!("[SKIP] Kein Mitmach-Link gefunden: {}", url);
            self.stats.record_skip();
            return;
        }

        let Some(external_url) = self.resolve_first(&candidates).await else {
            tracing::warn!("[SKIP] Externe URL nicht auflösbar: {}", url);
            self.stats.record_skip();
            return;
        };

        let status = PostingStatus::derive(expires_at);
        match self.reconcile_posting(&external_url, expires_at, status) {
            Ok(outcome) => {
                let label = match outcome {
                    ReconcileOutcome::Created => "[OK] Neu",
                    ReconcileOutcome::Updated => "[UPDATE] Aktualisiert",
                    ReconcileOutcome::Skipped => "[SKIP] Unverändert",
                };
                tracing::info!(
                    "{}: {} ({}, {})",
                    label,
                    external_url,
                    status,
                    expires_at.date()
                );
                self.stats.record(outcome);
            }
            Err(e) => {
                tracing::error!("[ERROR] Speichern fehlgeschlagen für {}: {}", external_url, e);
                self.stats.record_skip();
            }
        }
    }

    /// Resolves candidates in order and returns the first external URL
    async fn resolve_first(&self, candidates: &[String]) -> Option<String> {
        for candidate in candidates {
            match self.fetcher.resolve_redirect_target(candidate).await {
                Ok(target) => return Some(canonicalize(&target)),
                Err(e) => tracing::debug!("Action link {} not resolvable: {}", candidate, e),
            }
        }
        None
    }

    fn reconcile_posting(
        &self,
        external_url: &str,
        expires_at: NaiveDateTime,
        status: PostingStatus,
    ) -> Result<ReconcileOutcome, StorageError> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        reconcile(&mut *store, external_url, expires_at, status)
    }
}
