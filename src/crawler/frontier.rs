//! Per-chain traversal queue
//!
//! A listing chain owns one [`Frontier`]. Processing a listing page pushes its
//! new detail URLs followed by the next listing page, so the FIFO order gives
//! `FETCH → PROCESS → FIND_NEXT → FETCH` with every detail of a page handled
//! before the chain moves on.

use crate::url::canonicalize;
use std::collections::VecDeque;
use std::fmt;

/// Class of a URL; the visited set is kept separately per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    /// Page fetched while expanding entry points
    Entry,
    /// Listing page walked by a pagination chain
    Listing,
    /// Single posting page
    Detail,
}

impl fmt::Display for UrlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entry => "entry",
            Self::Listing => "listing",
            Self::Detail => "detail",
        };
        f.write_str(name)
    }
}

/// A URL awaiting traversal
///
/// `url` is requested exactly as it was resolved, so a directory listing keeps
/// its trailing slash and relative links on it resolve below it. `key` is the
/// canonical form used for the visited set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: String,
    pub key: String,
    pub class: UrlClass,
}

impl FrontierItem {
    pub fn new(url: impl Into<String>, class: UrlClass) -> Self {
        let url = url.into();
        Self {
            key: canonicalize(&url),
            url,
            class,
        }
    }

    pub fn listing(url: impl Into<String>) -> Self {
        Self::new(url, UrlClass::Listing)
    }

    pub fn detail(url: impl Into<String>) -> Self {
        Self::new(url, UrlClass::Detail)
    }
}

/// FIFO queue of pending items for one chain
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierItem>,
}

impl Frontier {
    /// Creates a frontier seeded with one listing URL
    pub fn starting_at(listing: FrontierItem) -> Self {
        let mut frontier = Self::default();
        frontier.push(listing);
        frontier
    }

    pub fn push(&mut self, item: FrontierItem) {
        tracing::trace!("Frontier push {} {}", item.class, item.url);
        self.queue.push_back(item);
    }

    pub fn pop(&mut self) -> Option<FrontierItem> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
