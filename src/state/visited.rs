use crate::crawler::UrlClass;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Canonical URLs already taken by some worker during the current run
///
/// One set per [`UrlClass`]. Membership is checked and recorded in a single
/// critical section so two workers can never both claim the same URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entry: Mutex<HashSet<String>>,
    listing: Mutex<HashSet<String>>,
    detail: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, class: UrlClass) -> MutexGuard<'_, HashSet<String>> {
        let set = match class {
            UrlClass::Entry => &self.entry,
            UrlClass::Listing => &self.listing,
            UrlClass::Detail => &self.detail,
        };
        // A panicking worker cannot leave a half-inserted HashSet behind
        set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `url` and returns true if it had not been seen in this class
    pub fn insert_if_new(&self, class: UrlClass, url: &str) -> bool {
        let mut set = self.set(class);
        if set.contains(url) {
            false
        } else {
            set.insert(url.to_string())
        }
    }

    pub fn contains(&self, class: UrlClass, url: &str) -> bool {
        self.set(class).contains(url)
    }

    /// Number of URLs claimed in a class
    pub fn len(&self, class: UrlClass) -> usize {
        self.set(class).len()
    }
}
