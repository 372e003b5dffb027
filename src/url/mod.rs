//! URL handling
//!
//! Reference resolution against a page URL, canonicalization for dedup and
//! storage keys, and host-pattern matching for site profiles.

mod matcher;
mod normalize;
mod resolve;

pub use matcher::{matches_wildcard, url_on_host};
pub use normalize::canonicalize;
pub use resolve::resolve;

/// Returns true for URLs the crawler is able to fetch
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
