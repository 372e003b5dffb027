//! Extraction rule engine
//!
//! Each purpose (listing links, detail links, next page, deadline, action
//! link) has an ordered rule list in the site profile. Detail links are the
//! union of every rule's matches; all other purposes stop at the first rule
//! that yields a usable result.
//!
//! Everything here is synchronous and works on an already parsed
//! [`Document`](crate::crawler::Document).

mod dates;
mod links;
mod rules;
mod text;

pub use dates::{find_expiry, first_date_in, parse_date, to_expiry};
pub use links::{candidate_links, collect_links, element_link, first_link, first_link_where};
pub use rules::{DateRule, LinkRule, SiteProfile};
pub use text::fold;

use crate::crawler::Document;
use chrono::NaiveDateTime;

impl SiteProfile {
    /// Listing pages linked from an entry page
    ///
    /// Uses the entry-link rules and keeps only URLs accepted by the listing
    /// predicate. The predicate sees the URL as resolved, before any
    /// trailing slash is stripped.
    pub fn listing_links(&self, document: &Document) -> Vec<String> {
        collect_links(document, &self.entry_links, |url| self.is_listing(url))
    }

    /// Detail pages linked from a listing page, restricted to the site's host
    pub fn detail_links(&self, document: &Document) -> Vec<String> {
        collect_links(document, &self.detail_links, |url| self.is_own_host(url))
    }

    /// The "next page" URL of a listing page, if any
    ///
    /// Only links on the site's own host count; a matching link to another
    /// site is passed over in favour of the next match.
    pub fn next_page(&self, document: &Document) -> Option<String> {
        first_link_where(document, &self.next_page, |url| self.is_own_host(url))
    }

    /// The posting's deadline, truncated per the profile's policy
    pub fn expiry(&self, document: &Document) -> Option<NaiveDateTime> {
        find_expiry(document, &self.dates, self.expiry_time)
    }

    /// Participation link candidates, best first
    pub fn action_links(&self, document: &Document) -> Vec<String> {
        candidate_links(document, &self.action_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateRuleConfig, ExpiryTime, LinkRuleConfig, SiteConfig};

    fn rule(selector: &str, text: &[&str]) -> LinkRuleConfig {
        LinkRuleConfig {
            selector: selector.to_string(),
            text: text.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn profile() -> SiteProfile {
        SiteProfile::compile(&SiteConfig {
            name: "supergewinne".to_string(),
            host: "*.supergewinne.de".to_string(),
            entry_points: vec!["https://www.supergewinne.de/".to_string()],
            listing_pattern: Some("^/gewinnspiele/".to_string()),
            expiry_time: ExpiryTime::EndOfDay,
            max_discovery_depth: None,
            entry_links: vec![rule("nav a", &[])],
            detail_links: vec![rule("a", &["mehr lesen"])],
            next_page: vec![
                rule("a[rel*='next']", &[]),
                rule("a", &["ältere", "vorherige"]),
            ],
            dates: vec![DateRuleConfig::Document],
            action_links: vec![rule("a", &["jetzt direkt mitmachen", "zum gewinnspiel"])],
        })
        .unwrap()
    }

    fn page(url: &str, body: &str) -> Document {
        Document::parse(url, &format!("<html><body>{}</body></html>", body)).unwrap()
    }

    #[test]
    fn test_listing_links_apply_predicate() {
        let d = page(
            "https://www.supergewinne.de/",
            r#"<nav class="menu">
                 <a href="/gewinnspiele/">Alle</a>
                 <a href="/gewinnspiele/reisen/">Reisen</a>
                 <a href="/impressum">Impressum</a>
                 <a href="https://facebook.com/gewinnspiele/">FB</a>
               </nav>"#,
        );
        assert_eq!(
            profile().listing_links(&d),
            vec![
                "https://www.supergewinne.de/gewinnspiele/".to_string(),
                "https://www.supergewinne.de/gewinnspiele/reisen/".to_string(),
            ]
        );
    }

    #[test]
    fn test_detail_links_are_same_host_only() {
        let d = page(
            "https://www.supergewinne.de/gewinnspiele/",
            r#"<article><a href="/auto-gewinnen/">Mehr lesen</a></article>
               <article><a href="https://partner.example/x">Mehr lesen</a></article>"#,
        );
        assert_eq!(
            profile().detail_links(&d),
            vec!["https://www.supergewinne.de/auto-gewinnen/".to_string()]
        );
    }

    #[test]
    fn test_reverse_chronological_next_page() {
        let d = page(
            "https://www.supergewinne.de/gewinnspiele/",
            r#"<div class="nav-links"><a href="page/2/">« Ältere Einträge</a></div>"#,
        );
        assert_eq!(
            profile().next_page(&d).as_deref(),
            Some("https://www.supergewinne.de/gewinnspiele/page/2/")
        );
    }

    #[test]
    fn test_next_page_stays_on_own_host() {
        let d = page(
            "https://www.supergewinne.de/gewinnspiele/",
            r#"<a rel="next" href="https://werbung.example/next">Anzeige</a>
               <a class="page-numbers" href="page/2/">Ältere Einträge</a>"#,
        );
        assert_eq!(
            profile().next_page(&d).as_deref(),
            Some("https://www.supergewinne.de/gewinnspiele/page/2/")
        );

        let d = page(
            "https://www.supergewinne.de/gewinnspiele/",
            r#"<a rel="next" href="https://werbung.example/next">Anzeige</a>"#,
        );
        assert_eq!(profile().next_page(&d), None);
    }

    #[test]
    fn test_end_of_day_expiry() {
        let d = page(
            "https://www.supergewinne.de/auto-gewinnen",
            "<p>Mitmachen bis zum 24.12.2030!</p>",
        );
        assert_eq!(
            profile().expiry(&d).map(|dt| dt.to_string()),
            Some("2030-12-24 23:59:59".to_string())
        );
    }

    #[test]
    fn test_action_links() {
        let d = page(
            "https://www.supergewinne.de/auto-gewinnen",
            r#"<a href="/go/auto">Jetzt direkt mitmachen</a>"#,
        );
        assert_eq!(
            profile().action_links(&d),
            vec!["https://www.supergewinne.de/go/auto".to_string()]
        );
    }
}
