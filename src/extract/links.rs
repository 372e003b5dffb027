//! Link discovery
//!
//! Every link-bearing rule looks at an element's `href` first, then at the
//! "virtual link" attributes scripts use instead (`data-href`, `data-url`,
//! `data-link`), then at a URL embedded in an `onclick` handler. The first
//! candidate that resolves to an absolute HTTP(S) URL wins for that element.

use crate::crawler::Document;
use crate::extract::rules::LinkRule;
use crate::extract::text::{contains_any, element_text, fold};
use crate::url::{canonicalize, is_http_url, resolve};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::collections::HashSet;

/// Attributes checked after `href`, in order
const VIRTUAL_LINK_ATTRS: &[&str] = &["data-href", "data-url", "data-link"];

/// First quoted URL or rooted path inside a script handler
static ONCLICK_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]((?:https?:)?//[^'"\s]+|/[^'"\s]*)['"]"#).expect("valid onclick regex")
});

/// Resolves the link an element points to, if any
///
/// # Arguments
///
/// * `element` - The element to inspect (usually an `<a>`)
/// * `base_url` - URL of the page the element lives on
///
/// # Returns
///
/// The absolute URL of the first usable candidate, or `None`
pub fn element_link(element: &ElementRef<'_>, base_url: &str) -> Option<String> {
    let attrs = element.value();

    let from_attrs = std::iter::once("href")
        .chain(VIRTUAL_LINK_ATTRS.iter().copied())
        .filter_map(|name| attrs.attr(name))
        .find_map(|value| resolve_candidate(value, base_url));

    from_attrs.or_else(|| {
        let handler = attrs.attr("onclick")?;
        let captures = ONCLICK_URL.captures(handler)?;
        resolve_candidate(captures.get(1)?.as_str(), base_url)
    })
}

/// Resolves one attribute value, rejecting anything the crawler cannot follow
fn resolve_candidate(raw: &str, base_url: &str) -> Option<String> {
    let raw = raw.trim();

    // Same-page anchors and script pseudo-links are never navigation
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let absolute = resolve(base_url, raw)?;
    if is_http_url(&absolute) {
        Some(absolute)
    } else {
        None
    }
}

/// Elements matching a rule, in document order
pub fn matching_elements<'a>(
    document: &'a Document,
    rule: &'a LinkRule,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    document.html().select(&rule.selector).filter(move |element| {
        rule.text.is_empty() || contains_any(&fold(&element_text(element)), &rule.text)
    })
}

/// Union of the links matched by all rules
///
/// Used for detail-link discovery, where every rule contributes. Results keep
/// first-seen order and are unique by canonical URL, but each link is returned
/// as resolved so it can be requested as the site wrote it. Links failing
/// `accept` are dropped (cross-host links on listing pages).
pub fn collect_links(
    document: &Document,
    rules: &[LinkRule],
    accept: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for rule in rules {
        for element in matching_elements(document, rule) {
            let Some(link) = element_link(&element, document.url()) else {
                continue;
            };
            if !accept(&link) {
                tracing::trace!("Discarding link {}", link);
                continue;
            }
            if seen.insert(canonicalize(&link)) {
                links.push(link);
            }
        }
    }

    links
}

/// First link produced by the rules, tried in priority order
///
/// Later rules are not evaluated once one yields a resolvable URL.
pub fn first_link(document: &Document, rules: &[LinkRule]) -> Option<String> {
    first_link_where(document, rules, |_| true)
}

/// Like [`first_link`], but only links passing `accept` count as a match
pub fn first_link_where(
    document: &Document,
    rules: &[LinkRule],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    rules.iter().find_map(|rule| {
        let found = matching_elements(document, rule)
            .filter_map(|element| element_link(&element, document.url()))
            .find(|link| accept(link));
        if let Some(link) = &found {
            tracing::trace!("Rule '{}' matched {}", rule.source, link);
        }
        found
    })
}

/// Every candidate link the rules produce, in priority order
///
/// Action links need this form: a candidate whose redirect target cannot be
/// resolved is skipped and the next one is tried.
pub fn candidate_links(document: &Document, rules: &[LinkRule]) -> Vec<String> {
    let mut seen = HashSet::new();
    rules
        .iter()
        .flat_map(|rule| matching_elements(document, rule))
        .filter_map(|element| element_link(&element, document.url()))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
