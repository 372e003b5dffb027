use url::Url;

/// Checks if a host matches a site's host pattern
///
/// Two pattern forms are accepted:
/// 1. Exact: "12gewinn.de" matches only "12gewinn.de"
/// 2. Wildcard: "*.12gewinn.de" matches the bare host and every subdomain
///    ("www.12gewinn.de", "static.cdn.12gewinn.de")
///
/// Comparison ignores ASCII case on both sides, since hosts scraped from
/// markup are not normalized.
///
/// # Examples
///
/// ```
/// use gewinn_crawler::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.12gewinn.de", "www.12gewinn.de"));
/// assert!(matches_wildcard("*.12gewinn.de", "12GEWINN.de"));
/// assert!(!matches_wildcard("*.12gewinn.de", "fake12gewinn.de"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}

/// Checks whether an absolute URL lives on a host covered by `pattern`
///
/// Unparseable URLs and URLs without a host never match.
pub fn url_on_host(pattern: &str, url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| matches_wildcard(pattern, host)))
        .unwrap_or(false)
}
