use url::Url;

/// Canonicalizes a URL for visited-set and storage-key comparisons
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; unparseable input is returned unchanged
/// 2. Lowercase scheme and host (done by the parser)
/// 3. Remove the fragment
/// 4. Remove trailing slashes from non-root paths
/// 5. Keep the query string exactly as found
///
/// The result is a fixed point: canonicalizing it again yields the same
/// string.
///
/// # Examples
///
/// ```
/// use gewinn_crawler::url::canonicalize;
///
/// assert_eq!(
///     canonicalize("HTTP://Example.com/a/"),
///     canonicalize("http://example.com/a")
/// );
/// assert_eq!(canonicalize("https://site.test/x#top"), "https://site.test/x");
/// ```
pub fn canonicalize(url_str: &str) -> String {
    let trimmed = url_str.trim();
    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    url.set_fragment(None);

    if !url.cannot_be_a_base() {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let stripped = path.trim_end_matches('/');
            let stripped = if stripped.is_empty() { "/" } else { stripped }.to_string();
            url.set_path(&stripped);
        }
    }

    url.to_string()
}
