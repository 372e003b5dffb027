use url::Url;

/// Resolves an href found on a page against the page's URL
///
/// # Resolution Rules
///
/// 1. Empty references resolve to nothing
/// 2. References carrying their own scheme pass through unchanged
/// 3. Protocol-relative references (`//host/path`) take the base's scheme
/// 4. Everything else is joined onto the base's scheme, host, port and the
///    base path with its last segment dropped (`/`-rooted references replace
///    the path entirely), then `.` and `..` segments are collapsed
///
/// Returns `None` when the base has no parseable scheme or host.
///
/// # Examples
///
/// ```
/// use gewinn_crawler::url::resolve;
///
/// assert_eq!(
///     resolve("https://site.test/a/b/c", "../x").as_deref(),
///     Some("https://site.test/a/x")
/// );
/// assert_eq!(
///     resolve("https://site.test/p", "//other.test/y").as_deref(),
///     Some("https://other.test/y")
/// );
/// assert_eq!(resolve("https://site.test/p", ""), None);
/// ```
pub fn resolve(base: &str, relative: &str) -> Option<String> {
    let relative = relative.trim();
    if relative.is_empty() {
        return None;
    }

    if has_scheme(relative) {
        return Some(relative.to_string());
    }

    let base = Url::parse(base.trim()).ok()?;
    let host = base.host_str()?;

    if let Some(rest) = relative.strip_prefix("//") {
        return Some(format!("{}://{}", base.scheme(), rest));
    }

    let authority = match base.port() {
        Some(port) => format!("{}://{}:{}", base.scheme(), host, port),
        None => format!("{}://{}", base.scheme(), host),
    };

    let joined = if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("{}{}", directory_of(base.path()), relative)
    };

    // Dot segments only live in the path, never in the query or fragment
    let split_at = joined.find(['?', '#']).unwrap_or(joined.len());
    let (path, tail) = joined.split_at(split_at);

    Some(format!("{}{}{}", authority, collapse_dot_segments(path), tail))
}

/// Returns true if the reference starts with an RFC 3986 scheme
fn has_scheme(reference: &str) -> bool {
    let Some(colon) = reference.find(':') else {
        return false;
    };
    let scheme = &reference[..colon];

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Drops the last segment of a path, keeping the trailing slash
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// Collapses `.` and `..` segments left to right
///
/// `..` at the root is discarded rather than escaping above it, and a
/// trailing dot segment keeps the directory slash.
fn collapse_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let parts: Vec<&str> = path.split('/').skip(1).collect();
    let last = parts.len().saturating_sub(1);

    for (idx, segment) in parts.iter().enumerate() {
        match *segment {
            "." => {
                if idx == last {
                    segments.push("");
                }
            }
            ".." => {
                segments.pop();
                if idx == last {
                    segments.push("");
                }
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}
