//! Text folding for case- and diacritic-insensitive matching

use scraper::ElementRef;

/// Folds text for comparison
///
/// Lowercases, strips German and common Latin-1 diacritics, expands `ß` to
/// `ss` and collapses runs of whitespace into a single space. Both the
/// needle and the haystack go through this, so "Nächste" matches "nachste"
/// and "Einsendeschluß" matches "einsendeschluss".
pub fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !folded.is_empty();
            continue;
        }
        if pending_space {
            folded.push(' ');
            pending_space = false;
        }
        match c {
            'ä' | 'à' | 'á' | 'â' | 'ã' | 'å' => folded.push('a'),
            'ö' | 'ò' | 'ó' | 'ô' | 'õ' | 'ø' => folded.push('o'),
            'ü' | 'ù' | 'ú' | 'û' => folded.push('u'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'í' | 'ì' | 'î' | 'ï' => folded.push('i'),
            'ç' => folded.push('c'),
            'ñ' => folded.push('n'),
            'ß' => folded.push_str("ss"),
            other => folded.push(other),
        }
    }

    folded
}

/// Rendered text of an element, with text nodes separated by spaces
///
/// Adjacent cells such as `<td>1.2.2024</td><td>5</td>` must not run
/// together into `1.2.20245`.
pub fn element_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for chunk in element.text() {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(chunk);
    }
    out
}

/// Returns true if the folded haystack contains any folded needle
pub fn contains_any(haystack_folded: &str, needles_folded: &[String]) -> bool {
    needles_folded
        .iter()
        .any(|needle| haystack_folded.contains(needle.as_str()))
}
