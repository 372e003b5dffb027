//! Deadline discovery
//!
//! Dates appear as `D.M.YYYY` or `D.M.YY` with one- or two-digit day and
//! month. Two-digit years always land in the 2000s. Strings that look like a
//! date but name no real day (`31.02.2024`) are skipped, and the search goes
//! on with the next candidate.

use crate::config::ExpiryTime;
use crate::crawler::Document;
use crate::extract::rules::DateRule;
use crate::extract::text::{element_text, fold};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// `d.m.yyyy` or `d.m.yy`, allowed right after a word ("bis31.12.2024") but
/// never inside a longer number
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d.])(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})\b").expect("valid date regex")
});

static ANY_ELEMENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body *").expect("valid universal selector"));

/// Ancestor levels searched above an element that mentions a keyword
///
/// Covers `<dt>Einsendeschluss</dt><dd>31.12.2024</dd>` and
/// `<li><strong>Einsendeschluss:</strong> <span>31.12.2024</span></li>`.
const KEYWORD_ANCESTOR_LEVELS: usize = 2;

/// Parses one day/month/year triple
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use gewinn_crawler::extract::parse_date;
///
/// assert_eq!(parse_date("5", "1", "25"), NaiveDate::from_ymd_opt(2025, 1, 5));
/// assert_eq!(parse_date("31", "02", "2024"), None);
/// ```
pub fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;

    if year < 100 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// First valid date in a piece of text
pub fn first_date_in(text: &str) -> Option<NaiveDate> {
    DATE_PATTERN
        .captures_iter(text)
        .find_map(|caps| parse_date(&caps[1], &caps[2], &caps[3]))
}

/// Applies a profile's truncation policy to a date
pub fn to_expiry(date: NaiveDate, policy: ExpiryTime) -> NaiveDateTime {
    let (hour, minute, second) = match policy {
        ExpiryTime::StartOfDay => (0, 0, 0),
        ExpiryTime::EndOfDay => (23, 59, 59),
    };
    date.and_time(NaiveTime::from_hms_opt(hour, minute, second).unwrap_or_default())
}

/// Runs the date rules in order and returns the first deadline found
///
/// A keyword rule placed before a document rule is authoritative: the
/// document-wide scan only runs when no keyword-scoped date was found.
pub fn find_expiry(
    document: &Document,
    rules: &[DateRule],
    policy: ExpiryTime,
) -> Option<NaiveDateTime> {
    rules
        .iter()
        .find_map(|rule| {
            let found = match rule {
                DateRule::Keyword { keywords } => date_near_keywords(document, keywords),
                DateRule::Selector { selector, .. } => document
                    .html()
                    .select(selector)
                    .find_map(|element| first_date_in(&element_text(&element))),
                DateRule::Document => first_date_in(&element_text(&document.root())),
            };
            if let Some(date) = found {
                tracing::trace!("Date rule {:?} found {}", rule_name(rule), date);
            }
            found
        })
        .map(|date| to_expiry(date, policy))
}

fn rule_name(rule: &DateRule) -> &str {
    match rule {
        DateRule::Keyword { .. } => "keyword",
        DateRule::Selector { source, .. } => source,
        DateRule::Document => "document",
    }
}

/// Searches around the innermost elements that mention a keyword
///
/// For each such element, in document order, the text after the keyword is
/// searched first, then the whole element, then up to
/// [`KEYWORD_ANCESTOR_LEVELS`] enclosing elements below `<body>`.
fn date_near_keywords(document: &Document, keywords: &[String]) -> Option<NaiveDate> {
    if keywords.is_empty() {
        return None;
    }

    document
        .html()
        .select(&ANY_ELEMENT)
        .filter(|element| is_innermost_mention(element, keywords))
        .find_map(|element| {
            let scopes = std::iter::once(element).chain(
                element
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .take_while(|el| !matches!(el.value().name(), "body" | "html"))
                    .take(KEYWORD_ANCESTOR_LEVELS),
            );

            scopes
                .map(|scope| fold(&element_text(&scope)))
                .find_map(|text| date_after_keyword(&text, keywords))
        })
}

/// True if the element mentions a keyword and none of its child elements does
fn is_innermost_mention(element: &ElementRef<'_>, keywords: &[String]) -> bool {
    let mentions = |el: &ElementRef<'_>| {
        let text = fold(&element_text(el));
        keywords.iter().any(|k| text.contains(k.as_str()))
    };

    mentions(element) && !element.children().filter_map(ElementRef::wrap).any(|c| mentions(&c))
}

/// Date following the first keyword occurrence, else any date in the text
fn date_after_keyword(folded: &str, keywords: &[String]) -> Option<NaiveDate> {
    let after = keywords
        .iter()
        .filter_map(|k| folded.find(k.as_str()))
        .min()
        .and_then(|pos| first_date_in(&folded[pos..]));

    after.or_else(|| first_date_in(folded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateRuleConfig;

    fn doc(body: &str) -> Document {
        Document::parse(
            "https://site.test/gewinnspiel/x",
            &format!("<html><body>{}</body></html>", body),
        )
        .unwrap()
    }

    fn keyword_then_document() -> Vec<DateRule> {
        vec![
            DateRule::compile(&DateRuleConfig::Keyword {
                keywords: vec!["einsendeschluss".to_string(), "einsendeschluß".to_string()],
            })
            .unwrap(),
            DateRule::Document,
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("1", "2", "2030"), Some(date(2030, 2, 1)));
        assert_eq!(parse_date("01", "02", "30"), Some(date(2030, 2, 1)));
        assert_eq!(parse_date("31", "12", "99"), Some(date(2099, 12, 31)));
        assert_eq!(parse_date("32", "1", "2030"), None);
        assert_eq!(parse_date("29", "2", "2023"), None);
    }

    #[test]
    fn test_first_date_in_skips_invalid() {
        assert_eq!(
            first_date_in("vom 31.02.2024 bis 15.3.2024"),
            Some(date(2024, 3, 15))
        );
    }

    #[test]
    fn test_first_date_in_respects_boundaries() {
        assert_eq!(first_date_in("Version 123.4.2024"), None);
        assert_eq!(first_date_in("1.2.20245"), None);
        assert_eq!(first_date_in("Ende: 7.8.25."), Some(date(2025, 8, 7)));
    }

    #[test]
    fn test_first_date_in_accepts_date_glued_to_word() {
        assert_eq!(first_date_in("teilnahme bis31.12.2024"), Some(date(2024, 12, 31)));
        assert_eq!(first_date_in("31.12.2024"), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_keyword_scoped_date_wins_over_earlier_date() {
        let d = doc(
            r#"<p>Veröffentlicht am 01.01.2024</p>
               <div class="info"><span>Einsendeschluss: 15.06.2024</span></div>"#,
        );
        let found = find_expiry(&d, &keyword_then_document(), ExpiryTime::StartOfDay);
        assert_eq!(found, Some(date(2024, 6, 15).and_time(NaiveTime::default())));
    }

    #[test]
    fn test_keyword_with_sharp_s_and_sibling_value() {
        let d = doc(
            r#"<p>Stand 02.02.2024</p>
               <dl><dt>EINSENDESCHLUß</dt><dd>30.9.24</dd></dl>"#,
        );
        let found = find_expiry(&d, &keyword_then_document(), ExpiryTime::StartOfDay);
        assert_eq!(found.map(|dt| dt.date()), Some(date(2024, 9, 30)));
    }

    #[test]
    fn test_document_fallback_without_keyword() {
        let d = doc(r#"<div><h1>Gewinne ein Auto</h1><p>Teilnahme bis 05.11.2031 möglich.</p></div>"#);
        let found = find_expiry(&d, &keyword_then_document(), ExpiryTime::StartOfDay);
        assert_eq!(found.map(|dt| dt.date()), Some(date(2031, 11, 5)));
    }

    #[test]
    fn test_keyword_without_date_falls_back() {
        let d = doc(r#"<p>Einsendeschluss: bald</p><footer>© 1.1.2020</footer>"#);
        let found = find_expiry(&d, &keyword_then_document(), ExpiryTime::StartOfDay);
        assert_eq!(found.map(|dt| dt.date()), Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_no_date_anywhere() {
        let d = doc("<p>Einsendeschluss: demnächst</p>");
        assert_eq!(
            find_expiry(&d, &keyword_then_document(), ExpiryTime::StartOfDay),
            None
        );
    }

    #[test]
    fn test_selector_rule() {
        let rules = vec![DateRule::compile(&DateRuleConfig::Selector {
            selector: ".deadline".to_string(),
        })
        .unwrap()];
        let d = doc(r#"<p>1.1.2024</p><span class="deadline">bis 3.4.2025</span>"#);
        assert_eq!(
            find_expiry(&d, &rules, ExpiryTime::StartOfDay).map(|dt| dt.date()),
            Some(date(2025, 4, 3))
        );
    }

    #[test]
    fn test_truncation_policies() {
        let day = date(2024, 6, 1);
        assert_eq!(
            to_expiry(day, ExpiryTime::StartOfDay).to_string(),
            "2024-06-01 00:00:00"
        );
        assert_eq!(
            to_expiry(day, ExpiryTime::EndOfDay).to_string(),
            "2024-06-01 23:59:59"
        );
    }
}
