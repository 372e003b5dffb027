//! Parsed page handle
//!
//! html5ever recovers from any structural error, so parsing itself cannot
//! fail. What can fail is the body carrying no markup at all (an empty
//! response, a plain-text error message, a JSON blob); those are reported as
//! [`FetchError::Parse`] and handled exactly like a transport failure.

use crate::FetchError;
use scraper::{ElementRef, Html};

/// A queryable, best-effort parsed HTML document and the URL it came from
pub struct Document {
    url: String,
    html: Html,
}

impl Document {
    /// Parses a decoded response body
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The body contained at least one tag
    /// * `Err(FetchError::Parse)` - Nothing resembling markup was found
    pub fn parse(url: &str, body: &str) -> Result<Self, FetchError> {
        if !looks_like_markup(body) {
            return Err(FetchError::Parse {
                url: url.to_string(),
            });
        }

        Ok(Self {
            url: url.to_string(),
            html: Html::parse_document(body),
        })
    }

    /// URL the document was fetched from; relative links resolve against it
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The parsed tree
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The `<html>` element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

/// Returns true if the body contains something that opens a tag
fn looks_like_markup(body: &str) -> bool {
    body.as_bytes()
        .windows(2)
        .any(|pair| pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || pair[1] == b'!'))
}
