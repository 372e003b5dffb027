//! Compiled site profiles
//!
//! A [`SiteProfile`] is the immutable, ready-to-run form of a `[[site]]`
//! configuration section: selectors parsed, regexes compiled, match texts
//! folded. Adding a site means adding a profile, never a code path.

use crate::config::{DateRuleConfig, ExpiryTime, LinkRuleConfig, SiteConfig};
use crate::extract::text::fold;
use crate::url::url_on_host;
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// A link-bearing element query
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// Selector as written in the configuration
    pub source: String,

    /// Parsed selector
    pub selector: Selector,

    /// Folded link-text needles; empty accepts any text
    pub text: Vec<String>,
}

impl LinkRule {
    /// Compiles a configured link rule
    pub fn compile(config: &LinkRuleConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source: config.selector.clone(),
            selector: parse_selector(&config.selector)?,
            text: fold_all(&config.text),
        })
    }
}

/// A deadline query
#[derive(Debug, Clone)]
pub enum DateRule {
    /// Innermost elements whose text mentions one of the folded keywords
    Keyword { keywords: Vec<String> },
    /// Text of elements matching a selector
    Selector { source: String, selector: Selector },
    /// The whole rendered document text
    Document,
}

impl DateRule {
    /// Compiles a configured date rule
    pub fn compile(config: &DateRuleConfig) -> Result<Self, ConfigError> {
        Ok(match config {
            DateRuleConfig::Keyword { keywords } => {
                let mut folded = fold_all(keywords);
                folded.dedup();
                DateRule::Keyword { keywords: folded }
            }
            DateRuleConfig::Selector { selector } => DateRule::Selector {
                source: selector.clone(),
                selector: parse_selector(selector)?,
            },
            DateRuleConfig::Document => DateRule::Document,
        })
    }
}

/// Everything that distinguishes one target site from another
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pub host: String,
    pub entry_points: Vec<String>,
    pub listing_pattern: Option<Regex>,
    pub expiry_time: ExpiryTime,
    pub max_discovery_depth: Option<u32>,
    pub entry_links: Vec<LinkRule>,
    pub detail_links: Vec<LinkRule>,
    pub next_page: Vec<LinkRule>,
    pub dates: Vec<DateRule>,
    pub action_links: Vec<LinkRule>,
}

impl SiteProfile {
    /// Compiles a site section
    ///
    /// # Returns
    ///
    /// * `Ok(SiteProfile)` - All selectors and patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - A selector or regex is malformed
    pub fn compile(site: &SiteConfig) -> Result<Self, ConfigError> {
        let listing_pattern = site
            .listing_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::InvalidPattern(format!(
                        "site '{}': listing-pattern '{}': {}",
                        site.name, pattern, e
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            name: site.name.clone(),
            host: site.host.clone(),
            entry_points: site.entry_points.iter().map(|u| u.trim().to_string()).collect(),
            listing_pattern,
            expiry_time: site.expiry_time,
            max_discovery_depth: site.max_discovery_depth,
            entry_links: compile_links(&site.entry_links)?,
            detail_links: compile_links(&site.detail_links)?,
            next_page: compile_links(&site.next_page)?,
            dates: site
                .dates
                .iter()
                .map(DateRule::compile)
                .collect::<Result<_, _>>()?,
            action_links: compile_links(&site.action_links)?,
        })
    }

    /// Returns true if the URL is on this site's host
    pub fn is_own_host(&self, url: &str) -> bool {
        url_on_host(&self.host, url)
    }

    /// Listing predicate: is this URL a crawlable listing page of the site?
    ///
    /// Same-host URLs are listings when the profile has no listing pattern or
    /// when the pattern matches the path plus query. Pass the URL as resolved:
    /// a canonical URL has lost the trailing slash a pattern may rely on.
    pub fn is_listing(&self, url: &str) -> bool {
        if !self.is_own_host(url) {
            return false;
        }

        let Some(pattern) = &self.listing_pattern else {
            return true;
        };

        match Url::parse(url) {
            Ok(parsed) => {
                let target = match parsed.query() {
                    Some(query) => format!("{}?{}", parsed.path(), query),
                    None => parsed.path().to_string(),
                };
                pattern.is_match(&target)
            }
            Err(_) => false,
        }
    }
}

fn compile_links(rules: &[LinkRuleConfig]) -> Result<Vec<LinkRule>, ConfigError> {
    rules.iter().map(LinkRule::compile).collect()
}

fn parse_selector(source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source)
        .map_err(|e| ConfigError::InvalidPattern(format!("selector '{}': {:?}", source, e)))
}

fn fold_all(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .map(|t| fold(t))
        .filter(|t| !t.is_empty())
        .collect()
}
