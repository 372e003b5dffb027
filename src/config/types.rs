use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of listing chains crawled at the same time
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Minimum pause after every request before the same worker continues (milliseconds)
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total request timeout including body download (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

fn default_workers() -> u32 {
    2
}

fn default_request_delay_ms() -> u64 {
    250
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    45
}

fn default_max_redirects() -> u32 {
    10
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_delay_ms: default_request_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value sent with every request
    ///
    /// Format: `Mozilla/5.0 (compatible; Name/Version; +ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "Mozilla/5.0 (compatible; {}/{}; +{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// How a parsed deadline date is turned into a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryTime {
    /// 00:00:00 on the deadline day
    #[default]
    StartOfDay,
    /// 23:59:59 on the deadline day
    EndOfDay,
}

/// One target site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Short identifier used in logs and for `--site`
    pub name: String,

    /// Host pattern (e.g., "12gewinn.de" or "*.12gewinn.de")
    pub host: String,

    /// Seed URLs fetched to discover listing pages
    pub entry_points: Vec<String>,

    /// Regex matched against path + query of a same-host URL to accept it as a
    /// listing page; absent means every same-host link found by the
    /// entry-link rules is a listing
    #[serde(default)]
    pub listing_pattern: Option<String>,

    /// Deadline truncation policy
    #[serde(default)]
    pub expiry_time: ExpiryTime,

    /// Maximum expansion depth below the entry points (unbounded if absent)
    #[serde(default)]
    pub max_discovery_depth: Option<u32>,

    /// Rules locating candidate listing links on entry pages
    #[serde(default)]
    pub entry_links: Vec<LinkRuleConfig>,

    /// Rules locating detail-page links on a listing page (all matches are used)
    pub detail_links: Vec<LinkRuleConfig>,

    /// Rules locating the "next page" link on a listing page
    #[serde(default)]
    pub next_page: Vec<LinkRuleConfig>,

    /// Rules locating the deadline on a detail page
    pub dates: Vec<DateRuleConfig>,

    /// Rules locating the participation link on a detail page
    pub action_links: Vec<LinkRuleConfig>,
}

/// A link-bearing element query
#[derive(Debug, Clone, Deserialize)]
pub struct LinkRuleConfig {
    /// CSS selector; a comma-separated list matches in document order
    #[serde(default = "default_link_selector")]
    pub selector: String,

    /// Accept only elements whose text contains one of these (case and
    /// diacritics are ignored)
    #[serde(default)]
    pub text: Vec<String>,
}

fn default_link_selector() -> String {
    "a".to_string()
}

/// A deadline query
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DateRuleConfig {
    /// Search near elements mentioning one of the keywords
    Keyword {
        #[serde(default = "default_deadline_keywords")]
        keywords: Vec<String>,
    },
    /// Search the text of elements matching a CSS selector
    Selector { selector: String },
    /// Take the first date anywhere in the rendered document text
    Document,
}

fn default_deadline_keywords() -> Vec<String> {
    vec!["einsendeschluss".to_string(), "einsendeschluß".to_string()]
}
