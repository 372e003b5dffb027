//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with timeouts, redirect bound and user agent
//! - GET requests returning a decoded page body
//! - HEAD requests resolving where a link finally lands after redirects
//! - Error classification into [`FetchError`]
//! - The per-worker pause after every request

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::document::Document;
use crate::FetchError;
use async_trait::async_trait;
use encoding_rs::WINDOWS_1252;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// A fetched page body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub final_url: String,

    /// Body decoded to UTF-8
    pub body: String,
}

/// Network access used by the crawl controller
///
/// Both operations make exactly one attempt. The controller logs failures
/// and never retries within the same traversal step.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads a page body
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Follows redirects from `url` without downloading a body and returns
    /// the URL the chain ends at
    async fn resolve_redirect_target(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches a URL and parses it into a queryable document
///
/// The returned [`Document`] is not `Send`; callers drop it before their
/// next `.await`.
pub async fn fetch_document<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<Document, FetchError> {
    let page = fetcher.fetch(url).await?;
    Document::parse(&page.final_url, &page.body)
}

/// Builds an HTTP client with the crawler's transport policy
///
/// # Arguments
///
/// * `crawler` - Timeouts and redirect bound
/// * `user_agent` - Identification sent with every request
///
/// # Example
///
/// ```no_run
/// use gewinn_crawler::config::{CrawlerConfig, UserAgentConfig};
/// use gewinn_crawler::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "GewinnCrawler".to_string(),
///     crawler_version: "2.0".to_string(),
///     contact_url: "https://example.org/crawler".to_string(),
/// };
///
/// let client = build_http_client(&CrawlerConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(crawler.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
///
/// Every request is followed by a fixed pause in the calling task, so each
/// worker issues at most one request per `request_delay_ms`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(crawler, user_agent)?,
            delay: Duration::from_millis(crawler.request_delay_ms),
        })
    }

    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }

    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage {
            final_url,
            body: decode_body(&bytes),
        })
    }

    async fn head(&self, url: &str) -> Result<String, FetchError> {
        // The final status does not matter: a 405 on the destination still
        // tells us where the redirect chain ended
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        Ok(response.url().to_string())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let result = self.get(url).await;
        self.pause().await;
        result
    }

    async fn resolve_redirect_target(&self, url: &str) -> Result<String, FetchError> {
        let result = self.head(url).await;
        self.pause().await;
        result
    }
}

/// Maps a reqwest error onto the transport failure taxonomy
fn classify(url: &str, error: reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Decodes a response body
///
/// Target sites are inconsistent about their declared charset, so the bytes
/// are taken as UTF-8 when they are valid UTF-8 and as Windows-1252 (the
/// Latin-1 superset browsers use for ISO-8859-1) otherwise.
pub fn decode_body(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}
