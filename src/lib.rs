//! Gewinn-Crawler: a sweepstakes listing harvester
//!
//! This crate walks the listing pages of configured contest portals, follows
//! their pagination to every detail page, extracts each posting's deadline and
//! participation link, resolves that link to its external destination and
//! reconciles the result into a SQLite store.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod reconcile;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Failures of a single fetch or redirect resolution
///
/// None of these abort a run: the controller logs them and truncates only the
/// chain or detail item the request belonged to.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned a body without any markup")]
    Parse { url: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use reconcile::{reconcile, PostingStatus, ReconcileOutcome};
pub use crate::url::{canonicalize, resolve};
