//! Configuration module
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! that names the target sites and their extraction rules.
//!
//! # Example
//!
//! ```no_run
//! use gewinn_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gewinne.toml")).unwrap();
//! println!("Crawling {} sites", config.sites.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, DateRuleConfig, ExpiryTime, LinkRuleConfig, OutputConfig, SiteConfig,
    UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::extract::SiteProfile;
use crate::ConfigError;

impl Config {
    /// Compiles every site section into an immutable profile
    pub fn profiles(&self) -> Result<Vec<SiteProfile>, ConfigError> {
        self.sites.iter().map(SiteProfile::compile).collect()
    }

    /// Compiles the named sites, or all sites when `names` is empty
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SiteProfile>)` - Profiles in configuration order
    /// * `Err(ConfigError::Validation)` - A name matches no `[[site]]` section
    pub fn select_profiles(&self, names: &[String]) -> Result<Vec<SiteProfile>, ConfigError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.sites.iter().any(|site| &site.name == *name))
        {
            return Err(ConfigError::Validation(format!(
                "unknown site '{}'",
                unknown
            )));
        }

        self.sites
            .iter()
            .filter(|site| names.is_empty() || names.contains(&site.name))
            .map(SiteProfile::compile)
            .collect()
    }
}
