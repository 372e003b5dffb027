use crate::config::types::{Config, CrawlerConfig, DateRuleConfig, SiteConfig, UserAgentConfig};
use crate::extract::SiteProfile;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 16 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 16, got {}",
            config.workers
        )));
    }

    if config.request_delay_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "request_delay_ms must be >= 50ms, got {}ms",
            config.request_delay_ms
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > 15 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and 15, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 45 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 45, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_redirects > 10 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 10, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates every site section and makes sure it compiles into a profile
fn validate_sites(sites: &[SiteConfig]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] section is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for site in sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name cannot be empty".to_string(),
            ));
        }

        if !names.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }

        validate_host_pattern(&site.host)?;
        validate_entry_points(site)?;
        validate_rule_lists(site)?;

        // Selectors and regexes are only checked by compiling them
        SiteProfile::compile(site)?;
    }

    Ok(())
}

fn validate_entry_points(site: &SiteConfig) -> Result<(), ConfigError> {
    if site.entry_points.is_empty() {
        return Err(ConfigError::Validation(format!(
            "site '{}' must have at least one entry point",
            site.name
        )));
    }

    for entry in &site.entry_points {
        let url = Url::parse(entry).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid entry point '{}': {}", entry, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Entry point '{}' must use HTTP or HTTPS",
                entry
            )));
        }
    }

    Ok(())
}

fn validate_rule_lists(site: &SiteConfig) -> Result<(), ConfigError> {
    let required = [
        ("detail-links", site.detail_links.is_empty()),
        ("dates", site.dates.is_empty()),
        ("action-links", site.action_links.is_empty()),
    ];

    for (purpose, empty) in required {
        if empty {
            return Err(ConfigError::Validation(format!(
                "site '{}' needs at least one {} rule",
                site.name, purpose
            )));
        }
    }

    for rule in &site.dates {
        if let DateRuleConfig::Keyword { keywords } = rule {
            if keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "site '{}' has a keyword date rule without keywords",
                    site.name
                )));
            }
        }
    }

    Ok(())
}

/// Validates a host pattern (supports wildcards)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.')
        || host.ends_with('.')
        || host.starts_with('-')
        || host.ends_with('-')
        || host.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' is malformed",
            host
        )));
    }

    if !host.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' must contain at least one dot (e.g., '12gewinn.de')",
            host
        )));
    }

    Ok(())
}
