use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Each run records this hash, so a changed rule set can be told apart when
/// comparing run counters.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateRuleConfig, ExpiryTime};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
[crawler]
workers = 2
request-delay-ms = 250

[user-agent]
crawler-name = "GewinnCrawler"
crawler-version = "2.0"
contact-url = "https://example.org/crawler"

[output]
database-path = "./gewinne.db"

[[site]]
name = "12gewinn"
host = "*.12gewinn.de"
entry-points = ["https://www.12gewinn.de/"]
listing-pattern = "^/gewinnspiele/"

[[site.entry-links]]
selector = "nav a"

[[site.detail-links]]
selector = "a[href*='/gewinnspiel']:not([href*='#'])"

[[site.next-page]]
selector = "a[class*='next'], a[rel*='next']"

[[site.next-page]]
text = ["weiter"]

[[site.dates]]
kind = "keyword"

[[site.dates]]
kind = "document"

[[site.action-links]]
text = ["zum gewinnspiel"]

[[site]]
name = "supergewinne"
host = "*.supergewinne.de"
entry-points = ["https://www.supergewinne.de/"]
expiry-time = "end-of-day"

[[site.detail-links]]
text = ["mehr lesen"]

[[site.dates]]
kind = "document"

[[site.action-links]]
text = ["jetzt direkt mitmachen", "zum gewinnspiel"]
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 2);
        assert_eq!(config.crawler.max_redirects, 10);
        assert_eq!(config.crawler.connect_timeout_secs, 15);
        assert_eq!(config.sites.len(), 2);

        let first = &config.sites[0];
        assert_eq!(first.expiry_time, ExpiryTime::StartOfDay);
        assert_eq!(first.next_page.len(), 2);
        assert_eq!(first.next_page[1].selector, "a");
        match &first.dates[0] {
            DateRuleConfig::Keyword { keywords } => {
                assert!(keywords.contains(&"einsendeschluss".to_string()))
            }
            other => panic!("unexpected rule {:?}", other),
        }

        assert_eq!(config.sites[1].expiry_time, ExpiryTime::EndOfDay);
        assert!(config.sites[1].next_page.is_empty());
    }

    #[test]
    fn test_profiles_compile() {
        let config = parse_config(VALID_CONFIG).unwrap();
        let profiles = config.profiles().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].name, "supergewinne");
    }

    #[test]
    fn test_user_agent_header() {
        let config = parse_config(VALID_CONFIG).unwrap();
        assert_eq!(
            config.user_agent.header_value(),
            "Mozilla/5.0 (compatible; GewinnCrawler/2.0; +https://example.org/crawler)"
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/gewinne.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(matches!(
            load_config(file.path()).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let broken = VALID_CONFIG.replace("selector = \"nav a\"", "selector = \"nav[[\"");
        assert!(matches!(
            parse_config(&broken).unwrap_err(),
            ConfigError::InvalidPattern(_)
        ));
    }

    #[test]
    fn test_invalid_listing_pattern_rejected() {
        let broken = VALID_CONFIG.replace("^/gewinnspiele/", "^/(gewinnspiele");
        assert!(matches!(
            parse_config(&broken).unwrap_err(),
            ConfigError::InvalidPattern(_)
        ));
    }

    #[test]
    fn test_duplicate_site_name_rejected() {
        let broken = VALID_CONFIG.replace("name = \"supergewinne\"", "name = \"12gewinn\"");
        assert!(matches!(
            parse_config(&broken).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_ftp_entry_point_rejected() {
        let broken = VALID_CONFIG.replace(
            "https://www.supergewinne.de/\"]",
            "ftp://www.supergewinne.de/\"]",
        );
        assert!(matches!(
            parse_config(&broken).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config(VALID_CONFIG);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);

        let other = create_temp_config("content 2");
        assert_ne!(hash1, compute_config_hash(other.path()).unwrap());
    }

    #[test]
    fn test_shipped_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
        let config = load_config(&path).unwrap();
        let profiles = config.profiles().unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].expiry_time, ExpiryTime::EndOfDay);

        let supergewinne = &profiles[1];
        assert!(supergewinne
            .entry_points
            .contains(&"https://www.supergewinne.de/gewinnspiele/".to_string()));
        assert!(supergewinne.is_listing("https://www.supergewinne.de/gewinnspiele/"));
        assert!(supergewinne.is_listing("https://www.supergewinne.de/gewinnspiele"));
        assert!(supergewinne.is_listing("https://www.supergewinne.de/gewinnspiele/reisen/"));
        assert!(!supergewinne.is_listing("https://www.supergewinne.de/gewinnspiele-archiv/"));
    }
}
