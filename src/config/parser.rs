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
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scrapeddit::config::load_config;
///
/// let config = load_config(Path::new("scrapeddit.toml")).unwrap();
/// println!("Workers: {}", config.scrape.max_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Each run records this hash so stored data can be traced back to the
/// settings it was scraped with.
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[api]
base-url = "https://www.reddit.com"
user-agent = "scrapeddit/0.1 (by u/tester)"
timeout-secs = 10

[database]
path = "./test.db"

[scrape]
max-workers = 8
listing-limit = 25
author-limit = 3
crawl-depth = 2
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.database.path, "./test.db");
        assert_eq!(config.scrape.max_workers, 8);
        assert_eq!(config.scrape.listing_limit, 25);
        assert_eq!(config.scrape.author_limit, 3);
        assert_eq!(config.scrape.crawl_depth, 2);
        // unspecified keys fall back to defaults
        assert_eq!(config.scrape.author_comment_limit, 100);
        assert_eq!(config.scrape.more_threshold, 0);
    }

    #[test]
    fn test_scrape_section_is_optional() {
        let config = parse_config(
            r#"
[api]
user-agent = "scrapeddit/0.1"

[database]
path = "./test.db"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://www.reddit.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.scrape.max_workers, 5);
        assert_eq!(config.scrape.listing_limit, 10);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/scrapeddit.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[api]
user-agent = "scrapeddit/0.1"

[database]
path = "./test.db"

[scrape]
max-workers = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
