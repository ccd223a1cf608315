use crate::config::types::{ApiConfig, Config, DatabaseConfig, ScrapeConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool; the API throttles per client well before this
const MAX_WORKERS_LIMIT: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_database_config(&config.database)?;
    validate_scrape_config(&config.scrape)?;
    Ok(())
}

/// Validates remote API settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates database settings
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scrape defaults
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    validate_max_workers(config.max_workers)?;

    if config.listing_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "listing-limit must be >= 1, got {}",
            config.listing_limit
        )));
    }

    if config.author_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "author-limit must be >= 1, got {}",
            config.author_limit
        )));
    }

    Ok(())
}

/// Validates a worker pool width, also used for CLI overrides
pub fn validate_max_workers(max_workers: usize) -> Result<(), ConfigError> {
    if max_workers < 1 || max_workers > MAX_WORKERS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and {}, got {}",
            MAX_WORKERS_LIMIT, max_workers
        )));
    }
    Ok(())
}
