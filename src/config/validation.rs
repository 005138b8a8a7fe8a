use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_api_config(&config.api)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl traversal settings
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_regions(&config.regions)?;

    if !(1970..=9999).contains(&config.earliest_year) {
        return Err(ConfigError::Validation(format!(
            "earliest_year must be between 1970 and 9999, got {}",
            config.earliest_year
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    // The API rejects larger pages
    if config.per_page < 1 || config.per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "per_page must be between 1 and 100, got {}",
            config.per_page
        )));
    }

    if config.split_threshold < 1 {
        return Err(ConfigError::Validation(
            "split_threshold must be >= 1".to_string(),
        ));
    }

    if config.window_days < 1 {
        return Err(ConfigError::Validation(
            "window_days must be >= 1".to_string(),
        ));
    }

    for (name, value) in [
        ("max_concurrent_regions", config.max_concurrent_regions),
        ("detail_workers", config.detail_workers),
        ("queue_capacity", config.queue_capacity),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates the region list: non-empty, no duplicates
fn validate_regions(regions: &[u32]) -> ConfigResult<()> {
    if regions.is_empty() {
        return Err(ConfigError::Validation(
            "regions cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(regions.len());
    for region in regions {
        if !seen.insert(region) {
            return Err(ConfigError::Validation(format!(
                "region {} is listed more than once",
                region
            )));
        }
    }

    Ok(())
}

/// Validates upstream API settings
fn validate_api_config(config: &ApiConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' cannot be used as a base",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_requests < 1 {
        return Err(ConfigError::Validation(
            "max_concurrent_requests must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
