use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
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
/// use hh_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Split threshold: {}", config.crawler.split_threshold);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Hex SHA-256 of the configuration file as it sits on disk
///
/// Logged at startup and stored on every SQLite run row, so a run's output
/// can be matched to the settings that produced it.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(run_hash(&content))
}

/// Loads a configuration together with the run hash of the same bytes
///
/// The file is read once, so the hash always describes the settings that
/// were actually parsed.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, run_hash(&content)))
}

fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn run_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, DEFAULT_REGIONS};
    use crate::ConfigError;
    use chrono::NaiveDate;
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
[crawler]
regions = [35, 1125]
earliest-year = 2010
split-threshold = 1500
anchor-date = "2024-01-08"
detail-workers = 2

[api]
base-url = "https://api.hh.ru"
minimum-request-delay = 500

[output]
format = "sqlite"
path = "./vacancies.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.regions, vec![35, 1125]);
        assert_eq!(config.crawler.earliest_year, 2010);
        assert_eq!(config.crawler.split_threshold, 1500);
        assert_eq!(
            config.crawler.anchor_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
        );
        assert_eq!(config.crawler.detail_workers, 2);
        // Unset keys keep their defaults
        assert_eq!(config.crawler.max_pages, 20);
        assert_eq!(config.crawler.per_page, 100);
        assert_eq!(config.api.minimum_request_delay, 500);
        assert_eq!(config.output.format, OutputFormat::Sqlite);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.regions, DEFAULT_REGIONS.to_vec());
        assert_eq!(config.crawler.earliest_year, 2005);
        assert_eq!(config.crawler.window_days, 7);
        assert_eq!(config.crawler.split_threshold, 2000);
        assert_eq!(config.api.base_url, "https://api.hh.ru");
        assert_eq!(config.output.format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_unknown_format() {
        let file = create_temp_config("[output]\nformat = \"parquet\"\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
per-page = 500
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
    fn test_load_with_hash_matches_file_hash() {
        let file = create_temp_config("[crawler]\nregions = [35]\n");

        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawler.regions, vec![35]);
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
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
