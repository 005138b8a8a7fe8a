//! hh-harvest: a date-window crawler for the hh.ru vacancies API
//!
//! This crate walks the public job-listings API region by region, sliding a
//! date window backward through history and splitting it whenever a query
//! matches more postings than the API will page through. Every posting found
//! is fetched in full, normalized, and written to an output sink.

pub mod config;
pub mod crawler;
pub mod output;
pub mod window;

use thiserror::Error;

/// Main error type for hh-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

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
}

/// Identifier of a geographic region on the listings API
pub type RegionId = u32;

/// Result type alias for hh-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, PostingDetail};
pub use window::{DateWindow, Transition, WindowPartitioner};
