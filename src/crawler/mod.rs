//! Crawler module for listing traversal and detail fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP access to the listing and detail endpoints
//! - Listing and detail payload decoding
//! - Request pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod types;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, ApiClient, FetchError};
pub use parser::{extract_posting_id, parse_detail, parse_listing, MissingPostingId};
pub use scheduler::RequestPacer;
pub use types::{ListingQuery, ListingResult, PendingDetail, PostingDetail, Salary};

use crate::config::Config;
use crate::output::{CrawlStatistics, RecordSink};
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and the window partitioner
/// 2. Traverse every configured region concurrently
/// 3. Fetch the details of every posting found
/// 4. Write each normalized posting to `sink`
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sink` - Destination for emitted postings
/// * `shutdown` - Set to `true` to stop issuing new requests
///
/// # Example
///
/// ```no_run
/// use hh_harvest::config::load_config;
/// use hh_harvest::crawler::crawl;
/// use hh_harvest::output::MemorySink;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let (_stop, shutdown) = tokio::sync::watch::channel(false);
/// let stats = crawl(config, Arc::new(MemorySink::new()), shutdown).await?;
/// println!("{} records", stats.details_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    sink: Arc<dyn RecordSink>,
    shutdown: watch::Receiver<bool>,
) -> Result<CrawlStatistics, HarvestError> {
    Coordinator::new(config, sink)?.run(shutdown).await
}
