//! Output module for emitted postings and crawl statistics
//!
//! This module handles:
//! - Writing normalized postings to JSON lines or SQLite
//! - Collecting postings in memory (embedding, tests)
//! - Counting and printing crawl statistics

mod jsonl;
mod memory;
mod sqlite_output;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use memory::MemorySink;
pub use sqlite_output::SqliteSink;
pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;
use std::sync::Arc;

/// Opens the sink selected by the output configuration
///
/// # Arguments
///
/// * `config` - Output format and path
/// * `config_hash` - Hash of the configuration file, stored with SQLite runs
pub fn open_sink(config: &OutputConfig, config_hash: &str) -> OutputResult<Arc<dyn RecordSink>> {
    let path = Path::new(&config.path);

    let sink: Arc<dyn RecordSink> = match config.format {
        OutputFormat::Jsonl => Arc::new(JsonLinesSink::create(path)?),
        OutputFormat::Sqlite => Arc::new(SqliteSink::open(path, config_hash)?),
    };

    tracing::info!("Writing {:?} output to {}", config.format, path.display());
    Ok(sink)
}
