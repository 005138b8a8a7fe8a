//! Output sink trait and error types
//!
//! This module defines the interface every record destination implements.

use crate::crawler::PostingDetail;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for normalized postings
///
/// Detail workers call [`write_record`](RecordSink::write_record) concurrently
/// and in no particular order; each record stands on its own, so
/// implementations only need to serialize access to their backing store.
pub trait RecordSink: Send + Sync {
    /// Writes one posting
    fn write_record(&self, record: &PostingDetail) -> OutputResult<()>;

    /// Makes everything written so far durable
    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
