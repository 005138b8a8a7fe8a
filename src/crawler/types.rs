use crate::window::DateWindow;
use crate::RegionId;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One listing request: a page of a region's postings within a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingQuery {
    pub region: RegionId,
    pub window: DateWindow,
    pub page: u32,
}

/// What one listing page reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingResult {
    /// Matches for the whole query, as reported by the API
    pub total_found: u64,

    /// Posting ids on this page, in API order
    pub posting_ids: Vec<String>,

    /// Entries dropped because they carried no usable id
    pub skipped_entries: usize,
}

/// A posting id waiting for its detail fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDetail {
    pub region: RegionId,
    pub posting_id: String,
}

/// Salary range as published on a posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub from: Option<Number>,
    pub to: Option<Number>,
    pub currency: Option<String>,
    pub gross: Option<bool>,
}

/// Normalized detail record of a single posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingDetail {
    pub id: String,
    pub name: Option<String>,
    pub salary: Option<Salary>,
    pub published_at: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub employment: Option<String>,
    pub schedule: Option<String>,
    pub key_skills: Vec<String>,
    pub city: Option<String>,
    pub employer: Option<String>,
}
