//! HTTP access to the vacancies API
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Building listing and detail URLs
//! - Pacing requests and capping how many are in flight
//! - Error classification (transport, status, decode, empty listing)
//!
//! Failed requests are never retried here; callers log and skip them.

use crate::config::ApiConfig;
use crate::crawler::parser::{parse_detail, parse_listing};
use crate::crawler::scheduler::RequestPacer;
use crate::crawler::types::{ListingQuery, ListingResult, PostingDetail};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// Why a single listing or detail request produced nothing
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Failed to fetch data: {url}, status code: {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON response: {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("No vacancies found for URL: {url}")]
    EmptyListing { url: String, total_found: u64 },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Builds an HTTP client with proper configuration
///
/// The API turns away requests without a browser-like user agent, so the
/// configured one is sent on every request.
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the listing and detail endpoints
///
/// Cheap to clone; clones share the connection pool, the pacer and the
/// in-flight limit.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    per_page: u32,
    pacer: Arc<RequestPacer>,
    in_flight: Arc<Semaphore>,
}

impl ApiClient {
    /// Creates a client for the API described by `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, user agent, pacing and timeout settings
    /// * `per_page` - Postings requested per listing page
    pub fn new(config: &ApiConfig, per_page: u32) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url,
            per_page,
            pacer: Arc::new(RequestPacer::new(Duration::from_millis(
                config.minimum_request_delay,
            ))),
            in_flight: Arc::new(Semaphore::new(config.max_concurrent_requests as usize)),
        })
    }

    /// `{base}/vacancies?area=&per_page=&page=&date_from=&date_to=`
    pub fn listing_url(&self, query: &ListingQuery) -> Result<Url, url::ParseError> {
        let mut url = self.endpoint(&["vacancies"])?;
        url.query_pairs_mut()
            .append_pair("area", &query.region.to_string())
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &query.page.to_string())
            .append_pair("date_from", &query.window.from().to_string())
            .append_pair("date_to", &query.window.to().to_string());
        Ok(url)
    }

    /// `{base}/vacancies/{posting_id}`
    pub fn detail_url(&self, posting_id: &str) -> Result<Url, url::ParseError> {
        self.endpoint(&["vacancies", posting_id])
    }

    /// Fetches one listing page
    ///
    /// A page without postings is reported as [`FetchError::EmptyListing`],
    /// which still carries the reported match count.
    pub async fn fetch_listing(&self, query: &ListingQuery) -> Result<ListingResult, FetchError> {
        let url = self.listing_url(query)?;
        let body = self.get_body(&url).await?;

        let listing = parse_listing(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        if listing.posting_ids.is_empty() && listing.skipped_entries == 0 {
            return Err(FetchError::EmptyListing {
                url: url.to_string(),
                total_found: listing.total_found,
            });
        }

        Ok(listing)
    }

    /// Fetches and normalizes one posting
    pub async fn fetch_detail(&self, posting_id: &str) -> Result<PostingDetail, FetchError> {
        let url = self.detail_url(posting_id)?;
        let body = self.get_body(&url).await?;

        parse_detail(posting_id, &body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a paced GET and returns the body of a 200 response
    async fn get_body(&self, url: &Url) -> Result<String, FetchError> {
        // The semaphore is never closed, so a permit is always granted
        let _permit = self.in_flight.acquire().await.ok();
        self.pacer.wait_turn(url.host_str().unwrap_or_default()).await;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
