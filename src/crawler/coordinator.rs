//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - One traversal task per region, walking date windows backward
//! - Paging through each window's listing results
//! - Feeding posting ids to a pool of detail workers through a bounded queue
//! - Writing normalized postings to the output sink
//! - Stopping new work when shutdown is requested

use crate::config::Config;
use crate::crawler::fetcher::{ApiClient, FetchError};
use crate::crawler::types::{ListingQuery, ListingResult, PendingDetail, PostingDetail};
use crate::output::{CrawlStatistics, CrawlStats, RecordSink};
use crate::window::{DateWindow, Transition, WindowPartitioner};
use crate::RegionId;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::JoinSet;

type DetailQueue = Arc<Mutex<mpsc::Receiver<PendingDetail>>>;

/// Main crawler coordinator structure
///
/// Cloning is cheap; every spawned task holds its own clone.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    client: ApiClient,
    partitioner: WindowPartitioner,
    sink: Arc<dyn RecordSink>,
    stats: Arc<CrawlStats>,
    today: NaiveDate,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The first window of every region ends on `crawler.anchor_date`, or on
    /// today's local date when that is unset.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Destination for emitted postings
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config, sink: Arc<dyn RecordSink>) -> crate::Result<Self> {
        let client = ApiClient::new(&config.api, config.crawler.per_page)?;
        let partitioner = WindowPartitioner::from_config(&config.crawler);
        let today = config
            .crawler
            .anchor_date
            .unwrap_or_else(|| Local::now().date_naive());

        Ok(Self {
            config: Arc::new(config),
            client,
            partitioner,
            sink,
            stats: Arc::new(CrawlStats::new()),
            today,
        })
    }

    pub fn stats(&self) -> CrawlStatistics {
        self.stats.snapshot()
    }

    /// Runs the crawl over every configured region
    ///
    /// Returns once every region has stopped and the detail queue is empty.
    /// Per-request failures are logged and counted, never returned; the only
    /// error is a failure to flush the sink at the end.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> crate::Result<CrawlStatistics> {
        let crawler = &self.config.crawler;
        tracing::info!(
            "Starting crawl of {} regions, windows ending {}",
            crawler.regions.len(),
            self.today
        );
        let start_time = std::time::Instant::now();

        let (queue_tx, queue_rx) = mpsc::channel(crawler.queue_capacity as usize);
        let queue: DetailQueue = Arc::new(Mutex::new(queue_rx));

        let mut workers = JoinSet::new();
        for worker_id in 0..crawler.detail_workers {
            let this = self.clone();
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            workers.spawn(async move { this.detail_worker(worker_id, queue, shutdown).await });
        }

        let region_slots = Arc::new(Semaphore::new(crawler.max_concurrent_regions as usize));
        let mut regions = JoinSet::new();
        for &region in &crawler.regions {
            let this = self.clone();
            let queue_tx = queue_tx.clone();
            let slots = region_slots.clone();
            let shutdown = shutdown.clone();
            regions.spawn(async move {
                let _slot = slots.acquire_owned().await.ok();
                this.run_region(region, &queue_tx, &shutdown).await;
            });
        }

        // Workers exit once every region task has dropped its sender
        drop(queue_tx);

        while let Some(result) = regions.join_next().await {
            if let Err(e) = result {
                tracing::error!("Region task failed: {}", e);
            }
        }
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Detail worker failed: {}", e);
            }
        }

        self.sink.flush()?;

        let stats = self.stats.snapshot();
        if stats.postings_dropped > 0 {
            tracing::warn!(
                "Shutdown dropped {} queued postings",
                stats.postings_dropped
            );
        }
        tracing::info!(
            "Crawl completed: {} records from {} regions in {:?}",
            stats.details_emitted,
            stats.regions_completed,
            start_time.elapsed()
        );

        Ok(stats)
    }

    /// Walks one region's history window by window until the partitioner stops
    ///
    /// A region that ends any other way is counted apart from completed ones:
    /// interrupted when shutdown cut it short, abandoned when no listing page
    /// of a window succeeded and there is no count to pick the next window
    /// from. A window whose paging shutdown broke off takes no transition.
    pub async fn run_region(
        &self,
        region: RegionId,
        details: &mpsc::Sender<PendingDetail>,
        shutdown: &watch::Receiver<bool>,
    ) {
        let mut window = self.partitioner.initial(self.today);
        tracing::info!("Region {}: starting at window {}", region, window);

        loop {
            if *shutdown.borrow() {
                tracing::info!("Region {}: shutdown requested at window {}", region, window);
                self.stats.record_region_interrupted();
                return;
            }

            let total_found = self.query_window(region, &window, details, shutdown).await;

            if *shutdown.borrow() {
                tracing::info!("Region {}: shutdown requested during window {}", region, window);
                self.stats.record_region_interrupted();
                return;
            }

            let Some(total_found) = total_found else {
                tracing::warn!(
                    "Region {}: no listing page succeeded for window {}, stopping",
                    region,
                    window
                );
                self.stats.record_region_abandoned();
                return;
            };

            match self.partitioner.next(region, &window, total_found) {
                Transition::Split(next) => {
                    tracing::debug!(
                        "Region {}: {} found {} postings, splitting to {}",
                        region,
                        window,
                        total_found,
                        next
                    );
                    self.stats.record_split();
                    window = next;
                }
                Transition::Slide(next) => {
                    tracing::debug!(
                        "Region {}: {} found {} postings, sliding to {}",
                        region,
                        window,
                        total_found,
                        next
                    );
                    self.stats.record_slide();
                    window = next;
                }
                Transition::Stop(reason) => {
                    tracing::info!(
                        "Region {}: finished at window {} ({})",
                        region,
                        window,
                        reason
                    );
                    self.stats.record_region_completed();
                    return;
                }
            }
        }
    }

    /// Pages through one window and queues every posting found
    ///
    /// Returns the window's match count, read from the first page that
    /// reported one, or `None` if no page did. Paging stops after an empty
    /// page or once the reported count is covered; a failed page does not
    /// stop the pages after it.
    async fn query_window(
        &self,
        region: RegionId,
        window: &DateWindow,
        details: &mpsc::Sender<PendingDetail>,
        shutdown: &watch::Receiver<bool>,
    ) -> Option<u64> {
        let crawler = &self.config.crawler;
        let mut total_found: Option<u64> = None;

        for page in 0..crawler.max_pages {
            if *shutdown.borrow() {
                break;
            }

            if let Some(found) = total_found {
                if u64::from(page) * u64::from(crawler.per_page) >= found {
                    break;
                }
            }

            let query = ListingQuery {
                region,
                window: *window,
                page,
            };

            match self.fetch_listing(&query).await {
                Ok(listing) => {
                    record_found(&mut total_found, listing.total_found, &query);
                    self.stats
                        .record_integrity_errors(listing.skipped_entries);
                    self.stats
                        .record_postings_discovered(listing.posting_ids.len());

                    for posting_id in listing.posting_ids {
                        let pending = PendingDetail { region, posting_id };
                        if details.send(pending).await.is_err() {
                            tracing::error!("Detail queue closed, region {} cannot continue", region);
                            return None;
                        }
                    }
                }
                Err(FetchError::EmptyListing { url, total_found: found }) => {
                    tracing::warn!("No vacancies found for URL: {}", url);
                    self.stats.record_empty_listing();
                    record_found(&mut total_found, found, &query);
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        "Region {}: listing page {} of {} failed: {}",
                        region,
                        page,
                        window,
                        e
                    );
                    self.stats.record_listing_failure();
                }
            }
        }

        total_found
    }

    /// Fetches one listing page
    pub async fn fetch_listing(&self, query: &ListingQuery) -> Result<ListingResult, FetchError> {
        self.stats.record_listing_request();
        self.client.fetch_listing(query).await
    }

    /// Fetches and normalizes one posting
    pub async fn fetch_detail(&self, posting_id: &str) -> Result<PostingDetail, FetchError> {
        self.client.fetch_detail(posting_id).await
    }

    /// Takes posting ids off the queue until it closes
    ///
    /// After shutdown is requested, queued ids are drained and dropped so
    /// region tasks blocked on a full queue can finish.
    async fn detail_worker(
        &self,
        worker_id: u32,
        queue: DetailQueue,
        shutdown: watch::Receiver<bool>,
    ) {
        tracing::debug!("Detail worker {} started", worker_id);

        loop {
            let next = queue.lock().await.recv().await;
            let Some(pending) = next else {
                break;
            };

            if *shutdown.borrow() {
                self.stats.record_posting_dropped();
                continue;
            }

            self.process_detail(&pending).await;
        }

        tracing::debug!("Detail worker {} finished", worker_id);
    }

    async fn process_detail(&self, pending: &PendingDetail) {
        let detail = match self.fetch_detail(&pending.posting_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!(
                    "Region {}: failed to fetch vacancy {}: {}",
                    pending.region,
                    pending.posting_id,
                    e
                );
                self.stats.record_detail_failure();
                return;
            }
        };

        match self.sink.write_record(&detail) {
            Ok(()) => self.stats.record_detail_emitted(),
            Err(e) => {
                tracing::error!("Failed to write vacancy {}: {}", detail.id, e);
                self.stats.record_sink_failure();
            }
        }
    }
}

/// Keeps the first count reported for a window
fn record_found(total_found: &mut Option<u64>, found: u64, query: &ListingQuery) {
    match *total_found {
        None => *total_found = Some(found),
        Some(first) if first != found => tracing::debug!(
            "Region {}: page {} of {} reported {} matches, keeping {}",
            query.region,
            query.page,
            query.window,
            found,
            first
        ),
        Some(_) => {}
    }
}
