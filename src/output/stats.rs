//! Crawl statistics
//!
//! Counters are updated from every region task and detail worker, then
//! snapshotted and printed when the crawl ends.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all crawl tasks
#[derive(Debug, Default)]
pub struct CrawlStats {
    listing_requests: AtomicU64,
    listing_failures: AtomicU64,
    empty_listings: AtomicU64,
    windows_split: AtomicU64,
    windows_slid: AtomicU64,
    regions_completed: AtomicU64,
    regions_interrupted: AtomicU64,
    regions_abandoned: AtomicU64,
    postings_discovered: AtomicU64,
    integrity_errors: AtomicU64,
    details_emitted: AtomicU64,
    detail_failures: AtomicU64,
    sink_failures: AtomicU64,
    postings_dropped: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    pub listing_requests: u64,
    pub listing_failures: u64,
    pub empty_listings: u64,
    pub windows_split: u64,
    pub windows_slid: u64,
    pub regions_completed: u64,
    pub regions_interrupted: u64,
    pub regions_abandoned: u64,
    pub postings_discovered: u64,
    pub integrity_errors: u64,
    pub details_emitted: u64,
    pub detail_failures: u64,
    pub sink_failures: u64,
    pub postings_dropped: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_listing_request(&self) {
        bump(&self.listing_requests, 1);
    }

    pub fn record_listing_failure(&self) {
        bump(&self.listing_failures, 1);
    }

    pub fn record_empty_listing(&self) {
        bump(&self.empty_listings, 1);
    }

    pub fn record_split(&self) {
        bump(&self.windows_split, 1);
    }

    pub fn record_slide(&self) {
        bump(&self.windows_slid, 1);
    }

    pub fn record_region_completed(&self) {
        bump(&self.regions_completed, 1);
    }

    pub fn record_region_interrupted(&self) {
        bump(&self.regions_interrupted, 1);
    }

    pub fn record_region_abandoned(&self) {
        bump(&self.regions_abandoned, 1);
    }

    pub fn record_postings_discovered(&self, count: usize) {
        bump(&self.postings_discovered, count as u64);
    }

    pub fn record_integrity_errors(&self, count: usize) {
        bump(&self.integrity_errors, count as u64);
    }

    pub fn record_detail_emitted(&self) {
        bump(&self.details_emitted, 1);
    }

    pub fn record_detail_failure(&self) {
        bump(&self.detail_failures, 1);
    }

    pub fn record_sink_failure(&self) {
        bump(&self.sink_failures, 1);
    }

    pub fn record_posting_dropped(&self) {
        bump(&self.postings_dropped, 1);
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        let get = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        CrawlStatistics {
            listing_requests: get(&self.listing_requests),
            listing_failures: get(&self.listing_failures),
            empty_listings: get(&self.empty_listings),
            windows_split: get(&self.windows_split),
            windows_slid: get(&self.windows_slid),
            regions_completed: get(&self.regions_completed),
            regions_interrupted: get(&self.regions_interrupted),
            regions_abandoned: get(&self.regions_abandoned),
            postings_discovered: get(&self.postings_discovered),
            integrity_errors: get(&self.integrity_errors),
            details_emitted: get(&self.details_emitted),
            detail_failures: get(&self.detail_failures),
            sink_failures: get(&self.sink_failures),
            postings_dropped: get(&self.postings_dropped),
        }
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Regions completed: {}", stats.regions_completed);
    if stats.regions_interrupted > 0 {
        println!("  Interrupted by shutdown: {}", stats.regions_interrupted);
    }
    if stats.regions_abandoned > 0 {
        println!("  Abandoned (no listing page succeeded): {}", stats.regions_abandoned);
    }
    println!("Windows split: {}", stats.windows_split);
    println!("Windows slid: {}", stats.windows_slid);

    println!("\nListing requests: {}", stats.listing_requests);
    println!("  Failed: {}", stats.listing_failures);
    println!("  Empty: {}", stats.empty_listings);

    println!("\nPostings discovered: {}", stats.postings_discovered);
    println!("  Entries without id: {}", stats.integrity_errors);
    println!("  Records emitted: {}", stats.details_emitted);
    println!("  Detail fetches failed: {}", stats.detail_failures);
    println!("  Sink write failures: {}", stats.sink_failures);

    if stats.postings_dropped > 0 {
        println!("  Dropped at shutdown: {}", stats.postings_dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = CrawlStats::new();
        stats.record_listing_request();
        stats.record_listing_request();
        stats.record_listing_failure();
        stats.record_split();
        stats.record_postings_discovered(5);
        stats.record_integrity_errors(2);
        stats.record_detail_emitted();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.listing_requests, 2);
        assert_eq!(snapshot.listing_failures, 1);
        assert_eq!(snapshot.windows_split, 1);
        assert_eq!(snapshot.windows_slid, 0);
        assert_eq!(snapshot.postings_discovered, 5);
        assert_eq!(snapshot.integrity_errors, 2);
        assert_eq!(snapshot.details_emitted, 1);
    }

    #[test]
    fn test_counters_shared_across_threads() {
        let stats = std::sync::Arc::new(CrawlStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_detail_emitted();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.snapshot().details_emitted, 400);
    }
}
