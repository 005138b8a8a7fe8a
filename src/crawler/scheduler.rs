//! Request pacing for the upstream API
//!
//! This module handles:
//! - Enforcing a minimum delay between requests to the same host
//! - Handing out send slots to concurrent callers in arrival order

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Spaces requests to each host at least `min_delay` apart
///
/// Each caller reserves the next free slot for its host and sleeps until it
/// comes up, so concurrent callers queue behind one another instead of
/// bursting together once a delay expires.
#[derive(Debug)]
pub struct RequestPacer {
    min_delay: Duration,

    /// Earliest instant the next request to each host may be sent
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RequestPacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves the next slot for `host` and returns how long to wait for it
    pub fn reserve(&self, host: &str, now: Instant) -> Duration {
        let mut slots = self
            .next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let slot = match slots.get(host) {
            Some(&next) if next > now => next,
            _ => now,
        };
        slots.insert(host.to_string(), slot + self.min_delay);

        slot - now
    }

    /// Waits until a request to `host` may be sent
    pub async fn wait_turn(&self, host: &str) {
        let wait = self.reserve(host, Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Pacing request to {} by {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));
        let now = Instant::now();

        assert_eq!(pacer.reserve("api.hh.ru", now), Duration::ZERO);
    }

    #[test]
    fn test_consecutive_requests_queue_up() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));
        let now = Instant::now();

        assert_eq!(pacer.reserve("api.hh.ru", now), Duration::ZERO);
        assert_eq!(pacer.reserve("api.hh.ru", now), Duration::from_millis(1000));
        assert_eq!(pacer.reserve("api.hh.ru", now), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_already_elapsed() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));
        let start = Instant::now();

        pacer.reserve("api.hh.ru", start);
        let later = start + Duration::from_millis(1500);
        assert_eq!(pacer.reserve("api.hh.ru", later), Duration::ZERO);
    }

    #[test]
    fn test_partial_wait() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));
        let start = Instant::now();

        pacer.reserve("api.hh.ru", start);
        let later = start + Duration::from_millis(400);
        assert_eq!(
            pacer.reserve("api.hh.ru", later),
            Duration::from_millis(600)
        );
    }

    #[test]
    fn test_hosts_are_paced_independently() {
        let pacer = RequestPacer::new(Duration::from_millis(1000));
        let now = Instant::now();

        pacer.reserve("api.hh.ru", now);
        assert_eq!(pacer.reserve("hh.ru", now), Duration::ZERO);
    }

    #[test]
    fn test_zero_delay_never_waits() {
        let pacer = RequestPacer::new(Duration::ZERO);
        let now = Instant::now();

        for _ in 0..5 {
            assert_eq!(pacer.reserve("api.hh.ru", now), Duration::ZERO);
        }
    }

    #[tokio::test]
    async fn test_wait_turn_sleeps_between_requests() {
        let pacer = RequestPacer::new(Duration::from_millis(50));
        let start = Instant::now();

        pacer.wait_turn("api.hh.ru").await;
        pacer.wait_turn("api.hh.ru").await;

        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
