use crate::config::CrawlerConfig;
use crate::window::DateWindow;
use crate::RegionId;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Why a region's traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last window matched nothing
    NoResults,

    /// The next window would start before the earliest year
    ReachedFloor,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResults => write!(f, "no results"),
            Self::ReachedFloor => write!(f, "reached earliest year"),
        }
    }
}

/// Outcome of one partitioning step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Too many matches: query a narrower window right before the current one
    Split(DateWindow),

    /// Within the cap: query the next fixed-width window right before the current one
    Slide(DateWindow),

    /// The region is done
    Stop(StopReason),
}

impl Transition {
    /// The window to query next, if any
    pub fn window(&self) -> Option<DateWindow> {
        match self {
            Self::Split(window) | Self::Slide(window) => Some(*window),
            Self::Stop(_) => None,
        }
    }
}

/// Decides which window a region queries next
///
/// Windows above the split threshold are halved (binary search on width);
/// windows below it are followed by a fixed-width window. Every new window
/// ends exactly where the previous one started, so a region's windows tile
/// history backward without gaps or overlap.
#[derive(Debug, Clone)]
pub struct WindowPartitioner {
    split_threshold: u64,
    window_days: u32,
    earliest_year: i32,
}

impl WindowPartitioner {
    pub fn new(split_threshold: u64, window_days: u32, earliest_year: i32) -> Self {
        Self {
            split_threshold,
            window_days,
            earliest_year,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.split_threshold,
            config.window_days,
            config.earliest_year,
        )
    }

    /// The first window for every region: the last `window_days` days up to `today`
    pub fn initial(&self, today: NaiveDate) -> DateWindow {
        DateWindow::ending_at(today, u64::from(self.window_days))
            .unwrap_or(DateWindow { from: NaiveDate::MIN, to: today })
    }

    /// Picks the next window for `region` given how many postings `window` matched
    ///
    /// | total_found | outcome |
    /// |-------------|---------|
    /// | `>= split_threshold` | split: half the span (at least one day), ending at `window.from` |
    /// | `0` | stop |
    /// | otherwise | slide: `window_days` wide, ending at `window.from` |
    ///
    /// Split and slide both stop instead when the new window would start
    /// before `earliest_year`.
    pub fn next(&self, region: RegionId, window: &DateWindow, total_found: u64) -> Transition {
        let transition = if total_found >= self.split_threshold {
            let step = (window.span_days() / 2).max(1) as u64;
            match self.window_before(window.from(), step) {
                Some(narrower) => Transition::Split(narrower),
                None => Transition::Stop(StopReason::ReachedFloor),
            }
        } else if total_found == 0 {
            Transition::Stop(StopReason::NoResults)
        } else {
            match self.window_before(window.from(), u64::from(self.window_days)) {
                Some(previous) => Transition::Slide(previous),
                None => Transition::Stop(StopReason::ReachedFloor),
            }
        };

        tracing::trace!(
            "Region {}: window {} found {} -> {:?}",
            region,
            window,
            total_found,
            transition
        );

        transition
    }

    fn window_before(&self, anchor: NaiveDate, days: u64) -> Option<DateWindow> {
        let window = DateWindow::ending_at(anchor, days)?;
        (window.from().year() >= self.earliest_year).then_some(window)
    }
}
