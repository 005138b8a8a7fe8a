//! Date windows and the partitioning rules that move them through history
//!
//! A region is crawled as a chain of contiguous, non-overlapping windows
//! walking backward from the anchor date. Each window's reported result count
//! decides whether the next one is narrower (split), the same fixed width
//! (slide), or whether the region is finished.

mod partitioner;

pub use partitioner::{StopReason, Transition, WindowPartitioner};

use chrono::{Days, NaiveDate};
use std::fmt;

/// A contiguous date interval `[from, to]` used as a listing filter
///
/// `from <= to` always holds; windows are never changed in place, transitions
/// build new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    /// Creates a window, or `None` if `from` is after `to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// Creates the window of `days` days ending on `to`
    pub fn ending_at(to: NaiveDate, days: u64) -> Option<Self> {
        let from = to.checked_sub_days(Days::new(days))?;
        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of days between the window's bounds
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        assert!(DateWindow::new(date(2024, 1, 8), date(2024, 1, 1)).is_none());
        assert!(DateWindow::new(date(2024, 1, 1), date(2024, 1, 1)).is_some());
    }

    #[test]
    fn test_ending_at() {
        let window = DateWindow::ending_at(date(2024, 1, 8), 7).unwrap();
        assert_eq!(window.from(), date(2024, 1, 1));
        assert_eq!(window.to(), date(2024, 1, 8));
        assert_eq!(window.span_days(), 7);
    }

    #[test]
    fn test_span_crosses_year_boundary() {
        let window = DateWindow::new(date(2023, 12, 29), date(2024, 1, 1)).unwrap();
        assert_eq!(window.span_days(), 3);
    }

    #[test]
    fn test_display() {
        let window = DateWindow::new(date(2023, 12, 25), date(2024, 1, 1)).unwrap();
        assert_eq!(window.to_string(), "[2023-12-25, 2024-01-01]");
    }
}
