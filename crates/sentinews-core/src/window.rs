//! Collection date window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Inclusive `[start, end]` range of publication timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// The `days` days ending at `now`.
    #[must_use]
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Resolve user-supplied bounds. A missing bound, or `end` before
    /// `start`, falls back to the trailing default window ending at `now`.
    #[must_use]
    pub fn resolve(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::resolve_with_default(start, end, now, DEFAULT_WINDOW_DAYS)
    }

    #[must_use]
    pub fn resolve_with_default(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        default_days: i64,
    ) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if end >= start => Self { start, end },
            _ => Self::trailing(now, default_days),
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn ordered_bounds_are_kept() {
        let w = DateWindow::resolve(Some(at(2020, 1, 1)), Some(at(2020, 1, 5)), at(2020, 3, 1));
        assert_eq!(w.start, at(2020, 1, 1));
        assert_eq!(w.end, at(2020, 1, 5));
    }

    #[test]
    fn inverted_bounds_fall_back_to_trailing_week() {
        let now = at(2020, 3, 10);
        let w = DateWindow::resolve(Some(at(2020, 1, 5)), Some(at(2020, 1, 1)), now);
        assert_eq!(w.end, now);
        assert_eq!(w.start, at(2020, 3, 3));
    }

    #[test]
    fn missing_bound_falls_back() {
        let now = at(2020, 3, 10);
        let w = DateWindow::resolve(Some(at(2020, 1, 5)), None, now);
        assert_eq!(w, DateWindow::trailing(now, 7));
    }

    #[test]
    fn contains_is_inclusive() {
        let w = DateWindow::resolve(Some(at(2020, 1, 1)), Some(at(2020, 1, 5)), at(2020, 3, 1));
        assert!(w.contains(at(2020, 1, 1)));
        assert!(w.contains(at(2020, 1, 5)));
        assert!(!w.contains(at(2020, 1, 6)));
    }
}
