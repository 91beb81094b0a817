use chrono::{Duration, NaiveDateTime};
use std::fmt;

use crate::error::{Error, Result};

/// Wire and display format of all timestamps (local time, no offset).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minimum separation between two missions flown by the same aircraft.
pub const TURNAROUND_MARGIN_HOURS: i64 = 1;

/// A half-open mission schedule `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidTimeWindow { start: format_timestamp(start), end: format_timestamp(end) });
        }
        Ok(TimeWindow { start, end })
    }

    /// Parses both ends with [`TIMESTAMP_FORMAT`] and validates the ordering.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        TimeWindow::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    pub fn get_start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn get_end(&self) -> NaiveDateTime {
        self.end
    }

    /// Two windows are compatible when one ends at least the turnaround margin
    /// before the other starts. Anything closer, touching or overlapping conflicts.
    pub fn is_compatible_with(&self, other: &TimeWindow) -> bool {
        let margin = Duration::hours(TURNAROUND_MARGIN_HOURS);
        self.start >= other.end + margin || self.end <= other.start - margin
    }

    /// Closed-interval intersection with `[start, end]`; touching endpoints count.
    pub fn intersects(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start <= end && self.end >= start
    }

    /// `now ∈ [start - hours, start)`. A lookahead reaching past the earliest
    /// representable instant covers everything before `start`.
    pub fn starts_within(&self, hours: i64, now: NaiveDateTime) -> bool {
        let opens = Duration::try_hours(hours).and_then(|lead| self.start.checked_sub_signed(lead));
        now < self.start && opens.is_none_or(|opens| now >= opens)
    }

    pub fn has_started(&self, now: NaiveDateTime) -> bool {
        now >= self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", format_timestamp(self.start), format_timestamp(self.end))
    }
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|source| Error::InvalidTimestamp { value: value.to_string(), source })
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).unwrap()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_inverted_windows() {
        assert!(matches!(TimeWindow::parse("2025-01-01 10:00", "2025-01-01 10:00"), Err(Error::InvalidTimeWindow { .. })));
        assert!(matches!(TimeWindow::parse("2025-01-01 12:00", "2025-01-01 10:00"), Err(Error::InvalidTimeWindow { .. })));
    }

    #[test]
    fn test_rejects_malformed_timestamp() {
        assert!(matches!(parse_timestamp("2025/01/01 10:00"), Err(Error::InvalidTimestamp { .. })));
        assert!(matches!(parse_timestamp("2025-01-01T10:00"), Err(Error::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_timestamp_format_roundtrip() {
        assert_eq!(format_timestamp(ts("2025-03-09 07:05")), "2025-03-09 07:05");
    }

    #[test]
    fn test_exactly_one_hour_apart_is_compatible() {
        let first = window("2025-01-01 10:00", "2025-01-01 12:00");
        let second = window("2025-01-01 13:00", "2025-01-01 15:00");
        assert!(first.is_compatible_with(&second));
        assert!(second.is_compatible_with(&first));
    }

    #[test]
    fn test_less_than_margin_conflicts() {
        let first = window("2025-01-01 10:00", "2025-01-01 12:00");
        let second = window("2025-01-01 12:59", "2025-01-01 15:00");
        assert!(!first.is_compatible_with(&second));
        assert!(!second.is_compatible_with(&first));
    }

    #[test]
    fn test_touching_windows_conflict() {
        let first = window("2025-01-01 10:00", "2025-01-01 12:00");
        let second = window("2025-01-01 12:00", "2025-01-01 14:00");
        assert!(!first.is_compatible_with(&second));
        assert!(!second.is_compatible_with(&first));
    }

    #[test]
    fn test_overlap_and_containment_conflict() {
        let outer = window("2025-01-01 08:00", "2025-01-01 18:00");
        let inner = window("2025-01-01 10:00", "2025-01-01 12:00");
        let partial = window("2025-01-01 17:00", "2025-01-01 20:00");
        assert!(!outer.is_compatible_with(&inner));
        assert!(!inner.is_compatible_with(&outer));
        assert!(!outer.is_compatible_with(&partial));
        assert!(!outer.is_compatible_with(&outer));
    }

    #[test]
    fn test_inclusive_intersection() {
        let w = window("2025-01-01 10:00", "2025-01-01 12:00");
        assert!(w.intersects(ts("2025-01-01 12:00"), ts("2025-01-01 13:00")));
        assert!(w.intersects(ts("2025-01-01 09:00"), ts("2025-01-01 10:00")));
        assert!(w.intersects(ts("2025-01-01 10:30"), ts("2025-01-01 11:00")));
        assert!(!w.intersects(ts("2025-01-01 12:01"), ts("2025-01-01 13:00")));
        assert!(!w.intersects(ts("2025-01-01 08:00"), ts("2025-01-01 09:59")));
    }

    #[test]
    fn test_starts_within_is_half_open() {
        let w = window("2025-01-01 10:00", "2025-01-01 12:00");
        assert!(w.starts_within(3, ts("2025-01-01 07:00")));
        assert!(w.starts_within(3, ts("2025-01-01 09:59")));
        assert!(!w.starts_within(3, ts("2025-01-01 06:59")));
        assert!(!w.starts_within(3, ts("2025-01-01 10:00")));
    }

    #[test]
    fn test_starts_within_saturates_huge_lookahead() {
        let w = window("2025-01-01 10:00", "2025-01-01 12:00");
        // Too large for a duration, and large enough to underflow the calendar.
        assert!(w.starts_within(i64::MAX, ts("1970-01-01 00:00")));
        assert!(w.starts_within(i64::MAX / 1_000_000, ts("2024-12-01 00:00")));
        assert!(!w.starts_within(i64::MAX, ts("2025-01-01 10:00")));
    }
}
