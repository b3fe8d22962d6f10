//! Hour axis of the observation grid.
//!
//! Every instant that participates in grid placement is first normalized to
//! the top of its clock hour, so two timestamps inside the same hour always
//! compare equal regardless of input precision.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Zero out minutes, seconds and sub-second fraction.
pub fn normalize_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroing sub-hour fields cannot overflow")
}

/// The 24 hour-aligned instants of `day`, starting at midnight.
pub fn hours_of_day(day: NaiveDate) -> Vec<NaiveDateTime> {
    let midnight = day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    (0..24).map(|h| midnight + Duration::hours(h)).collect()
}

/// Hour-aligned instants from `start` (floored) through `end` (floored)
/// inclusive, stepping one hour. Empty when `end` precedes `start`.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let first = normalize_hour(start);
    let last = normalize_hour(end);
    if last < first {
        return Vec::new();
    }
    let span = (last - first).num_hours();
    (0..=span).map(|h| first + Duration::hours(h)).collect()
}
