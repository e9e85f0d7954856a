//! Calendar and duration helpers shared by the countdown and the dashboard.

use std::time::Duration as StdDuration;

use time::{Month, OffsetDateTime, Time, Weekday};
use tokio::time::Instant;

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: i64 = 1_000;
/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

const MONTH_NAMES: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current instant as a UTC timestamp.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock anchored once at construction and advanced by the Tokio monotonic clock.
///
/// Because it reads [`tokio::time::Instant`], it follows the paused test clock as well.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin_wall: OffsetDateTime,
    origin: Instant,
}

impl MonotonicClock {
    /// Anchor the clock at the current system time.
    pub fn new() -> Self {
        Self::starting_at(OffsetDateTime::now_utc())
    }

    /// Anchor the clock at an explicit wall-clock timestamp.
    pub fn starting_at(origin_wall: OffsetDateTime) -> Self {
        Self {
            origin_wall,
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> OffsetDateTime {
        self.origin_wall + self.origin.elapsed()
    }
}

/// Non-negative breakdown of a duration into calendar-ish units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeComponents {
    /// Whole days.
    pub days: u64,
    /// Hours left after the days, `0..24`.
    pub hours: u64,
    /// Minutes left after the hours, `0..60`.
    pub minutes: u64,
    /// Seconds left after the minutes, `0..60`.
    pub seconds: u64,
}

/// Decompose `distance_ms` with truncating division, each unit taken from the
/// remainder of the larger one. Negative distances are treated as zero.
pub fn calculate_time_components(distance_ms: i64) -> TimeComponents {
    let distance = distance_ms.max(0);
    TimeComponents {
        days: (distance / MILLIS_PER_DAY) as u64,
        hours: ((distance % MILLIS_PER_DAY) / MILLIS_PER_HOUR) as u64,
        minutes: ((distance % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE) as u64,
        seconds: ((distance % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND) as u64,
    }
}

/// Whole milliseconds from `now` until `target`, negative once `target` is past.
pub fn millis_until(target: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let millis = (target - now).whole_milliseconds();
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}

/// Fractional number of days elapsed between `start` and `now`.
pub fn days_since(start: OffsetDateTime, now: OffsetDateTime) -> f64 {
    -(millis_until(start, now) as f64) / MILLIS_PER_DAY as f64
}

/// French month name used by the dashboard period card.
pub fn month_name(month: Month) -> &'static str {
    MONTH_NAMES[u8::from(month) as usize - 1]
}

/// Day-of-month and month label of a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateComponents {
    /// Two-digit day of the month.
    pub day: String,
    /// Month name.
    pub month: &'static str,
}

/// Split a timestamp into the labels shown on the period card.
pub fn format_date_components(date: OffsetDateTime) -> DateComponents {
    DateComponents {
        day: date.day().to_string(),
        month: month_name(date.month()),
    }
}

/// Near-future window starting `start_offset` and ending `end_offset` after `now`.
pub fn offset_window(
    now: OffsetDateTime,
    start_offset: StdDuration,
    end_offset: StdDuration,
) -> (OffsetDateTime, OffsetDateTime) {
    (now + start_offset, now + end_offset)
}

/// Next weekly slot opening on `weekday` at `start_hour:00` and lasting `duration_days`.
///
/// The slot is always strictly in a later week when `now` already falls on `weekday`,
/// matching the registration cadence of one cycle per week.
pub fn next_weekly_window(
    now: OffsetDateTime,
    weekday: Weekday,
    start_hour: u8,
    duration_days: u8,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let current = now.weekday().number_days_from_monday();
    let target = weekday.number_days_from_monday();
    let mut days_until = (target + 7 - current) % 7;
    if days_until == 0 {
        days_until = 7;
    }

    let start_time = Time::from_hms(start_hour, 0, 0).ok()?;
    let start = (now + time::Duration::days(i64::from(days_until))).replace_time(start_time);
    let end = start + time::Duration::days(i64::from(duration_days));
    Some((start, end))
}
