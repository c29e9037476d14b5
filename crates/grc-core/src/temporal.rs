//! # Temporal Types — Injected Clock and Day Arithmetic
//!
//! Remediation status, SLA evaluation, and the scorecard trend estimate all
//! depend on "today". Engines receive a [`Clock`] instead of calling the
//! system clock inline, which keeps every computation a deterministic
//! function of its inputs.
//!
//! ## Day Arithmetic
//!
//! All day counts are computed on UTC-midnight-normalized instants and
//! rounded up: a due date tomorrow is 1 day away, today is 0, yesterday
//! is -1. Durations measured from a timestamp (tracker creation) to a
//! midnight round up to the next whole day.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::GrcError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current UTC instant.
    fn now(&self) -> DateTime<Utc>;

    /// The current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// A clock frozen at midnight UTC on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self(utc_midnight(date))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Midnight UTC at the start of `date`.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Whole days from `today` until `due`; negative once `due` has passed.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// `ceil((to - from) / 1 day)`.
pub fn ceil_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    -((-secs).div_euclid(SECONDS_PER_DAY))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, GrcError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| GrcError::Validation(format!("invalid date {s:?} (expected YYYY-MM-DD): {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fixed_clock_today_is_utc_date() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 0).unwrap());
        assert_eq!(clock.today(), date(2026, 3, 10));
    }

    #[test]
    fn days_until_counts_calendar_days() {
        let today = date(2026, 3, 10);
        assert_eq!(days_until(date(2026, 3, 15), today), 5);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(date(2026, 3, 8), today), -2);
    }

    #[test]
    fn ceil_days_rounds_partial_days_up() {
        let today = utc_midnight(date(2026, 3, 10));
        let created = Utc.with_ymd_and_hms(2026, 3, 8, 15, 0, 0).unwrap();
        // 1 day 9 hours rounds up to 2.
        assert_eq!(ceil_days_between(created, today), 2);
        assert_eq!(ceil_days_between(today - Duration::days(3), today), 3);
    }

    #[test]
    fn ceil_days_same_day_creation_is_zero() {
        let today = utc_midnight(date(2026, 3, 10));
        let created_later_that_day = today + Duration::hours(10);
        assert_eq!(ceil_days_between(created_later_that_day, today), 0);
    }

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(parse_date("2026-03-10").unwrap(), date(2026, 3, 10));
        assert!(matches!(parse_date("10/03/2026"), Err(GrcError::Validation(_))));
        assert!(parse_date("").is_err());
    }
}
