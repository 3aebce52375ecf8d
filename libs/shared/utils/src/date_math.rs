//! Calendar arithmetic used by the scheduler.
//!
//! Month and year steps go through chrono's `Months`, so a step lands on the
//! same day-of-month (clamped to the month's last day) instead of drifting by
//! a fixed number of seconds.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Year,
}

/// `anchor` advanced by `count` calendar units, or `None` on overflow.
pub fn add_units(anchor: DateTime<Utc>, unit: CalendarUnit, count: u32) -> Option<DateTime<Utc>> {
    match unit {
        CalendarUnit::Day => anchor.checked_add_signed(Duration::days(i64::from(count))),
        CalendarUnit::Week => anchor.checked_add_signed(Duration::weeks(i64::from(count))),
        CalendarUnit::Month => anchor.checked_add_months(Months::new(count)),
        CalendarUnit::Year => count
            .checked_mul(12)
            .and_then(|months| anchor.checked_add_months(Months::new(months))),
    }
}

/// End of an interval of `minutes` starting at `start`, or `None` when it
/// falls outside chrono's representable range.
pub fn add_minutes(start: DateTime<Utc>, minutes: i32) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::minutes(i64::from(minutes)))
}

/// `date` at `hour`:00:00 UTC.
pub fn at_hour(date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0).map(|naive| naive.and_utc())
}

/// Drops minutes, seconds and sub-seconds.
pub fn truncate_to_hour(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    at_hour(instant.date_naive(), instant.hour())
}

/// Completed years between a birth date and `on`.
pub fn whole_years_between(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}
