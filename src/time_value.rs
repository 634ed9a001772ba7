//! Time values: milliseconds since 1970-01-01T00:00:00Z held in an `f64`,
//! with NaN as the "invalid date" sentinel.

use chrono::{NaiveDate, Utc};

use crate::error::{DateError, DateResult};
use crate::zone::HostZone;

pub const MS_PER_SECOND: f64 = 1_000.0;
pub const MS_PER_MINUTE: f64 = 60_000.0;
pub const MS_PER_HOUR: f64 = 3_600_000.0;
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Largest magnitude a finite time value may have (±100,000,000 days).
pub const MAX_TIME_VALUE: f64 = 8.64e15;

// Years further than this from the epoch can never produce a clippable value.
const MAX_YEAR_SPAN: f64 = 1_000_000.0;

/// Source of the current instant.
pub trait Clock {
    fn now_utc_millis(&self) -> f64;
}

/// Reads the host wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc_millis(&self) -> f64 {
        Utc::now().timestamp_millis() as f64
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now_utc_millis(&self) -> f64 {
        self.0
    }
}

// §21.4.1.31 TimeClip(time)
pub fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME_VALUE {
        return f64::NAN;
    }
    let t = time.trunc();
    if t == 0.0 { 0.0_f64 } else { t }
}

/// Milliseconds from the epoch to local midnight of `year-month-day`, as
/// resolved by the host calendar. Fails with a `RangeError` when the host
/// calendar cannot represent the date. No clipping is applied.
pub fn from_calendar(year: f64, month: u32, day: u32, zone: &HostZone) -> DateResult<f64> {
    let midnight = i32::try_from(year as i64)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            DateError::Range(format!(
                "calendar date {year}-{month:02}-{day:02} is out of range"
            ))
        })?;
    let as_utc = midnight.and_utc().timestamp_millis() as f64;
    Ok(as_utc - zone.offset_for_local(&midnight))
}

// === Day arithmetic (§21.4.1) ===

pub fn day(t: f64) -> f64 {
    (t / MS_PER_DAY).floor()
}

pub fn time_within_day(t: f64) -> f64 {
    t.rem_euclid(MS_PER_DAY)
}

fn is_leap_year(year: f64) -> bool {
    let y = year as i64;
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

pub fn days_in_year(year: f64) -> f64 {
    if is_leap_year(year) { 366.0 } else { 365.0 }
}

/// Length of the 0-based `month` of `year`.
pub fn days_in_month(year: f64, month: u32) -> u32 {
    match month {
        1 if is_leap_year(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Days from January 1st of `year` to the first of the 0-based `month`.
fn days_before_month(year: f64, month: u32) -> f64 {
    (0..month).map(|m| f64::from(days_in_month(year, m))).sum()
}

/// Splits a 0-based day of `year` into a 0-based month and a 1-based date.
fn month_and_date(year: f64, day_of_year: f64) -> (f64, f64) {
    let mut remaining = day_of_year;
    for month in 0..11 {
        let length = f64::from(days_in_month(year, month));
        if remaining < length {
            return (f64::from(month), remaining + 1.0);
        }
        remaining -= length;
    }
    (11.0, remaining + 1.0)
}

pub fn day_from_year(y: f64) -> f64 {
    let y = y as i64;
    (365 * (y - 1970) + (y - 1969).div_euclid(4) - (y - 1901).div_euclid(100)
        + (y - 1601).div_euclid(400)) as f64
}

pub fn time_from_year(y: f64) -> f64 {
    day_from_year(y) * MS_PER_DAY
}

pub fn year_from_time(t: f64) -> f64 {
    if !t.is_finite() {
        return f64::NAN;
    }
    // The mean Gregorian year lands within a year of the answer.
    let mut year = (day(t) / 365.2425).floor() + 1970.0;
    while time_from_year(year) > t {
        year -= 1.0;
    }
    while time_from_year(year + 1.0) <= t {
        year += 1.0;
    }
    year
}

fn day_within_year(t: f64, year: f64) -> f64 {
    day(t) - day_from_year(year)
}

pub fn month_from_time(t: f64) -> f64 {
    let year = year_from_time(t);
    month_and_date(year, day_within_year(t, year)).0
}

pub fn date_from_time(t: f64) -> f64 {
    let year = year_from_time(t);
    month_and_date(year, day_within_year(t, year)).1
}

pub fn week_day(t: f64) -> f64 {
    (day(t) + 4.0).rem_euclid(7.0)
}

pub fn hour_from_time(t: f64) -> f64 {
    (time_within_day(t) / MS_PER_HOUR).floor()
}

pub fn min_from_time(t: f64) -> f64 {
    (time_within_day(t).rem_euclid(MS_PER_HOUR) / MS_PER_MINUTE).floor()
}

pub fn sec_from_time(t: f64) -> f64 {
    (time_within_day(t).rem_euclid(MS_PER_MINUTE) / MS_PER_SECOND).floor()
}

pub fn ms_from_time(t: f64) -> f64 {
    time_within_day(t).rem_euclid(MS_PER_SECOND)
}

pub fn make_time(hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    if ![hour, min, sec, ms].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    hour.trunc() * MS_PER_HOUR + min.trunc() * MS_PER_MINUTE + sec.trunc() * MS_PER_SECOND
        + ms.trunc()
}

pub fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if ![year, month, date].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    let month = month.trunc();
    let year = year.trunc() + (month / 12.0).floor();
    if year.abs() > MAX_YEAR_SPAN {
        return f64::NAN;
    }
    let month = month.rem_euclid(12.0) as u32;
    day_from_year(year) + days_before_month(year, month) + date.trunc() - 1.0
}

pub fn make_date(day: f64, time: f64) -> f64 {
    if !day.is_finite() || !time.is_finite() {
        return f64::NAN;
    }
    day * MS_PER_DAY + time
}
