//! Fixed (non-locale) text renderings of a time value.

use crate::error::{DateError, DateResult};
use crate::time_value::*;
use crate::zone::{HostZone, format_offset};

pub(crate) const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar breakdown of a time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateFields {
    pub year: i64,
    /// 0 = January.
    pub month: u32,
    pub day: u32,
    /// 0 = Sunday.
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl DateFields {
    /// Breaks `t` down on the UTC calendar; `None` for the invalid sentinel.
    pub fn from_time_value(t: f64) -> Option<Self> {
        if !t.is_finite() {
            return None;
        }
        Some(DateFields {
            year: year_from_time(t) as i64,
            month: month_from_time(t) as u32,
            day: date_from_time(t) as u32,
            weekday: week_day(t) as u32,
            hour: hour_from_time(t) as u32,
            minute: min_from_time(t) as u32,
            second: sec_from_time(t) as u32,
            millisecond: ms_from_time(t) as u32,
        })
    }

    /// Breaks `t` down as wall-clock time in `zone`.
    pub fn local(t: f64, zone: &HostZone) -> Option<Self> {
        if !t.is_finite() {
            return None;
        }
        Self::from_time_value(zone.local_time(t))
    }

    fn day_name(&self) -> &'static str {
        DAY_NAMES[self.weekday as usize % 7]
    }

    fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize % 12]
    }
}

const INVALID_DATE: &str = "Invalid Date";

fn display_year(year: i64) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

// §21.4.4.41.2 DateString(tv)
fn date_part(f: &DateFields) -> String {
    format!(
        "{} {} {:02} {}",
        f.day_name(),
        f.month_name(),
        f.day,
        display_year(f.year)
    )
}

// §21.4.4.41.1 TimeString(tv) + §21.4.4.41.3 TimeZoneString(tv)
fn time_part(f: &DateFields, t: f64, zone: &HostZone) -> String {
    format!(
        "{:02}:{:02}:{:02} GMT{} ({})",
        f.hour,
        f.minute,
        f.second,
        format_offset(zone.offset_at(t), false),
        zone.name()
    )
}

/// `Date.prototype.toString`, also what `Date()` returns.
pub fn to_string(t: f64, zone: &HostZone) -> String {
    match DateFields::local(t, zone) {
        Some(f) => format!("{} {}", date_part(&f), time_part(&f, t, zone)),
        None => INVALID_DATE.to_string(),
    }
}

pub fn to_date_string(t: f64, zone: &HostZone) -> String {
    match DateFields::local(t, zone) {
        Some(f) => date_part(&f),
        None => INVALID_DATE.to_string(),
    }
}

pub fn to_time_string(t: f64, zone: &HostZone) -> String {
    match DateFields::local(t, zone) {
        Some(f) => time_part(&f, t, zone),
        None => INVALID_DATE.to_string(),
    }
}

pub fn to_utc_string(t: f64) -> String {
    match DateFields::from_time_value(t) {
        Some(f) => format!(
            "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
            f.day_name(),
            f.day,
            f.month_name(),
            display_year(f.year),
            f.hour,
            f.minute,
            f.second
        ),
        None => INVALID_DATE.to_string(),
    }
}

/// `Date.prototype.toISOString`; an invalid date is a `RangeError`.
pub fn to_iso_string(t: f64) -> DateResult<String> {
    let f = DateFields::from_time_value(t)
        .ok_or_else(|| DateError::Range("Invalid time value".to_string()))?;
    let year = if (0..=9999).contains(&f.year) {
        format!("{:04}", f.year)
    } else if f.year >= 0 {
        format!("+{:06}", f.year)
    } else {
        format!("-{:06}", f.year.unsigned_abs())
    };
    Ok(format!(
        "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        f.month + 1,
        f.day,
        f.hour,
        f.minute,
        f.second,
        f.millisecond
    ))
}
