//! The single local/UTC distinction the date builtin knows about.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::time_value::{MS_PER_MINUTE, MS_PER_SECOND};

/// The host's local time zone: whatever the process runs in, a named IANA
/// zone, or a fixed offset from UTC.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HostZone {
    #[default]
    System,
    Named(Tz),
    Fixed(FixedOffset),
}

impl HostZone {
    pub fn utc() -> Self {
        HostZone::Fixed(Utc.fix())
    }

    /// A fixed zone `minutes` east of UTC; `None` past ±24h.
    pub fn fixed_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(HostZone::Fixed)
    }

    /// Offset (local minus UTC, in ms) that applies to a wall-clock reading.
    pub fn offset_for_local(&self, local: &NaiveDateTime) -> f64 {
        let offset = match self {
            HostZone::Fixed(offset) => *offset,
            HostZone::Named(tz) => wall_clock_offset(tz, local),
            HostZone::System => wall_clock_offset(&Local, local),
        };
        offset.local_minus_utc() as f64 * MS_PER_SECOND
    }

    /// Same as [`offset_for_local`](Self::offset_for_local) but for a local
    /// time expressed as milliseconds on the epoch scale.
    pub fn offset_for_local_ms(&self, local_ms: f64) -> f64 {
        match DateTime::from_timestamp_millis(local_ms as i64) {
            Some(dt) => self.offset_for_local(&dt.naive_utc()),
            None => self.offset_at(local_ms),
        }
    }

    /// Offset (local minus UTC, in ms) in force at time value `t`.
    pub fn offset_at(&self, t: f64) -> f64 {
        let instant = || {
            DateTime::from_timestamp_millis(t as i64)
                .unwrap_or_else(Utc::now)
                .naive_utc()
        };
        let offset = match self {
            HostZone::Fixed(offset) => *offset,
            HostZone::Named(tz) => tz.offset_from_utc_datetime(&instant()).fix(),
            HostZone::System => Local.offset_from_utc_datetime(&instant()).fix(),
        };
        offset.local_minus_utc() as f64 * MS_PER_SECOND
    }

    // §21.4.1.25 LocalTime(t)
    pub fn local_time(&self, t: f64) -> f64 {
        t + self.offset_at(t)
    }

    // §21.4.1.26 UTC(t)
    pub fn utc_time(&self, local: f64) -> f64 {
        local - self.offset_for_local_ms(local)
    }

    /// Name shown in parentheses by `Date.prototype.toString`.
    pub fn name(&self) -> String {
        match self {
            HostZone::System => system_zone_name(std::env::var("TZ").ok()),
            HostZone::Named(tz) => tz.name().to_string(),
            HostZone::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            HostZone::Fixed(offset) => {
                format!("UTC{}", format_offset(offset.local_minus_utc() as f64 * MS_PER_SECOND, true))
            }
        }
    }
}

/// Offset for a wall-clock reading in `tz`. Repeated readings take the
/// earlier instant; skipped readings take the offset in force before the gap.
fn wall_clock_offset<Z: TimeZone>(tz: &Z, local: &NaiveDateTime) -> FixedOffset {
    match tz.offset_from_local_datetime(local) {
        LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => offset.fix(),
        LocalResult::None => local
            .checked_sub_signed(TimeDelta::days(1))
            .and_then(|before| tz.offset_from_local_datetime(&before).earliest())
            .map(|offset| offset.fix())
            .unwrap_or_else(|| tz.offset_from_utc_datetime(local).fix()),
    }
}

/// Name of the process zone. `TZ` wins over the platform setting, since that
/// is what `chrono::Local` resolves offsets from.
fn system_zone_name(tz_env: Option<String>) -> String {
    let from_env = tz_env.and_then(|raw| {
        let raw = raw.trim().trim_start_matches(':');
        let raw = raw.rsplit_once("zoneinfo/").map_or(raw, |(_, name)| name);
        match raw.parse::<Tz>() {
            Ok(tz) => Some(tz.name().to_string()),
            Err(_) if raw.is_empty() => None,
            Err(_) => Some(raw.to_string()),
        }
    });
    from_env
        .or_else(|| iana_time_zone::get_timezone().ok())
        .unwrap_or_else(|| "Local Time".to_string())
}

/// Renders an offset in ms as `+hhmm`, or `+hh:mm` with `colon`.
pub fn format_offset(offset_ms: f64, colon: bool) -> String {
    let minutes = (offset_ms / MS_PER_MINUTE) as i64;
    let sign = if minutes >= 0 { '+' } else { '-' };
    let abs = minutes.unsigned_abs();
    if colon {
        format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
    } else {
        format!("{sign}{:02}{:02}", abs / 60, abs % 60)
    }
}

impl fmt::Display for HostZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostZone::System => write!(f, "local"),
            HostZone::Named(tz) => write!(f, "{}", tz.name()),
            HostZone::Fixed(_) => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for HostZone {
    type Err = String;

    /// Accepts `local`, `utc`, IANA names, `UTC+hh:mm`, `GMT-hhmm`, `+hh`, …
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "local" | "system" => return Ok(HostZone::System),
            "utc" | "gmt" | "z" => return Ok(HostZone::utc()),
            _ => {}
        }
        if let Ok(tz) = s.trim().parse::<Tz>() {
            return Ok(HostZone::Named(tz));
        }
        let rest = lower
            .strip_prefix("utc")
            .or_else(|| lower.strip_prefix("gmt"))
            .unwrap_or(lower.as_str());
        let invalid = || format!("invalid time zone {s:?}, expected local, utc, an IANA name or ±hh:mm");
        let (sign, digits) = match rest.as_bytes().first() {
            Some(b'+') => (1, &rest[1..]),
            Some(b'-') => (-1, &rest[1..]),
            _ => return Err(invalid()),
        };
        let digits = digits.replace(':', "");
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let (hours, minutes) = match digits.len() {
            1 | 2 => (digits.parse::<i32>().map_err(|_| invalid())?, 0),
            4 => (
                digits[..2].parse::<i32>().map_err(|_| invalid())?,
                digits[2..].parse::<i32>().map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };
        if minutes >= 60 {
            return Err(invalid());
        }
        HostZone::fixed_minutes(sign * (hours * 60 + minutes)).ok_or_else(invalid)
    }
}
