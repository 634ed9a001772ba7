//! Date string parsing: a fixed list of exact templates tried in priority
//! order, then a best-effort list of looser human formats. The first
//! candidate that accepts the whole string wins.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::format::{DAY_NAMES, MONTH_NAMES};
use crate::error::{DateError, DateResult};
use crate::time_value::{MS_PER_HOUR, MS_PER_MINUTE, day, days_in_month, make_date, make_day, make_time};
use crate::zone::HostZone;

pub(super) struct ParseContext<'a> {
    pub zone: &'a HostZone,
    /// Current time value, for strings that only carry a time of day.
    pub now: f64,
}

impl ParseContext<'_> {
    fn local(&self, local_ms: f64) -> f64 {
        self.zone.utc_time(local_ms)
    }

    fn today(&self) -> f64 {
        day(self.zone.local_time(self.now))
    }
}

type Template = fn(&str, &ParseContext<'_>) -> Option<f64>;

const TEMPLATES: &[(&str, Template)] = &[
    ("date-time with offset", iso_date_time_with_offset),
    ("local date-time", iso_date_time_local),
    ("date", iso_date),
    ("year-month", iso_year_month),
    ("time", iso_time),
    ("year", iso_year),
];

const FALLBACKS: &[(&str, Template)] = &[
    ("Date.prototype.toString", engine_to_string),
    ("RFC 2822", rfc2822),
    ("space-separated date-time", space_separated),
    ("numeric date", slash_date),
    ("month name", month_name_date),
];

/// Unclipped time value for `text`, or a `SyntaxError` when nothing
/// accepts it.
pub(super) fn parse(text: &str, cx: &ParseContext<'_>) -> DateResult<f64> {
    let s = text.trim();
    if let Some((name, t)) = first_match(TEMPLATES, s, cx) {
        trace!(template = name, input = s, "date string matched");
        return Ok(t);
    }
    if let Some((name, t)) = first_match(FALLBACKS, s, cx) {
        debug!(format = name, input = s, "date string parsed by generic fallback");
        return Ok(t);
    }
    Err(DateError::Syntax(format!("Invalid date string: {text:?}")))
}

fn first_match(
    candidates: &[(&'static str, Template)],
    s: &str,
    cx: &ParseContext<'_>,
) -> Option<(&'static str, f64)> {
    candidates
        .iter()
        .find_map(|(name, template)| template(s, cx).map(|t| (*name, t)))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        self.eat_any(&[b]).is_some()
    }

    fn eat_any(&mut self, set: &[u8]) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        if set.contains(&b) {
            self.pos += 1;
            Some(b)
        } else {
            None
        }
    }

    /// Exactly `n` ASCII digits; consumes nothing on failure.
    fn digits(&mut self, n: usize) -> Option<u32> {
        let run = self.bytes.get(self.pos..self.pos + n)?;
        if !run.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.pos += n;
        Some(run.iter().fold(0, |acc, d| acc * 10 + u32::from(d - b'0')))
    }

    fn digit_run(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }
}

// === ISO 8601 building blocks (§21.4.1.32 Date Time String Format) ===

fn year(c: &mut Cursor<'_>) -> Option<i64> {
    match c.eat_any(b"+-") {
        Some(b'-') => match c.digits(6)? {
            0 => None,
            y => Some(-i64::from(y)),
        },
        Some(_) => c.digits(6).map(i64::from),
        None => c.digits(4).map(i64::from),
    }
}

fn month(c: &mut Cursor<'_>) -> Option<u32> {
    if !c.eat(b'-') {
        return None;
    }
    c.digits(2).filter(|m| (1..=12).contains(m))
}

fn calendar_date(c: &mut Cursor<'_>) -> Option<(i64, u32, u32)> {
    let y = year(c)?;
    let m = month(c)?;
    if !c.eat(b'-') {
        return None;
    }
    let d = c.digits(2)?;
    (1..=days_in_month(y as f64, m - 1))
        .contains(&d)
        .then_some((y, m, d))
}

/// `HH:mm[:ss[.sss…]]` as milliseconds into the day. `24:00` is the end of
/// the day.
fn time_of_day(c: &mut Cursor<'_>) -> Option<f64> {
    let hour = c.digits(2)?;
    if !c.eat(b':') {
        return None;
    }
    let minute = c.digits(2)?;
    let (mut second, mut ms) = (0, 0);
    if c.eat(b':') {
        second = c.digits(2)?;
        if c.eat(b'.') {
            let frac = c.digit_run();
            if frac.is_empty() {
                return None;
            }
            ms = (0..3).fold(0, |acc, i| {
                acc * 10 + frac.get(i).map_or(0, |d| u32::from(d - b'0'))
            });
        }
    }
    if minute > 59 || second > 59 || hour > 24 || hour == 24 && (minute, second, ms) != (0, 0, 0)
    {
        return None;
    }
    Some(make_time(hour as f64, minute as f64, second as f64, ms as f64))
}

/// `Z`, `±HH:mm`, `±HHmm` or `±HH`, as local-minus-UTC milliseconds.
fn utc_offset(c: &mut Cursor<'_>) -> Option<f64> {
    if c.eat_any(b"Zz").is_some() {
        return Some(0.0);
    }
    let sign = match c.eat_any(b"+-")? {
        b'+' => 1.0,
        _ => -1.0,
    };
    let hours = c.digits(2)?;
    let minutes = if c.eat(b':') {
        c.digits(2)?
    } else {
        c.digits(2).unwrap_or(0)
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours as f64 * MS_PER_HOUR + minutes as f64 * MS_PER_MINUTE))
}

fn date_value(y: i64, m: u32, d: u32, time: f64) -> f64 {
    make_date(make_day(y as f64, (m - 1) as f64, d as f64), time)
}

// === Exact templates ===

fn iso_date_time_with_offset(s: &str, _cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let (y, m, d) = calendar_date(&mut c)?;
    c.eat_any(b"Tt")?;
    let time = time_of_day(&mut c)?;
    let offset = utc_offset(&mut c)?;
    c.done().then(|| date_value(y, m, d, time) - offset)
}

fn iso_date_time_local(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let (y, m, d) = calendar_date(&mut c)?;
    c.eat_any(b"Tt")?;
    let time = time_of_day(&mut c)?;
    c.done().then(|| cx.local(date_value(y, m, d, time)))
}

fn iso_date(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let (y, m, d) = calendar_date(&mut c)?;
    c.done().then(|| cx.local(date_value(y, m, d, 0.0)))
}

fn iso_year_month(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let y = year(&mut c)?;
    let m = month(&mut c)?;
    c.done().then(|| cx.local(date_value(y, m, 1, 0.0)))
}

fn iso_time(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let time = time_of_day(&mut c)?;
    let wall = make_date(cx.today(), time);
    if c.done() {
        return Some(cx.local(wall));
    }
    let offset = utc_offset(&mut c)?;
    c.done().then_some(wall - offset)
}

fn iso_year(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let y = year(&mut c)?;
    c.done().then(|| cx.local(date_value(y, 1, 1, 0.0)))
}

// === Generic fallbacks ===

fn offset_text(s: &str) -> Option<f64> {
    let mut c = Cursor::new(s);
    let offset = utc_offset(&mut c)?;
    c.done().then_some(offset)
}

/// What `Date.prototype.toString`/`toDateString` produce:
/// `Thu Jun 15 2023 14:34:56 GMT+0200 (Zone Name)`.
fn engine_to_string(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let body = match s.find(" (") {
        Some(i) if s.ends_with(')') => &s[..i],
        _ => s,
    };
    let parts: Vec<&str> = body.split_whitespace().collect();
    if !(4..=6).contains(&parts.len()) || !DAY_NAMES.contains(&parts[0]) {
        return None;
    }
    let month = MONTH_NAMES.iter().position(|m| *m == parts[1])? as u32;
    let day_val: u32 = parts[2].parse().ok()?;
    let year: i64 = parts[3].parse().ok()?;
    if !(1..=days_in_month(year as f64, month)).contains(&day_val) {
        return None;
    }
    let date = make_day(year as f64, month as f64, day_val as f64);
    let Some(clock) = parts.get(4) else {
        return Some(cx.local(make_date(date, 0.0)));
    };
    let mut c = Cursor::new(clock);
    let time = time_of_day(&mut c).filter(|_| c.done())?;
    match parts.get(5) {
        Some(zone) => {
            let offset = offset_text(zone.strip_prefix("GMT")?)?;
            Some(make_date(date, time) - offset)
        }
        None => Some(cx.local(make_date(date, time))),
    }
}

fn rfc2822(s: &str, _cx: &ParseContext<'_>) -> Option<f64> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.timestamp_millis() as f64)
}

/// `YYYY-MM-DD HH:mm[:ss[.sss]][offset]`
fn space_separated(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let mut c = Cursor::new(s);
    let (y, m, d) = calendar_date(&mut c)?;
    if !c.eat(b' ') {
        return None;
    }
    let time = time_of_day(&mut c)?;
    let wall = date_value(y, m, d, time);
    if c.done() {
        return Some(cx.local(wall));
    }
    c.eat(b' ');
    let offset = utc_offset(&mut c)?;
    c.done().then_some(wall - offset)
}

static CLOCK_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,3}))?)?\s*(am|pm)?(?:\s*(z|gmt|utc|(?:gmt|utc)?[+-]\d{2}:?\d{2}))?$",
    )
    .ok()
});

static SLASH_DATE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})/(\d{1,2})/(\d{1,4})(?:[ T]\s*(.+))?$").ok()
});

static MONTH_NAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:sun|mon|tue|wed|thu|fri|sat)[a-z]*\.?,?\s+)?(?:(?P<m1>[a-z]{3,9})\.?\s+(?P<d1>\d{1,2})(?:st|nd|rd|th)?,?\s+(?P<y1>-?\d{4,6})|(?P<d2>\d{1,2})\s+(?P<m2>[a-z]{3,9})\.?,?\s+(?P<y2>-?\d{4,6}))(?:,?\s+(?P<clock>.+))?$",
    )
    .ok()
});

const FULL_MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    FULL_MONTH_NAMES
        .iter()
        .position(|full| full.starts_with(&lower))
        .map(|i| i as u32)
}

/// `H:mm[:ss[.sss]] [AM|PM] [Z|GMT|UTC|±hh[:]mm]` as (ms into day, offset).
fn clock_time(s: &str) -> Option<(f64, Option<f64>)> {
    let caps = CLOCK_RE.as_ref()?.captures(s.trim())?;
    let num = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());
    let mut hour = num(1)?;
    let minute = num(2)?;
    let second = num(3)?;
    let ms = caps
        .get(4)
        .map_or(Some(0), |m| format!("{:0<3}", m.as_str()).parse::<u32>().ok())?;
    if let Some(meridiem) = caps.get(5) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = hour % 12 + if pm { 12 } else { 0 };
    }
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let offset = match caps.get(6) {
        Some(zone) => {
            let lower = zone.as_str().to_ascii_lowercase();
            let rest = lower
                .strip_prefix("gmt")
                .or_else(|| lower.strip_prefix("utc"))
                .unwrap_or(lower.as_str());
            Some(if rest.is_empty() { 0.0 } else { offset_text(rest)? })
        }
        None => None,
    };
    Some((
        make_time(hour as f64, minute as f64, second as f64, ms as f64),
        offset,
    ))
}

/// Resolves a calendar day plus an optional trailing clock reading.
fn resolve(year: i64, month: u32, day_val: u32, clock: Option<&str>, cx: &ParseContext<'_>) -> Option<f64> {
    if month > 11 || !(1..=days_in_month(year as f64, month)).contains(&day_val) {
        return None;
    }
    let date = make_day(year as f64, month as f64, day_val as f64);
    match clock {
        None => Some(cx.local(make_date(date, 0.0))),
        Some(clock) => match clock_time(clock)? {
            (time, Some(offset)) => Some(make_date(date, time) - offset),
            (time, None) => Some(cx.local(make_date(date, time))),
        },
    }
}

/// `YYYY/MM/DD` or US-style `MM/DD/YYYY`, optionally followed by a time.
fn slash_date(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let caps = SLASH_DATE_RE.as_ref()?.captures(s)?;
    let field = |i: usize| caps.get(i).map(|m| m.as_str());
    let (first, second, third) = (field(1)?, field(2)?, field(3)?);
    let (year, month, day_val) = if first.len() == 4 {
        (first, second, third)
    } else if third.len() == 4 {
        (third, first, second)
    } else {
        return None;
    };
    let month: u32 = month.parse().ok()?;
    resolve(
        year.parse().ok()?,
        month.checked_sub(1)?,
        day_val.parse().ok()?,
        field(4),
        cx,
    )
}

/// `June 15, 2023`, `15 Jun 2023 10:00 PM`, `Thursday, June 15th 2023 14:00 UTC`, …
fn month_name_date(s: &str, cx: &ParseContext<'_>) -> Option<f64> {
    let caps = MONTH_NAME_RE.as_ref()?.captures(s)?;
    let named = |a: &str, b: &str, caps: &Captures<'_>| {
        caps.name(a).or_else(|| caps.name(b)).map(|m| m.as_str().to_string())
    };
    let month = month_from_name(&named("m1", "m2", &caps)?)?;
    let day_val: u32 = named("d1", "d2", &caps)?.parse().ok()?;
    let year: i64 = named("y1", "y2", &caps)?.parse().ok()?;
    resolve(year, month, day_val, caps.name("clock").map(|m| m.as_str()), cx)
}
