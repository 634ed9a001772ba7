use chrono::Utc;
use chrono_tz::Europe;
use proptest::prelude::*;

use esdate::repl::Session;
use esdate::{
    DateBuiltin, DateConfig, DateError, FixedClock, HostZone, JsValue, UtcMode, time_clip,
};

// 2023-06-15T12:34:56.789Z
const T: f64 = 1_686_832_496_789.0;
const MS_PER_MINUTE: f64 = 60_000.0;

fn builtin(offset_minutes: i32, utc_mode: UtcMode) -> DateBuiltin {
    let config = DateConfig::default()
        .with_zone(HostZone::fixed_minutes(offset_minutes).unwrap())
        .with_utc_mode(utc_mode);
    DateBuiltin::new(config).with_clock(FixedClock(T))
}

fn numbers(values: &[f64]) -> Vec<JsValue> {
    values.iter().copied().map(JsValue::from).collect()
}

fn construct(date: &DateBuiltin, values: &[f64]) -> Result<f64, DateError> {
    let mut coercion = date.coercion();
    date.construct(&numbers(values), &mut coercion)
        .map(|d| d.time_value())
}

fn utc(date: &DateBuiltin, values: &[f64]) -> f64 {
    let mut coercion = date.coercion();
    date.utc(&numbers(values), &mut coercion).unwrap()
}

#[test]
fn time_clip_boundaries() {
    assert!(time_clip(f64::NAN).is_nan());
    assert!(time_clip(f64::INFINITY).is_nan());
    assert!(time_clip(f64::NEG_INFINITY).is_nan());
    assert!(time_clip(8_640_000_000_000_001.0).is_nan());
    assert_eq!(time_clip(8_640_000_000_000_000.0), 8_640_000_000_000_000.0);
    assert_eq!(time_clip(-8_640_000_000_000_000.0), -8_640_000_000_000_000.0);
    assert!(time_clip(-0.0).is_sign_positive());
}

#[test]
fn two_digit_years_only_in_component_form() {
    let date = builtin(0, UtcMode::Calendar);
    assert_eq!(
        construct(&date, &[99.0, 0.0]).unwrap(),
        construct(&date, &[1999.0, 0.0]).unwrap()
    );
    // Year 100 is taken literally.
    assert_eq!(construct(&date, &[100.0, 0.0]).unwrap(), -59_011_459_200_000.0);
    assert_eq!(construct(&date, &[99.0]).unwrap(), 99.0);
}

#[test]
fn month_overflow_rolls_into_adjacent_years() {
    let date = builtin(60, UtcMode::Calendar);
    assert_eq!(
        construct(&date, &[2023.0, 14.0]).unwrap(),
        construct(&date, &[2024.0, 2.0]).unwrap()
    );
    assert_eq!(
        construct(&date, &[2023.0, -1.0]).unwrap(),
        construct(&date, &[2022.0, 11.0]).unwrap()
    );
}

#[test]
fn nan_components_give_invalid_dates() {
    let date = builtin(0, UtcMode::Calendar);
    for i in 2..7 {
        let mut values = vec![2023.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        values[i] = f64::NAN;
        let t = construct(&date, &values).unwrap();
        assert!(t.is_nan(), "NaN at position {i}");
    }
}

#[test]
fn parse_date_only_is_local_midnight() {
    let date = builtin(-300, UtcMode::Calendar);
    let parsed = date.parse("2023-06-15").unwrap().time_value();
    let local_midnight = construct(&date, &[2023.0, 5.0, 15.0]).unwrap();
    assert_eq!(parsed, local_midnight);
    assert_eq!(parsed, 1_686_787_200_000.0 + 300.0 * MS_PER_MINUTE);
    assert!(matches!(date.parse("not-a-date"), Err(DateError::Syntax(_))));
}

#[test]
fn now_tracks_the_system_clock() {
    let date = DateBuiltin::default();
    let before = Utc::now().timestamp_millis() as f64;
    let now = date.now();
    let after = Utc::now().timestamp_millis() as f64;
    assert!(before <= now && now <= after, "{before} <= {now} <= {after}");
}

#[test]
fn utc_differs_from_local_construction_by_the_offset() {
    for minutes in [-600, -300, 0, 60, 330, 540] {
        let date = builtin(minutes, UtcMode::Calendar);
        let local = construct(&date, &[2023.0, 0.0, 1.0]).unwrap();
        assert_eq!(
            utc(&date, &[2023.0, 0.0, 1.0]) - local,
            minutes as f64 * MS_PER_MINUTE,
            "offset {minutes}"
        );
    }
}

#[test]
fn skipped_local_times_resolve_after_the_transition() {
    let config = DateConfig::default().with_zone(HostZone::Named(Europe::Berlin));
    let date = DateBuiltin::new(config).with_clock(FixedClock(T));
    let parsed = date.parse("2023-03-26T02:30").unwrap();
    assert_eq!(parsed.time_value(), utc(&date, &[2023.0, 2.0, 26.0, 1.0, 30.0]));
    assert_eq!(
        date.to_string(&parsed),
        "Sun Mar 26 2023 03:30:00 GMT+0200 (Europe/Berlin)"
    );
}

#[test]
fn local_delegate_utc_matches_local_construction() {
    let date = builtin(330, UtcMode::LocalDelegate);
    assert_eq!(
        utc(&date, &[2023.0, 0.0, 1.0]),
        construct(&date, &[2023.0, 0.0, 1.0]).unwrap()
    );
    let in_utc = builtin(0, UtcMode::LocalDelegate);
    let calendar = builtin(0, UtcMode::Calendar);
    assert_eq!(utc(&in_utc, &[2023.0, 0.0, 1.0]), utc(&calendar, &[2023.0, 0.0, 1.0]));
}

#[test]
fn session_evaluates_lines() {
    let config = DateConfig::default().with_zone(HostZone::utc());
    let mut session = Session::new(DateBuiltin::new(config).with_clock(FixedClock(T)));
    assert_eq!(
        session.eval_line("new Date(2023, 5, 15, 12, 34, 56, 789)").unwrap().as_deref(),
        Some("Thu Jun 15 2023 12:34:56 GMT+0000 (UTC)")
    );
    assert_eq!(
        session.eval_line("Date.parse('Thu Jun 15 2023 12:34:56 GMT+0000 (UTC)')").unwrap().as_deref(),
        Some("1686832496000")
    );
    assert_eq!(session.eval_line("").unwrap(), None);
    assert_eq!(
        session.eval_line("new Date('2023-13-01')").unwrap_err().to_string(),
        "SyntaxError: Invalid date string: \"2023-13-01\""
    );
}

proptest! {
    #[test]
    fn time_clip_is_idempotent_and_integral(x in any::<f64>()) {
        let once = time_clip(x);
        prop_assert!(once.is_nan() || once.fract() == 0.0);
        let twice = time_clip(once);
        prop_assert!(once.to_bits() == twice.to_bits() || (once.is_nan() && twice.is_nan()));
    }

    #[test]
    fn single_number_round_trips(t in -8_640_000_000_000_000i64..=8_640_000_000_000_000i64) {
        let date = builtin(0, UtcMode::Calendar);
        let t = t as f64;
        prop_assert_eq!(construct(&date, &[t]).unwrap(), t);
    }

    #[test]
    fn iso_string_round_trips(t in -8_640_000_000_000_000i64..=8_640_000_000_000_000i64) {
        let date = builtin(120, UtcMode::Calendar);
        let t = t as f64;
        let obj = date.construct(&[JsValue::Number(t)], &mut date.coercion()).unwrap();
        let iso = date.to_iso_string(&obj).unwrap();
        prop_assert_eq!(date.parse(&iso).unwrap().time_value(), t);
    }

    #[test]
    fn to_string_round_trips_to_the_second(
        t in -8_600_000_000_000_000i64..=8_600_000_000_000_000i64,
        minutes in -720i32..=840,
    ) {
        let date = builtin(minutes, UtcMode::Calendar);
        let t = t as f64;
        let obj = date.construct(&[JsValue::Number(t)], &mut date.coercion()).unwrap();
        let text = date.to_string(&obj);
        prop_assert_eq!(date.parse(&text).unwrap().time_value(), t - t.rem_euclid(1000.0));
    }

    #[test]
    fn utc_fields_rebuild_the_time_value(t in -6_000_000_000_000_000i64..=6_000_000_000_000_000i64) {
        let date = builtin(0, UtcMode::Calendar);
        let obj = date.construct(&[JsValue::Number(t as f64)], &mut date.coercion()).unwrap();
        let f = date.utc_fields(&obj).unwrap();
        prop_assume!(!(0..=99).contains(&f.year));
        let rebuilt = utc(&date, &[
            f.year as f64,
            f.month as f64,
            f.day as f64,
            f.hour as f64,
            f.minute as f64,
            f.second as f64,
            f.millisecond as f64,
        ]);
        prop_assert_eq!(rebuilt, t as f64);
    }
}
