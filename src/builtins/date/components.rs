//! `new Date(year, month[, day[, hours[, minutes[, seconds[, ms]]]]])`.

use tracing::debug;

use crate::coercion::{Coercion, to_integer_or_infinity};
use crate::error::DateResult;
use crate::time_value::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, from_calendar};
use crate::types::JsValue;
use crate::zone::HostZone;

/// Coerced constructor arguments. `year` keeps its numeric form; every
/// other field is already an integer (or ±∞).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Components {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
    pub millisecond: f64,
}

impl Components {
    /// Coerces every argument left to right. Returns `None` when any of
    /// day..ms is NaN, in which case no calendar arithmetic may happen.
    pub fn coerce(args: &[JsValue], coercion: &mut dyn Coercion) -> DateResult<Option<Self>> {
        let year = match args.first() {
            Some(v) => coercion.to_number(v)?,
            None => f64::NAN,
        };
        let month = match args.get(1) {
            Some(v) => coercion.to_integer(v)?,
            None => 0.0,
        };
        let mut rest = [1.0, 0.0, 0.0, 0.0, 0.0];
        for (slot, arg) in rest.iter_mut().zip(args.iter().skip(2)) {
            *slot = coercion.to_number(arg)?;
        }
        if rest.iter().any(|n| n.is_nan()) {
            return Ok(None);
        }
        let [day, hour, minute, second, millisecond] = rest.map(to_integer_or_infinity);
        Ok(Some(Components {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
        }))
    }

    /// Unclipped time value of these components read as wall-clock time in
    /// `zone`.
    pub fn time_value(&self, zone: &HostZone) -> DateResult<f64> {
        let year = promote_two_digit_year(self.year);
        if !year.is_finite() || !self.month.is_finite() {
            return Ok(f64::NAN);
        }
        let (year, month) = normalize_month(year, self.month);
        let base = from_calendar(year.trunc(), month as u32 + 1, 1, zone).inspect_err(|e| {
            debug!(year, month, error = %e, "host calendar rejected date components");
        })?;
        Ok(base
            + self.millisecond
            + self.second * MS_PER_SECOND
            + self.minute * MS_PER_MINUTE
            + self.hour * MS_PER_HOUR
            + (self.day - 1.0) * MS_PER_DAY)
    }
}

/// Unclipped time value for a component argument list interpreted in `zone`.
pub(super) fn time_value(
    args: &[JsValue],
    coercion: &mut dyn Coercion,
    zone: &HostZone,
) -> DateResult<f64> {
    match Components::coerce(args, coercion)? {
        Some(components) => components.time_value(zone),
        None => Ok(f64::NAN),
    }
}

/// Years 0..=99 (after truncation) mean 1900..=1999.
pub(super) fn promote_two_digit_year(year: f64) -> f64 {
    if year.is_nan() {
        return year;
    }
    let truncated = year.trunc();
    if (0.0..=99.0).contains(&truncated) {
        1900.0 + truncated
    } else {
        year
    }
}

/// Folds an unbounded month index into `(year, 0..12)`, flooring so that
/// negative months land in earlier years.
pub(super) fn normalize_month(year: f64, month: f64) -> (f64, f64) {
    (year + (month / 12.0).floor(), month.rem_euclid(12.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::StandardCoercion;
    use crate::error::DateError;

    fn args(values: &[f64]) -> Vec<JsValue> {
        values.iter().map(|&n| JsValue::Number(n)).collect()
    }

    fn utc_value(values: &[f64]) -> DateResult<f64> {
        time_value(&args(values), &mut StandardCoercion::default(), &HostZone::utc())
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(promote_two_digit_year(99.0), 1999.0);
        assert_eq!(promote_two_digit_year(0.0), 1900.0);
        assert_eq!(promote_two_digit_year(99.7), 1999.0);
        assert_eq!(promote_two_digit_year(-0.5), 1900.0);
        assert_eq!(promote_two_digit_year(100.0), 100.0);
        assert_eq!(promote_two_digit_year(-1.0), -1.0);
        assert!(promote_two_digit_year(f64::NAN).is_nan());
    }

    #[test]
    fn month_normalization() {
        assert_eq!(normalize_month(2023.0, 14.0), (2024.0, 2.0));
        assert_eq!(normalize_month(2023.0, -1.0), (2022.0, 11.0));
        assert_eq!(normalize_month(2023.0, -12.0), (2022.0, 0.0));
        assert_eq!(normalize_month(2023.0, 11.0), (2023.0, 11.0));
    }

    #[test]
    fn defaults_for_missing_arguments() {
        assert_eq!(utc_value(&[2023.0, 5.0]).unwrap(), 1_685_577_600_000.0);
        assert_eq!(
            utc_value(&[2023.0, 5.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap(),
            1_685_577_600_000.0
        );
    }

    #[test]
    fn all_fields_contribute() {
        assert_eq!(
            utc_value(&[2023.0, 5.0, 15.0, 12.0, 34.0, 56.0, 789.0]).unwrap(),
            1_686_832_496_789.0
        );
    }

    #[test]
    fn day_overflow_spills_into_next_month() {
        assert_eq!(
            utc_value(&[2023.0, 0.0, 32.0]).unwrap(),
            utc_value(&[2023.0, 1.0, 1.0]).unwrap()
        );
        assert_eq!(
            utc_value(&[2023.0, 0.0, 0.0]).unwrap(),
            utc_value(&[2022.0, 11.0, 31.0]).unwrap()
        );
    }

    #[test]
    fn nan_beyond_month_short_circuits() {
        for i in 2..7 {
            let mut values = vec![2023.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
            values[i] = f64::NAN;
            assert!(utc_value(&values).unwrap().is_nan(), "argument {i}");
        }
        // Short-circuits even when the year alone would be a range fault.
        assert!(utc_value(&[1e12, 0.0, f64::NAN]).unwrap().is_nan());
    }

    #[test]
    fn nan_month_is_zero() {
        assert_eq!(
            utc_value(&[2023.0, f64::NAN]).unwrap(),
            utc_value(&[2023.0, 0.0]).unwrap()
        );
    }

    #[test]
    fn non_finite_year_or_month_is_invalid() {
        assert!(utc_value(&[f64::NAN, 0.0]).unwrap().is_nan());
        assert!(utc_value(&[f64::INFINITY, 0.0]).unwrap().is_nan());
        assert!(utc_value(&[2023.0, f64::NEG_INFINITY]).unwrap().is_nan());
    }

    #[test]
    fn infinite_offsets_are_not_finite() {
        assert!(!utc_value(&[2023.0, 0.0, f64::INFINITY]).unwrap().is_finite());
    }

    #[test]
    fn fractional_arguments_truncate() {
        assert_eq!(
            utc_value(&[2023.9, 5.9, 15.9, 12.9, 34.9, 56.9, 789.9]).unwrap(),
            1_686_832_496_789.0
        );
    }

    #[test]
    fn unrepresentable_year_is_a_range_fault() {
        assert!(matches!(
            utc_value(&[1e12, 0.0]),
            Err(DateError::Range(_))
        ));
    }

    #[test]
    fn local_zone_shifts_result() {
        let zone = HostZone::fixed_minutes(-300).unwrap();
        let local = time_value(
            &args(&[2023.0, 0.0, 1.0]),
            &mut StandardCoercion::default(),
            &zone,
        )
        .unwrap();
        assert_eq!(local - utc_value(&[2023.0, 0.0, 1.0]).unwrap(), 5.0 * MS_PER_HOUR);
    }
}
