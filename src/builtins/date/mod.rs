//! The `Date` constructor and its static functions.
//!
//! Every path that produces a time value for a new object funnels through
//! `DateBuiltin::wrap`, which applies `TimeClip`.

mod components;
pub mod format;
mod parse;

pub use format::DateFields;

use tracing::debug;

use crate::coercion::{Coercion, PreferredType, StandardCoercion};
use crate::config::{DateConfig, UtcMode};
use crate::error::DateResult;
use crate::time_value::{Clock, SystemClock, time_clip};
use crate::types::{JsObject, JsValue, ObjectData};
use crate::zone::HostZone;

use parse::ParseContext;

/// The argument shapes `new Date(...)` distinguishes.
#[derive(Clone, Copy, Debug)]
pub enum ConstructionRequest<'a> {
    /// `new Date()`: the current instant.
    Empty,
    /// `new Date(value)`: a string to parse, or a time value.
    Single(&'a JsValue),
    /// `new Date(year, month, ...)`.
    Components(&'a [JsValue]),
}

impl<'a> ConstructionRequest<'a> {
    pub fn from_args(args: &'a [JsValue]) -> Self {
        match args {
            [] => ConstructionRequest::Empty,
            [value] => ConstructionRequest::Single(value),
            _ => ConstructionRequest::Components(args),
        }
    }
}

/// A freshly constructed Date instance. The time value is fixed at
/// construction.
#[derive(Clone, Debug)]
pub struct DateObject {
    time_value: f64,
    prototype: Option<JsObject>,
    extensible: bool,
}

impl DateObject {
    /// The `[[DateValue]]` slot; NaN for an invalid date.
    pub fn time_value(&self) -> f64 {
        self.time_value
    }

    pub fn is_valid(&self) -> bool {
        !self.time_value.is_nan()
    }

    pub fn prototype(&self) -> Option<&JsObject> {
        self.prototype.as_ref()
    }

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Hands the instance to the object model.
    pub fn into_js_value(self) -> JsValue {
        JsValue::Object(JsObject::new(ObjectData {
            class_name: "Date".to_string(),
            prototype: self.prototype,
            extensible: self.extensible,
            primitive_value: Some(JsValue::Number(self.time_value)),
        }))
    }
}

impl From<DateObject> for JsValue {
    fn from(date: DateObject) -> Self {
        date.into_js_value()
    }
}

pub struct DateBuiltin {
    zone: HostZone,
    utc_mode: UtcMode,
    clock: Box<dyn Clock>,
    prototype: Option<JsObject>,
}

impl Default for DateBuiltin {
    fn default() -> Self {
        Self::new(DateConfig::default())
    }
}

impl DateBuiltin {
    pub fn new(config: DateConfig) -> Self {
        Self {
            zone: config.zone,
            utc_mode: config.utc_mode,
            clock: Box::new(SystemClock),
            prototype: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// `Date.prototype`, linked from every constructed instance.
    pub fn with_prototype(mut self, prototype: JsObject) -> Self {
        self.prototype = Some(prototype);
        self
    }

    pub fn zone(&self) -> &HostZone {
        &self.zone
    }

    pub fn utc_mode(&self) -> UtcMode {
        self.utc_mode
    }

    /// Conversions that render Date objects in this builtin's zone.
    pub fn coercion(&self) -> StandardCoercion {
        StandardCoercion::new(self.zone.clone())
    }

    // §21.4.2.1 Date(...values), [[Construct]]
    pub fn construct(
        &self,
        args: &[JsValue],
        coercion: &mut dyn Coercion,
    ) -> DateResult<DateObject> {
        let t = match ConstructionRequest::from_args(args) {
            ConstructionRequest::Empty => self.clock.now_utc_millis(),
            ConstructionRequest::Single(value) => self.single_value(value, coercion)?,
            ConstructionRequest::Components(args) => {
                components::time_value(args, coercion, &self.zone)?
            }
        };
        Ok(self.wrap(t))
    }

    fn single_value(&self, value: &JsValue, coercion: &mut dyn Coercion) -> DateResult<f64> {
        if let JsValue::Object(obj) = value
            && let Some(t) = obj.date_value()
        {
            return Ok(t);
        }
        match coercion.to_primitive(value, PreferredType::Default)? {
            JsValue::String(s) => self.parse_time_value(&s.to_rust_string()),
            prim => coercion.to_number(&prim),
        }
    }

    // §21.4.2.1 Date(...values), [[Call]]: arguments are ignored
    pub fn call(&self) -> String {
        format::to_string(self.now(), &self.zone)
    }

    // §21.4.3.1 Date.now()
    pub fn now(&self) -> f64 {
        time_clip(self.clock.now_utc_millis())
    }

    /// Parses `text` into a new Date, raising a `SyntaxError` when no
    /// accepted format matches.
    pub fn parse(&self, text: &str) -> DateResult<DateObject> {
        Ok(self.wrap(self.parse_time_value(text)?))
    }

    // §21.4.3.2 Date.parse(string)
    pub fn parse_value(&self, value: &JsValue, coercion: &mut dyn Coercion) -> DateResult<f64> {
        let text = coercion.to_string(value)?;
        Ok(time_clip(self.parse_time_value(&text)?))
    }

    fn parse_time_value(&self, text: &str) -> DateResult<f64> {
        let cx = ParseContext {
            zone: &self.zone,
            now: self.clock.now_utc_millis(),
        };
        parse::parse(text, &cx)
    }

    // §21.4.3.4 Date.UTC(year[, month[, date[, hours[, minutes[, seconds[, ms]]]]]])
    pub fn utc(&self, args: &[JsValue], coercion: &mut dyn Coercion) -> DateResult<f64> {
        debug!(mode = %self.utc_mode, "Date.UTC");
        let zone = match self.utc_mode {
            UtcMode::Calendar => HostZone::utc(),
            UtcMode::LocalDelegate => self.zone.clone(),
        };
        Ok(time_clip(components::time_value(args, coercion, &zone)?))
    }

    fn wrap(&self, t: f64) -> DateObject {
        DateObject {
            time_value: time_clip(t),
            prototype: self.prototype.clone(),
            extensible: true,
        }
    }

    pub fn to_string(&self, date: &DateObject) -> String {
        format::to_string(date.time_value, &self.zone)
    }

    pub fn to_date_string(&self, date: &DateObject) -> String {
        format::to_date_string(date.time_value, &self.zone)
    }

    pub fn to_time_string(&self, date: &DateObject) -> String {
        format::to_time_string(date.time_value, &self.zone)
    }

    pub fn to_utc_string(&self, date: &DateObject) -> String {
        format::to_utc_string(date.time_value)
    }

    pub fn to_iso_string(&self, date: &DateObject) -> DateResult<String> {
        format::to_iso_string(date.time_value)
    }

    pub fn local_fields(&self, date: &DateObject) -> Option<DateFields> {
        DateFields::local(date.time_value, &self.zone)
    }

    pub fn utc_fields(&self, date: &DateObject) -> Option<DateFields> {
        DateFields::from_time_value(date.time_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DateError;
    use crate::time_value::{FixedClock, MS_PER_HOUR};
    use crate::types::JsSymbol;

    // 2023-06-15T12:34:56.789Z
    const T: f64 = 1_686_832_496_789.0;
    // 2023-01-01T00:00:00Z
    const NEW_YEAR: f64 = 1_672_531_200_000.0;

    fn builtin(utc_mode: UtcMode) -> DateBuiltin {
        let config = DateConfig::default()
            .with_zone(HostZone::fixed_minutes(120).unwrap())
            .with_utc_mode(utc_mode);
        DateBuiltin::new(config).with_clock(FixedClock(T))
    }

    fn construct(args: &[JsValue]) -> DateResult<DateObject> {
        let date = builtin(UtcMode::Calendar);
        let mut coercion = date.coercion();
        date.construct(args, &mut coercion)
    }

    fn value_of(args: &[JsValue]) -> f64 {
        construct(args).unwrap().time_value()
    }

    #[test]
    fn request_shapes() {
        let args = [JsValue::Number(1.0), JsValue::Number(2.0)];
        assert!(matches!(ConstructionRequest::from_args(&[]), ConstructionRequest::Empty));
        assert!(matches!(
            ConstructionRequest::from_args(&args[..1]),
            ConstructionRequest::Single(JsValue::Number(n)) if *n == 1.0
        ));
        assert!(matches!(
            ConstructionRequest::from_args(&args),
            ConstructionRequest::Components(a) if a.len() == 2
        ));
    }

    #[test]
    fn empty_reads_the_clock() {
        assert_eq!(value_of(&[]), T);
    }

    #[test]
    fn single_number_is_a_time_value() {
        assert_eq!(value_of(&[JsValue::Number(T)]), T);
        assert_eq!(value_of(&[JsValue::Number(1.9)]), 1.0);
        assert_eq!(value_of(&[JsValue::Number(-1.9)]), -1.0);
        assert_eq!(value_of(&[JsValue::Number(8.64e15)]), 8.64e15);
        assert!(value_of(&[JsValue::Number(8.64e15 + 1.0)]).is_nan());
        assert!(value_of(&[JsValue::Number(f64::INFINITY)]).is_nan());
        assert!(value_of(&[JsValue::Undefined]).is_nan());
        assert_eq!(value_of(&[JsValue::Null]), 0.0);
        assert_eq!(value_of(&[JsValue::Boolean(true)]), 1.0);
    }

    #[test]
    fn single_number_skips_two_digit_rule() {
        assert_eq!(value_of(&[JsValue::Number(99.0)]), 99.0);
    }

    #[test]
    fn single_string_is_parsed() {
        assert_eq!(
            value_of(&[JsValue::from("2023-06-15")]),
            1_686_787_200_000.0 - 2.0 * MS_PER_HOUR
        );
        assert!(matches!(
            construct(&[JsValue::from("not-a-date")]),
            Err(DateError::Syntax(_))
        ));
        let boxed = JsValue::Object(JsObject::wrapper("String", JsValue::from("2023-06-15T12:34:56.789Z")));
        assert_eq!(value_of(&[boxed]), T);
    }

    #[test]
    fn single_date_object_copies_its_value() {
        // Going through toString would drop the milliseconds.
        let original = construct(&[JsValue::Number(T)]).unwrap().into_js_value();
        assert_eq!(value_of(&[original]), T);
    }

    #[test]
    fn single_symbol_is_a_type_error() {
        let sym = JsValue::Symbol(JsSymbol {
            id: 7,
            description: Some("when".to_string()),
        });
        assert!(matches!(construct(&[sym]), Err(DateError::Type(_))));
    }

    #[test]
    fn components_are_local_time() {
        let args: Vec<JsValue> = [2023.0, 5.0, 15.0, 14.0, 34.0, 56.0, 789.0]
            .into_iter()
            .map(JsValue::from)
            .collect();
        assert_eq!(value_of(&args), T);
    }

    #[test]
    fn components_clip_and_fault() {
        let day_overflow = [2023.0, 0.0, 1e9].map(JsValue::from);
        assert!(value_of(&day_overflow).is_nan());
        for year in [1e12, 275760.0] {
            assert!(matches!(
                construct(&[JsValue::Number(year), JsValue::Number(0.0)]),
                Err(DateError::Range(_))
            ));
        }
    }

    #[test]
    fn utc_modes() {
        let args = [JsValue::Number(2023.0), JsValue::Number(0.0), JsValue::Number(1.0)];
        let calendar = builtin(UtcMode::Calendar);
        let mut c = calendar.coercion();
        assert_eq!(calendar.utc(&args, &mut c).unwrap(), NEW_YEAR);
        let local = calendar.construct(&args, &mut c).unwrap().time_value();
        assert_eq!(NEW_YEAR - local, 2.0 * MS_PER_HOUR);

        let delegate = builtin(UtcMode::LocalDelegate);
        assert_eq!(delegate.utc(&args, &mut c).unwrap(), local);
    }

    #[test]
    fn utc_argument_counts() {
        let date = builtin(UtcMode::Calendar);
        let mut c = date.coercion();
        assert!(date.utc(&[], &mut c).unwrap().is_nan());
        assert_eq!(date.utc(&[JsValue::Number(2023.0)], &mut c).unwrap(), NEW_YEAR);
        assert_eq!(
            date.utc(&[JsValue::Number(70.0)], &mut c).unwrap(),
            0.0
        );
    }

    #[test]
    fn now_and_call() {
        let date = builtin(UtcMode::Calendar);
        assert_eq!(date.now(), T);
        assert_eq!(date.call(), "Thu Jun 15 2023 14:34:56 GMT+0200 (UTC+02:00)");
    }

    #[test]
    fn parse_entry_points() {
        let date = builtin(UtcMode::Calendar);
        assert_eq!(date.parse("2023-06-15T12:34:56.789Z").unwrap().time_value(), T);
        assert!(matches!(date.parse("soon"), Err(DateError::Syntax(_))));
        let mut c = date.coercion();
        assert_eq!(
            date.parse_value(&JsValue::from("1970-01-01T00:00:00Z"), &mut c).unwrap(),
            0.0
        );
        assert!(date
            .parse_value(&JsValue::from("+275761-01-01T00:00:00Z"), &mut c)
            .unwrap()
            .is_nan());
    }

    #[test]
    fn object_scaffolding() {
        let proto = JsObject::ordinary(None);
        let date = builtin(UtcMode::Calendar).with_prototype(proto.clone());
        let obj = date.parse("2023").unwrap();
        assert!(obj.is_valid());
        assert!(obj.is_extensible());
        assert!(obj.prototype().is_some_and(|p| p.ptr_eq(&proto)));
        let t = obj.time_value();
        let JsValue::Object(handle) = JsValue::from(obj) else {
            panic!("expected an object");
        };
        assert_eq!(handle.date_value(), Some(t));
        assert!(handle.prototype().is_some_and(|p| p.ptr_eq(&proto)));
    }

    #[test]
    fn renderings() {
        let date = builtin(UtcMode::Calendar);
        let obj = date.parse("2023-06-15T12:34:56.789Z").unwrap();
        assert_eq!(date.to_string(&obj), "Thu Jun 15 2023 14:34:56 GMT+0200 (UTC+02:00)");
        assert_eq!(date.to_date_string(&obj), "Thu Jun 15 2023");
        assert_eq!(date.to_time_string(&obj), "14:34:56 GMT+0200 (UTC+02:00)");
        assert_eq!(date.to_utc_string(&obj), "Thu, 15 Jun 2023 12:34:56 GMT");
        assert_eq!(date.to_iso_string(&obj).unwrap(), "2023-06-15T12:34:56.789Z");
        assert_eq!(date.local_fields(&obj).map(|f| f.hour), Some(14));
        assert_eq!(date.utc_fields(&obj).map(|f| f.hour), Some(12));

        let invalid = date.construct(&[JsValue::Number(f64::NAN)], &mut date.coercion()).unwrap();
        assert!(!invalid.is_valid());
        assert_eq!(date.to_string(&invalid), "Invalid Date");
        assert!(matches!(date.to_iso_string(&invalid), Err(DateError::Range(_))));
        assert_eq!(date.local_fields(&invalid), None);
    }
}
