//! Type conversions the date builtin consumes (§7.1).
//!
//! An embedding engine with a full object model implements [`Coercion`]
//! itself so that user-defined `valueOf`/`toString`/`@@toPrimitive` run;
//! [`StandardCoercion`] covers primitives, wrapper objects and Dates.

use crate::builtins::date::format;
use crate::error::{DateError, DateResult};
use crate::types::{JsString, JsValue};
use crate::zone::HostZone;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

pub trait Coercion {
    // §7.1.1 ToPrimitive(input, preferredType)
    fn to_primitive(&mut self, value: &JsValue, hint: PreferredType) -> DateResult<JsValue>;

    // §7.1.4 ToNumber
    fn to_number(&mut self, value: &JsValue) -> DateResult<f64> {
        let prim = self.to_primitive(value, PreferredType::Number)?;
        primitive_to_number(&prim)
    }

    // §7.1.5 ToIntegerOrInfinity
    fn to_integer(&mut self, value: &JsValue) -> DateResult<f64> {
        Ok(to_integer_or_infinity(self.to_number(value)?))
    }

    // §7.1.17 ToString
    fn to_string(&mut self, value: &JsValue) -> DateResult<String> {
        let prim = self.to_primitive(value, PreferredType::String)?;
        primitive_to_string(&prim)
    }
}

/// Conversions for values without user-observable conversion hooks.
#[derive(Clone, Debug, Default)]
pub struct StandardCoercion {
    zone: HostZone,
}

impl StandardCoercion {
    /// `zone` renders Date objects converted to strings.
    pub fn new(zone: HostZone) -> Self {
        Self { zone }
    }
}

impl Coercion for StandardCoercion {
    fn to_primitive(&mut self, value: &JsValue, hint: PreferredType) -> DateResult<JsValue> {
        let JsValue::Object(obj) = value else {
            return Ok(value.clone());
        };
        // Date.prototype[@@toPrimitive]: "default" behaves like "string"
        if let Some(t) = obj.date_value() {
            return Ok(match hint {
                PreferredType::Number => JsValue::Number(t),
                PreferredType::Default | PreferredType::String => {
                    JsValue::String(JsString::from_str(&format::to_string(t, &self.zone)))
                }
            });
        }
        if let Some(prim) = obj.primitive_value() {
            return Ok(prim.clone());
        }
        // OrdinaryToPrimitive: Object.prototype.valueOf returns the object
        // itself, so both hints end at Object.prototype.toString.
        Ok(JsValue::string("[object Object]"))
    }
}

pub fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc()
    }
}

pub fn primitive_to_number(val: &JsValue) -> DateResult<f64> {
    match val {
        JsValue::Undefined => Ok(f64::NAN),
        JsValue::Null => Ok(0.0),
        JsValue::Boolean(b) => Ok(*b as u8 as f64),
        JsValue::Number(n) => Ok(*n),
        JsValue::String(s) => Ok(string_to_number(s)),
        JsValue::Symbol(_) => Err(DateError::Type(
            "Cannot convert a Symbol value to a number".to_string(),
        )),
        JsValue::BigInt(_) => Err(DateError::Type(
            "Cannot convert a BigInt value to a number".to_string(),
        )),
        JsValue::Object(_) => Err(DateError::Type(
            "Cannot convert object to primitive value".to_string(),
        )),
    }
}

pub fn primitive_to_string(val: &JsValue) -> DateResult<String> {
    match val {
        JsValue::Symbol(_) => Err(DateError::Type(
            "Cannot convert a Symbol value to a string".to_string(),
        )),
        JsValue::BigInt(b) => Ok(b.value.to_string()),
        other => Ok(format!("{other}")),
    }
}

// §7.1.4.1.1 StringToNumber
fn string_to_number(s: &JsString) -> f64 {
    let rust_str = s.to_rust_string();
    let trimmed = rust_str.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return radix_digits_value(&trimmed[2..], radix).unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf", "nan" and friends; StrDecimalLiteral does not.
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Value of a run of digits in `radix`, accumulated in `f64` so wide
/// literals round instead of overflowing. `None` when empty or on a stray
/// character.
pub(crate) fn radix_digits_value(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}
