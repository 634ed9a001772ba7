use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

#[derive(Clone, Debug)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Symbol(JsSymbol),
    BigInt(JsBigInt),
    Object(JsObject),
}

// UTF-16 code unit string, as in ECMA-262 §6.1.4
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsString {
    pub code_units: Vec<u16>,
}

impl JsString {
    pub fn from_str(s: &str) -> Self {
        Self {
            code_units: s.encode_utf16().collect(),
        }
    }

    pub fn to_rust_string(&self) -> String {
        String::from_utf16_lossy(&self.code_units)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rust_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsSymbol {
    pub id: u64,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsBigInt {
    pub value: BigInt,
}

/// Handle to a heap object. Only what the date builtin needs from the
/// object model is modelled: a class name, a prototype link, the
/// extensible flag and one internal primitive slot (`[[DateValue]]`,
/// `[[NumberData]]`, …).
#[derive(Clone, Debug)]
pub struct JsObject(Rc<ObjectData>);

#[derive(Debug)]
pub struct ObjectData {
    pub class_name: String,
    pub prototype: Option<JsObject>,
    pub extensible: bool,
    pub primitive_value: Option<JsValue>,
}

impl JsObject {
    pub fn new(data: ObjectData) -> Self {
        JsObject(Rc::new(data))
    }

    /// A plain `{}` with the given prototype.
    pub fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::new(ObjectData {
            class_name: "Object".to_string(),
            prototype,
            extensible: true,
            primitive_value: None,
        })
    }

    /// A primitive wrapper such as `new Number(5)` or `new String("x")`.
    pub fn wrapper(class_name: &str, value: JsValue) -> Self {
        Self::new(ObjectData {
            class_name: class_name.to_string(),
            prototype: None,
            extensible: true,
            primitive_value: Some(value),
        })
    }

    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }

    pub fn prototype(&self) -> Option<&JsObject> {
        self.0.prototype.as_ref()
    }

    pub fn is_extensible(&self) -> bool {
        self.0.extensible
    }

    pub fn primitive_value(&self) -> Option<&JsValue> {
        self.0.primitive_value.as_ref()
    }

    /// The `[[DateValue]]` slot, if this is a Date instance.
    pub fn date_value(&self) -> Option<f64> {
        match (self.class_name(), self.primitive_value()) {
            ("Date", Some(JsValue::Number(t))) => Some(*t),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn string(s: &str) -> Self {
        JsValue::String(JsString::from_str(s))
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::string(s)
    }
}

// §6.1.6.1 Number type operations
pub mod number_ops {
    // §6.1.6.1.20 Number::toString(x, 10)
    pub fn to_string(x: f64) -> String {
        if x.is_nan() {
            return "NaN".to_string();
        }
        if x == 0.0 {
            return "0".to_string();
        }
        if x.is_infinite() {
            return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
        }
        // Shortest round-trip representation via ryu-js
        let mut buf = ryu_js::Buffer::new();
        buf.format(x).to_string()
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{b}"),
            JsValue::Number(n) => write!(f, "{}", number_ops::to_string(*n)),
            JsValue::String(s) => write!(f, "{s}"),
            JsValue::Symbol(s) => {
                if let Some(desc) = &s.description {
                    write!(f, "Symbol({desc})")
                } else {
                    write!(f, "Symbol()")
                }
            }
            JsValue::BigInt(b) => write!(f, "{}n", b.value),
            JsValue::Object(_) => write!(f, "[object Object]"),
        }
    }
}
