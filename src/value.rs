//! Decoded value tree.
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Candidate produced by the decoder, mirroring the schema's shape.
///
/// Unlike `serde_json::Value` this keeps the distinctions a form decoder
/// needs before validation: absence vs null, NaN, invalid dates.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(Option<DateTime<Utc>>), // None: unparseable date
    BigInt(BigInt),
    Array(Vec<FormValue>),
    Object(IndexMap<String, FormValue>),
}

impl FormValue {
    /// Type name as reported in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FormValue::Undefined => "undefined",
            FormValue::Null => "null",
            FormValue::Bool(_) => "boolean",
            FormValue::Number(n) if n.is_nan() => "nan",
            FormValue::Number(_) => "number",
            FormValue::String(_) => "string",
            FormValue::Date(_) => "date",
            FormValue::BigInt(_) => "bigint",
            FormValue::Array(_) => "array",
            FormValue::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, FormValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, FormValue>> {
        match self {
            FormValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON view used for typed output and printing.
    ///
    /// - `Undefined` fields are dropped from objects; in arrays they become `null`.
    /// - Non-finite numbers and invalid dates become `null`.
    /// - Integral numbers are emitted as JSON integers.
    /// - Dates are RFC 3339 strings; bigints are integers when they fit 64 bits,
    ///   decimal strings otherwise.
    pub fn to_json(&self) -> Value {
        match self {
            FormValue::Undefined | FormValue::Null => Value::Null,
            FormValue::Bool(b) => Value::Bool(*b),
            FormValue::Number(n) => number_to_json(*n),
            FormValue::String(s) => Value::String(s.clone()),
            FormValue::Date(Some(date)) => {
                Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FormValue::Date(None) => Value::Null,
            FormValue::BigInt(big) => bigint_to_json(big),
            FormValue::Array(items) => Value::Array(items.iter().map(FormValue::to_json).collect()),
            FormValue::Object(fields) => {
                let mut map = Map::new();
                for (key, value) in fields {
                    if !value.is_undefined() {
                        map.insert(key.clone(), value.to_json());
                    }
                }
                Value::Object(map)
            }
        }
    }

    /// Lift an already structured JSON document. Numbers become `f64`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FormValue::Null,
            Value::Bool(b) => FormValue::Bool(*b),
            Value::Number(n) => FormValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => FormValue::String(s.clone()),
            Value::Array(items) => FormValue::Array(items.iter().map(FormValue::from_json).collect()),
            Value::Object(map) => FormValue::Object(
                map.iter().map(|(k, v)| (k.clone(), FormValue::from_json(v))).collect(),
            ),
        }
    }
}

fn number_to_json(n: f64) -> Value {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&n) && !(n == 0.0 && n.is_sign_negative()) {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn bigint_to_json(big: &BigInt) -> Value {
    if let Ok(i) = i64::try_from(big) {
        Value::Number(i.into())
    } else if let Ok(u) = u64::try_from(big) {
        Value::Number(u.into())
    } else {
        Value::String(big.to_string())
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::String(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::String(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}
