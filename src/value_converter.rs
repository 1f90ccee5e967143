//! Conversion between raw flag values (as served by the FeatBit client) and [`Value`].
//!
//! Conversion into `Value` is total: anything without a counterpart becomes [`Value::Null`].
//! Whole numbers that fit in `i64` become [`Value::Int`], so callers reading integer flags don't
//! have to deal with `200.0`.
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Structure, Value};

/// A raw value that can be converted into a [`Value`].
pub trait RawValue {
    /// Convert into a [`Value`]. Never fails.
    fn to_value(&self) -> Value;
}

/// Convert a raw value into a [`Value`].
///
/// ```
/// # use featbit_openfeature::{value_converter::to_value, Value};
/// let value = to_value(&serde_json::json!({"code": 200, "ratio": 0.5}));
/// let code = value.as_structure().and_then(|s| s.get("code")).cloned();
/// assert_eq!(code, Some(Value::Int(200)));
/// ```
pub fn to_value<R: RawValue + ?Sized>(raw: &R) -> Value {
    raw.to_value()
}

fn number_to_value(n: f64) -> Value {
    // `i64::MAX as f64` rounds up to 2^63, which is out of range, hence the strict upper bound.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}

impl RawValue for serde_json::Value {
    fn to_value(&self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, number_to_value),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => items.as_slice().to_value(),
            serde_json::Value::Object(map) => Value::Structure(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Structure>(),
            ),
        }
    }
}

impl RawValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl RawValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl RawValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! integer_raw_value {
    ($($t:ty),*) => {
        $(
            impl RawValue for $t {
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Float(*self as f64),
                    }
                }
            }
        )*
    };
}

integer_raw_value!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl RawValue for f32 {
    fn to_value(&self) -> Value {
        number_to_value(f64::from(*self))
    }
}

impl RawValue for f64 {
    fn to_value(&self) -> Value {
        number_to_value(*self)
    }
}

impl RawValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl RawValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: RawValue + ?Sized> RawValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: RawValue> RawValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, RawValue::to_value)
    }
}

impl<T: RawValue> RawValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(RawValue::to_value).collect())
    }
}

impl<T: RawValue> RawValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: Display, V: RawValue, S> RawValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Structure(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_value()))
                .collect::<Structure>(),
        )
    }
}

impl<K: Display, V: RawValue> RawValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Structure(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_value()))
                .collect::<Structure>(),
        )
    }
}

/// JSON form of a value, used to pass list and structure defaults to the client.
///
/// Timestamps become RFC 3339 strings; non-finite floats become `null`.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Structure(s) => serde_json::Value::Object(
                s.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}
