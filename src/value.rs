use std::collections::HashMap;

use chrono::{DateTime, Utc};
use derive_more::From;
use serde::Serialize;

/// A dynamically typed flag or attribute value.
///
/// This is the value model of the feature-flag abstraction layer: context attributes are
/// expressed with it and object evaluations return it.
///
/// Conveniently implements `From` conversions for the wrapped types.
///
/// ```
/// # use featbit_openfeature::Value;
/// let s: Value = "us".into();
/// let n: Value = 42i64.into();
/// let b: Value = true.into();
/// assert_eq!(s.as_str(), Some("us"));
/// assert_eq!(n.as_integer(), Some(42));
/// assert_eq!(b.as_boolean(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, From, Default)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A whole number.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string value.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// An immutable string-keyed structure.
    Structure(Structure),
    /// A point in time.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Short name of the value kind, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Structure(_) => "structure",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Returns `true` if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a string.
    pub fn is_string(&self) -> bool {
        self.as_str().is_some()
    }
    /// Returns the string value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the value is a boolean.
    pub fn is_boolean(&self) -> bool {
        self.as_boolean().is_some()
    }
    /// Returns the boolean value, if any.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` if the value is an integer.
    pub fn is_integer(&self) -> bool {
        self.as_integer().is_some()
    }
    /// Returns the integer value, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `true` if the value is a floating-point number.
    pub fn is_double(&self) -> bool {
        matches!(self, Value::Float(_))
    }
    /// Returns the numeric value as `f64`. Integers are widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns `true` if the value is a list.
    pub fn is_list(&self) -> bool {
        self.as_list().is_some()
    }
    /// Returns the list elements, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns `true` if the value is a structure.
    pub fn is_structure(&self) -> bool {
        self.as_structure().is_some()
    }
    /// Returns the structure, if any.
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp, if any.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(value: HashMap<String, Value>) -> Self {
        Self::Structure(Structure::from(value))
    }
}

/// An immutable mapping from string keys to [`Value`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Structure(HashMap<String, Value>);

impl Structure {
    /// Create an empty structure.
    pub fn new() -> Structure {
        Structure::default()
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the structure has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the entries as a map.
    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.0
    }

    /// Take the entries out as a map.
    pub fn into_map(self) -> HashMap<String, Value> {
        self.0
    }
}

impl From<HashMap<String, Value>> for Structure {
    fn from(value: HashMap<String, Value>) -> Self {
        Structure(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Structure {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Structure(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
