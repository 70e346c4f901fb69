//! Dynamic value representation walked by the reflective encoder.
//!
//! [`Value`] is a closed set of shape categories: null, boolean, number,
//! complex, string, sequence, mapping, record and timestamp. Any
//! `T: Serialize` can be turned into a `Value` with [`to_value`](crate::to_value),
//! which is how the reflective encoder "reflects" over arbitrary Rust data.
//!
//! ## Mapping vs. record
//!
//! Both hold a [`ValueMap`], but they render differently: a mapping's keys are
//! sorted on output, a record's fields keep declaration order and `Null`
//! fields are left out.
//!
//! ```rust
//! use serde_logtext::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { y: i32, x: i32 }
//!
//! let value = to_value(&Point { y: 2, x: 1 }).unwrap();
//! assert!(value.is_record());
//! if let Value::Record(fields) = value {
//!     let names: Vec<_> = fields.keys().cloned().collect();
//!     assert_eq!(names, vec!["y", "x"]);
//! }
//! ```

use crate::ValueMap;
use chrono::{DateTime, SecondsFormat, Utc};
use num_complex::{Complex32, Complex64};
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// Newtype-struct name used to carry a record through `Serialize`.
///
/// Foreign serializers see a transparent map; [`ValueSerializer`](crate::ser::ValueSerializer)
/// recognises the name and rebuilds a [`Value::Record`].
pub(crate) const RECORD_TOKEN: &str = "$serde_logtext::Record";

/// A dynamically-typed value with explicit category tags.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Complex(Complex64),
    String(String),
    Seq(Vec<Value>),
    Map(ValueMap),
    Record(ValueMap),
    Time(DateTime<Utc>),
}

/// A numeric value, keeping its native width where it affects formatting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Uint(u64),
    Float(f64),
    Float32(f32),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_) | Number::Uint(_))
    }

    /// Converts to `i64` when the value is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Uint(u) => i64::try_from(u).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::Float(f) => f,
            Number::Float32(f) => f as f64,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Uint(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{}", fl),
            Number::Float32(fl) => write!(f, "{}", fl),
        }
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_seq(&self) -> bool {
        matches!(self, Value::Seq(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Short category name, used in error messages.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Complex(_) => "complex",
            Value::String(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
            Value::Record(_) => "record",
            Value::Time(_) => "time",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_seq(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a mapping or a record.
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) | Value::Record(map) => Some(map),
            _ => None,
        }
    }
}

struct RecordFields<'a>(&'a ValueMap);

impl Serialize for RecordFields<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Uint(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::Number(Number::Float32(f)) => serializer.serialize_f32(*f),
            Value::Complex(c) => {
                let mut s = serializer.serialize_struct("Complex", 2)?;
                s.serialize_field("real", &c.re)?;
                s.serialize_field("imag", &c.im)?;
                s.end()
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => RecordFields(map).serialize(serializer),
            Value::Record(fields) => {
                serializer.serialize_newtype_struct(RECORD_TOKEN, &RecordFields(fields))
            }
            Value::Time(t) => serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_int {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::$variant(value as $target))
                }
            }
        )*
    };
}

from_int! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    usize => Uint as u64,
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Float32(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Value::Complex(value)
    }
}

impl From<Complex32> for Value {
    fn from(value: Complex32) -> Self {
        Value::Complex(Complex64::new(value.re as f64, value.im as f64))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Seq(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
