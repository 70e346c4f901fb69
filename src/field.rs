//! Typed log fields.
//!
//! A [`Field`] pairs a key with a [`FieldValue`], a closed set of value kinds a
//! logging call can attach. Fields do not know how they are rendered; they
//! dispatch to whatever [`ObjectEncoder`] or [`ArrayEncoder`] they are given.
//!
//! ```rust
//! use serde_logtext::{Field, FieldValue};
//!
//! let fields = vec![
//!     Field::string("user", "bob"),
//!     Field::int64("attempt", 3),
//!     Field::array_of("ids", [1u32, 2, 3]),
//!     Field::new("ok", true),
//! ];
//! assert!(matches!(fields[3].value, FieldValue::Bool(true)));
//! ```

use crate::encoder::{ArrayEncoder, ArrayMarshaler, ObjectEncoder, ObjectMarshaler};
use crate::{to_value, Result, Value};
use chrono::{DateTime, TimeDelta, Utc};
use num_complex::{Complex32, Complex64};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The value half of a [`Field`].
#[derive(Clone)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(f64),
    Float32(f32),
    Complex64(Complex64),
    Complex32(Complex32),
    String(String),
    /// Opaque bytes, rendered as base64.
    Binary(Vec<u8>),
    /// UTF-8 text held as bytes.
    ByteString(Vec<u8>),
    Duration(TimeDelta),
    Time(DateTime<Utc>),
    Array(Vec<FieldValue>),
    Object(Vec<Field>),
    ArrayMarshaler(Arc<dyn ArrayMarshaler + Send + Sync>),
    ObjectMarshaler(Arc<dyn ObjectMarshaler + Send + Sync>),
    Reflected(Value),
    Namespace,
}

/// A keyed log field.
#[derive(Clone, Debug)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Field {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn bool(key: impl Into<String>, v: bool) -> Self {
        Field::new(key, FieldValue::Bool(v))
    }

    pub fn int64(key: impl Into<String>, v: i64) -> Self {
        Field::new(key, FieldValue::Int(v))
    }

    pub fn uint64(key: impl Into<String>, v: u64) -> Self {
        Field::new(key, FieldValue::Uint(v))
    }

    pub fn float64(key: impl Into<String>, v: f64) -> Self {
        Field::new(key, FieldValue::Float64(v))
    }

    pub fn float32(key: impl Into<String>, v: f32) -> Self {
        Field::new(key, FieldValue::Float32(v))
    }

    pub fn complex64(key: impl Into<String>, v: Complex64) -> Self {
        Field::new(key, FieldValue::Complex64(v))
    }

    pub fn complex32(key: impl Into<String>, v: Complex32) -> Self {
        Field::new(key, FieldValue::Complex32(v))
    }

    pub fn string(key: impl Into<String>, v: impl Into<String>) -> Self {
        Field::new(key, FieldValue::String(v.into()))
    }

    pub fn binary(key: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Field::new(key, FieldValue::Binary(v.into()))
    }

    pub fn byte_string(key: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Field::new(key, FieldValue::ByteString(v.into()))
    }

    pub fn duration(key: impl Into<String>, v: TimeDelta) -> Self {
        Field::new(key, FieldValue::Duration(v))
    }

    pub fn time(key: impl Into<String>, v: DateTime<Utc>) -> Self {
        Field::new(key, FieldValue::Time(v))
    }

    /// An array built from a homogeneous collection.
    pub fn array_of<I, T>(key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldValue>,
    {
        Field::new(
            key,
            FieldValue::Array(items.into_iter().map(Into::into).collect()),
        )
    }

    /// An array written by a caller-supplied marshaler.
    pub fn array<M>(key: impl Into<String>, marshaler: M) -> Self
    where
        M: ArrayMarshaler + Send + Sync + 'static,
    {
        Field::new(key, FieldValue::ArrayMarshaler(Arc::new(marshaler)))
    }

    /// An object written by a caller-supplied marshaler.
    pub fn object<M>(key: impl Into<String>, marshaler: M) -> Self
    where
        M: ObjectMarshaler + Send + Sync + 'static,
    {
        Field::new(key, FieldValue::ObjectMarshaler(Arc::new(marshaler)))
    }

    /// An object made of the given fields.
    pub fn nested(key: impl Into<String>, fields: Vec<Field>) -> Self {
        Field::new(key, FieldValue::Object(fields))
    }

    /// Captures any serializable value for the reflective encoder.
    ///
    /// Fails when the value cannot be represented, e.g. it nests too deeply.
    pub fn reflect<T>(key: impl Into<String>, value: &T) -> Result<Self>
    where
        T: ?Sized + Serialize,
    {
        Ok(Field::new(key, FieldValue::Reflected(to_value(value)?)))
    }

    pub fn reflected(key: impl Into<String>, value: Value) -> Self {
        Field::new(key, FieldValue::Reflected(value))
    }

    /// Opens a namespace; the encoder counts it but the text form is flat.
    pub fn namespace(key: impl Into<String>) -> Self {
        Field::new(key, FieldValue::Namespace)
    }

    /// A string field holding the value's `Display` output.
    pub fn display(key: impl Into<String>, value: &(impl fmt::Display + ?Sized)) -> Self {
        Field::string(key, value.to_string())
    }

    /// An error message under the `error` key.
    pub fn error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Field::named_error("error", err)
    }

    pub fn named_error<E>(key: impl Into<String>, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Field::string(key, err.to_string())
    }

    /// Writes this field into `enc`.
    pub fn add_to(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        let res = self.dispatch(enc);
        if let Err(err) = &res {
            tracing::debug!(key = %self.key, error = %err, "failed to encode field");
        }
        res
    }

    fn dispatch(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        let key = self.key.as_str();
        match &self.value {
            FieldValue::Bool(v) => enc.add_bool(key, *v),
            FieldValue::Int(v) => enc.add_int64(key, *v),
            FieldValue::Uint(v) => enc.add_uint64(key, *v),
            FieldValue::Float64(v) => enc.add_float64(key, *v),
            FieldValue::Float32(v) => enc.add_float32(key, *v),
            FieldValue::Complex64(v) => enc.add_complex64(key, *v),
            FieldValue::Complex32(v) => enc.add_complex32(key, *v),
            FieldValue::String(v) => enc.add_string(key, v),
            FieldValue::Binary(v) => enc.add_binary(key, v),
            FieldValue::ByteString(v) => enc.add_byte_string(key, v),
            FieldValue::Duration(v) => enc.add_duration(key, *v),
            FieldValue::Time(v) => enc.add_time(key, *v),
            FieldValue::Array(items) => return enc.add_array(key, items),
            FieldValue::Object(fields) => return enc.add_object(key, fields),
            FieldValue::ArrayMarshaler(m) => return enc.add_array(key, m.as_ref()),
            FieldValue::ObjectMarshaler(m) => return enc.add_object(key, m.as_ref()),
            FieldValue::Reflected(v) => return enc.add_reflected(key, v),
            FieldValue::Namespace => enc.open_namespace(key),
        }
        Ok(())
    }
}

impl FieldValue {
    /// Writes this value as the next element of `enc`.
    ///
    /// Namespaces have no meaning inside an array and are skipped.
    pub fn append_to(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        match self {
            FieldValue::Bool(v) => enc.append_bool(*v),
            FieldValue::Int(v) => enc.append_int64(*v),
            FieldValue::Uint(v) => enc.append_uint64(*v),
            FieldValue::Float64(v) => enc.append_float64(*v),
            FieldValue::Float32(v) => enc.append_float32(*v),
            FieldValue::Complex64(v) => enc.append_complex64(*v),
            FieldValue::Complex32(v) => enc.append_complex32(*v),
            FieldValue::String(v) => enc.append_string(v),
            FieldValue::Binary(v) => enc.append_string(&base64_standard(v)),
            FieldValue::ByteString(v) => enc.append_byte_string(v),
            FieldValue::Duration(v) => enc.append_duration(*v),
            FieldValue::Time(v) => enc.append_time(*v),
            FieldValue::Array(items) => return enc.append_array(items),
            FieldValue::Object(fields) => return enc.append_object(fields),
            FieldValue::ArrayMarshaler(m) => return enc.append_array(m.as_ref()),
            FieldValue::ObjectMarshaler(m) => return enc.append_object(m.as_ref()),
            FieldValue::Reflected(v) => return enc.append_reflected(v),
            FieldValue::Namespace => {}
        }
        Ok(())
    }
}

pub(crate) fn base64_standard(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

impl ArrayMarshaler for Vec<FieldValue> {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        self.iter().try_for_each(|item| item.append_to(enc))
    }
}

impl ObjectMarshaler for Vec<Field> {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        self.iter().try_for_each(|field| field.add_to(enc))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            FieldValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            FieldValue::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            FieldValue::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            FieldValue::Float32(v) => f.debug_tuple("Float32").field(v).finish(),
            FieldValue::Complex64(v) => f.debug_tuple("Complex64").field(v).finish(),
            FieldValue::Complex32(v) => f.debug_tuple("Complex32").field(v).finish(),
            FieldValue::String(v) => f.debug_tuple("String").field(v).finish(),
            FieldValue::Binary(v) => f.debug_tuple("Binary").field(v).finish(),
            FieldValue::ByteString(v) => f.debug_tuple("ByteString").field(v).finish(),
            FieldValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            FieldValue::Time(v) => f.debug_tuple("Time").field(v).finish(),
            FieldValue::Array(v) => f.debug_tuple("Array").field(v).finish(),
            FieldValue::Object(v) => f.debug_tuple("Object").field(v).finish(),
            FieldValue::ArrayMarshaler(_) => f.write_str("ArrayMarshaler(..)"),
            FieldValue::ObjectMarshaler(_) => f.write_str("ObjectMarshaler(..)"),
            FieldValue::Reflected(v) => f.debug_tuple("Reflected").field(v).finish(),
            FieldValue::Namespace => f.write_str("Namespace"),
        }
    }
}

macro_rules! from_scalar {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::$variant(v as $target)
                }
            }
        )*
    };
}

from_scalar! {
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
    f32 => Float32 as f32,
    f64 => Float64 as f64,
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Complex64> for FieldValue {
    fn from(v: Complex64) -> Self {
        FieldValue::Complex64(v)
    }
}

impl From<Complex32> for FieldValue {
    fn from(v: Complex32) -> Self {
        FieldValue::Complex32(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<TimeDelta> for FieldValue {
    fn from(v: TimeDelta) -> Self {
        FieldValue::Duration(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Time(v)
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Reflected(v)
    }
}

impl From<Vec<Field>> for FieldValue {
    fn from(v: Vec<Field>) -> Self {
        FieldValue::Object(v)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(v: Vec<FieldValue>) -> Self {
        FieldValue::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EncoderConfig, Error, TextEncoder};

    fn encode(fields: &[Field]) -> Result<String> {
        let mut enc = TextEncoder::new(EncoderConfig::bare());
        for field in fields {
            field.add_to(&mut enc)?;
        }
        Ok(enc.buffer().to_string_lossy())
    }

    #[test]
    fn test_narrow_widths_promote() {
        assert!(matches!(FieldValue::from(7u8), FieldValue::Uint(7)));
        assert!(matches!(FieldValue::from(-7i16), FieldValue::Int(-7)));
        assert!(matches!(FieldValue::from(1.5f32), FieldValue::Float32(_)));
    }

    #[test]
    fn test_binary_is_base64() {
        let out = encode(&[Field::binary("b", b"hello".to_vec())]).unwrap();
        assert_eq!(out, r#"b="aGVsbG8=""#);
    }

    #[test]
    fn test_nested_values() {
        let out = encode(&[
            Field::array_of("ids", ["a", "b c"]),
            Field::nested("user", vec![Field::string("name", "bob"), Field::int64("age", 9)]),
        ])
        .unwrap();
        assert_eq!(out, r#"ids=[a,"b c"] user=name=bob age=9"#);
    }

    #[test]
    fn test_error_and_display_fields() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let out = encode(&[Field::error(&err), Field::display("n", &42)]).unwrap();
        assert_eq!(out, r#"error="disk full" n=42"#);
    }

    #[test]
    fn test_marshaler_failure_propagates() {
        let failing = crate::ArrayMarshalerFn(|enc: &mut dyn ArrayEncoder| {
            enc.append_int64(1);
            Err(Error::marshal("boom"))
        });
        let err = encode(&[Field::array("xs", failing)]).unwrap_err();
        assert_eq!(err, Error::marshal("boom"));
    }

    #[test]
    fn test_reflect_captures_value() {
        let field = Field::reflect("v", &vec![1, 2]).unwrap();
        assert!(matches!(field.value, FieldValue::Reflected(Value::Seq(_))));
    }
}
