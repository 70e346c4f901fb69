//! Conversion of `Serialize` values into [`Value`] trees.
//!
//! [`ValueSerializer`] is the reflection step of the reflective encoder: it
//! records the shape of any `T: Serialize` as a closed [`Value`] category tree.
//! Every descent into a sequence, map, struct, variant payload, newtype struct
//! or `Some` is counted, and going past the configured maximum fails with
//! [`Error::DepthExceeded`](crate::Error::DepthExceeded). This keeps
//! self-referential `Serialize` impls from recursing without bound.
//!
//! ## Mapping of serde's data model
//!
//! | serde                          | `Value`                      |
//! |--------------------------------|------------------------------|
//! | unit, `None`, unit struct      | `Null`                       |
//! | integers, floats               | `Number` (native width kept) |
//! | `char`, `str`, unit variant    | `String`                     |
//! | bytes, seq, tuple              | `Seq`                        |
//! | map                            | `Map` (keys as text)         |
//! | struct                         | `Record` (`None` fields dropped) |
//! | newtype/tuple/struct variant   | one-entry `Record`           |
//!
//! ```rust
//! use serde_logtext::ser::ValueSerializer;
//! use serde::Serialize;
//!
//! let value = vec![1, 2, 3].serialize(ValueSerializer::new(32)).unwrap();
//! assert_eq!(value.as_seq().map(Vec::len), Some(3));
//! ```

use crate::value::{Number, RECORD_TOKEN};
use crate::{Error, Result, Value, ValueMap};
use serde::{ser, Serialize};

/// Serializer producing a [`Value`], bounded by a maximum nesting depth.
#[derive(Clone, Copy, Debug)]
pub struct ValueSerializer {
    depth: usize,
    max_depth: usize,
}

impl ValueSerializer {
    /// Creates a serializer that allows at most `max_depth` nested containers.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        ValueSerializer {
            depth: 0,
            max_depth,
        }
    }

    /// Serializer for the contents of a container one level down.
    fn nested(self) -> Result<Self> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(Error::depth_exceeded(self.max_depth));
        }
        Ok(ValueSerializer { depth, ..self })
    }
}

pub struct SerializeVec {
    vec: Vec<Value>,
    inner: ValueSerializer,
}

pub struct SerializeMap {
    map: ValueMap,
    current_key: Option<String>,
    inner: ValueSerializer,
}

/// Collects a variant payload into a one-entry record.
pub struct SerializeVariant<T> {
    variant: &'static str,
    payload: T,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVariant<SerializeVec>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeVariant<SerializeMap>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::Uint(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::Float32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        self.nested()?;
        let vec = v
            .iter()
            .map(|&b| Value::Number(Number::Uint(b as u64)))
            .collect();
        Ok(Value::Seq(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self.nested()?)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        if name != RECORD_TOKEN {
            // Transparent in the output, but still a step down: a type that
            // wraps itself must run into the limit.
            return value.serialize(self.nested()?);
        }
        match value.serialize(self)? {
            Value::Map(fields) => Ok(Value::Record(fields)),
            other => Ok(other),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let payload = value.serialize(self.nested()?)?;
        Ok(single_entry(variant, payload))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        SerializeVec::new(self.nested()?, len.unwrap_or(0))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        SerializeVec::new(self.nested()?, len)
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        SerializeVec::new(self.nested()?, len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVariant<SerializeVec>> {
        Ok(SerializeVariant {
            variant,
            payload: SerializeVec::new(self.nested()?.nested()?, len)?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self.nested()?))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self.nested()?))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeVariant<SerializeMap>> {
        Ok(SerializeVariant {
            variant,
            payload: SerializeMap::new(self.nested()?.nested()?),
        })
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut fields = ValueMap::with_capacity(1);
    fields.insert(key.to_string(), value);
    Value::Record(fields)
}

impl SerializeVec {
    fn new(inner: ValueSerializer, capacity: usize) -> Result<Self> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(capacity),
            inner,
        })
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.inner)?);
        Ok(())
    }
}

impl SerializeMap {
    fn new(inner: ValueSerializer) -> Self {
        SerializeMap {
            map: ValueMap::new(),
            current_key: None,
            inner,
        }
    }

    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(self.inner)?;
        if !value.is_null() {
            self.map.insert(key.to_string(), value);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Seq(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Seq(self.vec))
    }
}

impl ser::SerializeTupleVariant for SerializeVariant<SerializeVec> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.payload.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.variant, Value::Seq(self.payload.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeVariant<SerializeMap> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.payload.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.variant, Value::Record(self.payload.map)))
    }
}

/// Renders map keys in their default text form.
///
/// Scalars are accepted; composite keys have no text form and are rejected.
struct MapKeySerializer;

fn key_must_be_scalar() -> Error {
    Error::unsupported_type("map key must be a string, number, bool or unit variant")
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(v).into_owned())
    }

    fn serialize_none(self) -> Result<String> {
        Ok("null".to_string())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Ok("null".to_string())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<String> {
        Ok(name.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_scalar())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_scalar())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_scalar())
    }
}
