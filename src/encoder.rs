//! The encoder interface a logging host drives.
//!
//! A host hands each typed field to an [`ObjectEncoder`] (`add_*` under a key)
//! or to an [`ArrayEncoder`] (`append_*` as the next element). Composite values
//! implement [`ArrayMarshaler`] or [`ObjectMarshaler`] and write themselves
//! through the encoder they are given; their `Result` is the only error channel.
//!
//! Narrow integer and float widths have default implementations that widen to
//! the 64-bit methods, so an implementor only has to provide those.

use crate::entry::Entry;
use crate::{Buffer, Field, Result, Value};
use chrono::{DateTime, TimeDelta, Utc};
use num_complex::{Complex32, Complex64};

/// Appends primitive values as array elements.
///
/// This is also the handle custom time, duration, level and caller formatters
/// write through.
pub trait PrimitiveArrayEncoder {
    fn append_bool(&mut self, v: bool);
    /// Appends UTF-8 text held as bytes.
    fn append_byte_string(&mut self, v: &[u8]);
    fn append_complex64(&mut self, v: Complex64);
    fn append_float64(&mut self, v: f64);
    fn append_float32(&mut self, v: f32);
    fn append_int64(&mut self, v: i64);
    fn append_uint64(&mut self, v: u64);
    fn append_string(&mut self, v: &str);

    fn append_complex32(&mut self, v: Complex32) {
        self.append_complex64(Complex64::new(v.re as f64, v.im as f64));
    }

    fn append_int(&mut self, v: isize) {
        self.append_int64(v as i64);
    }

    fn append_int32(&mut self, v: i32) {
        self.append_int64(v as i64);
    }

    fn append_int16(&mut self, v: i16) {
        self.append_int64(v as i64);
    }

    fn append_int8(&mut self, v: i8) {
        self.append_int64(v as i64);
    }

    fn append_uint(&mut self, v: usize) {
        self.append_uint64(v as u64);
    }

    fn append_uint32(&mut self, v: u32) {
        self.append_uint64(v as u64);
    }

    fn append_uint16(&mut self, v: u16) {
        self.append_uint64(v as u64);
    }

    fn append_uint8(&mut self, v: u8) {
        self.append_uint64(v as u64);
    }

    fn append_uintptr(&mut self, v: usize) {
        self.append_uint64(v as u64);
    }
}

/// Appends array elements, including composite ones.
pub trait ArrayEncoder: PrimitiveArrayEncoder {
    fn append_duration(&mut self, v: TimeDelta);
    fn append_time(&mut self, v: DateTime<Utc>);
    fn append_array(&mut self, v: &dyn ArrayMarshaler) -> Result<()>;
    fn append_object(&mut self, v: &dyn ObjectMarshaler) -> Result<()>;
    fn append_reflected(&mut self, v: &Value) -> Result<()>;
}

/// Adds keyed fields to the object currently being built.
pub trait ObjectEncoder {
    fn add_array(&mut self, key: &str, v: &dyn ArrayMarshaler) -> Result<()>;
    fn add_object(&mut self, key: &str, v: &dyn ObjectMarshaler) -> Result<()>;

    /// Adds opaque bytes; text encoders render them as base64.
    fn add_binary(&mut self, key: &str, v: &[u8]);
    fn add_byte_string(&mut self, key: &str, v: &[u8]);
    fn add_bool(&mut self, key: &str, v: bool);
    fn add_complex64(&mut self, key: &str, v: Complex64);
    fn add_duration(&mut self, key: &str, v: TimeDelta);
    fn add_float64(&mut self, key: &str, v: f64);
    fn add_float32(&mut self, key: &str, v: f32);
    fn add_int64(&mut self, key: &str, v: i64);
    fn add_string(&mut self, key: &str, v: &str);
    fn add_time(&mut self, key: &str, v: DateTime<Utc>);
    fn add_uint64(&mut self, key: &str, v: u64);
    fn add_reflected(&mut self, key: &str, v: &Value) -> Result<()>;

    /// Opens a namespace; every later field belongs to it.
    fn open_namespace(&mut self, key: &str);

    fn add_complex32(&mut self, key: &str, v: Complex32) {
        self.add_complex64(key, Complex64::new(v.re as f64, v.im as f64));
    }

    fn add_int(&mut self, key: &str, v: isize) {
        self.add_int64(key, v as i64);
    }

    fn add_int32(&mut self, key: &str, v: i32) {
        self.add_int64(key, v as i64);
    }

    fn add_int16(&mut self, key: &str, v: i16) {
        self.add_int64(key, v as i64);
    }

    fn add_int8(&mut self, key: &str, v: i8) {
        self.add_int64(key, v as i64);
    }

    fn add_uint(&mut self, key: &str, v: usize) {
        self.add_uint64(key, v as u64);
    }

    fn add_uint32(&mut self, key: &str, v: u32) {
        self.add_uint64(key, v as u64);
    }

    fn add_uint16(&mut self, key: &str, v: u16) {
        self.add_uint64(key, v as u64);
    }

    fn add_uint8(&mut self, key: &str, v: u8) {
        self.add_uint64(key, v as u64);
    }

    fn add_uintptr(&mut self, key: &str, v: usize) {
        self.add_uint64(key, v as u64);
    }
}

/// A complete entry encoder.
pub trait Encoder: ObjectEncoder + Send {
    /// Copies the encoder together with the context fields it has accumulated.
    fn clone_encoder(&self) -> Box<dyn Encoder>;

    /// Renders one log line: header, accumulated context, then `fields`.
    ///
    /// The encoder itself is left untouched.
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer>;
}

/// A value that writes itself as a sequence of elements.
pub trait ArrayMarshaler {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()>;
}

/// A value that writes itself as a set of keyed fields.
pub trait ObjectMarshaler {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()>;
}

/// Adapts a closure into an [`ArrayMarshaler`].
///
/// ```rust
/// use serde_logtext::{ArrayEncoder, ArrayMarshalerFn, Field};
///
/// let ids = ArrayMarshalerFn(|enc: &mut dyn ArrayEncoder| {
///     for id in [1, 2, 3] {
///         enc.append_int64(id);
///     }
///     Ok(())
/// });
/// let field = Field::array("ids", ids);
/// assert_eq!(field.key, "ids");
/// ```
#[derive(Clone, Copy)]
pub struct ArrayMarshalerFn<F>(pub F);

impl<F> ArrayMarshaler for ArrayMarshalerFn<F>
where
    F: Fn(&mut dyn ArrayEncoder) -> Result<()>,
{
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        (self.0)(enc)
    }
}

/// Adapts a closure into an [`ObjectMarshaler`].
#[derive(Clone, Copy)]
pub struct ObjectMarshalerFn<F>(pub F);

impl<F> ObjectMarshaler for ObjectMarshalerFn<F>
where
    F: Fn(&mut dyn ObjectEncoder) -> Result<()>,
{
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        (self.0)(enc)
    }
}
