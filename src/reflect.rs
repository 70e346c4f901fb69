//! Reflective value encoder.
//!
//! [`ReflectEncoder`] renders any `T: Serialize` (or a prebuilt [`Value`]) as
//! compact JSON-compatible text and writes it to an [`io::Write`]. It is the
//! renderer behind reflected fields in the text encoder, and is usable on its
//! own:
//!
//! ```rust
//! use serde_logtext::ReflectEncoder;
//! use std::collections::HashMap;
//!
//! let mut map = HashMap::new();
//! map.insert("b", 2);
//! map.insert("a", 1);
//!
//! let mut enc = ReflectEncoder::new(Vec::new());
//! enc.encode(&map).unwrap();
//! assert_eq!(enc.release(), br#"{"a":1,"b":2}"#);
//! ```
//!
//! ## Failure
//!
//! Errors are sticky. Once an encode fails (too deep, writer error, a value that
//! cannot be represented) every later call returns that same error until
//! [`reset`](ReflectEncoder::reset) is called. A failed encode writes nothing:
//! the rendering is built in a scratch buffer and handed to the writer with a
//! single `write_all`.

use crate::options::ReflectOptions;
use crate::ser::ValueSerializer;
use crate::value::Number;
use crate::{Buffer, Error, Result, Value};
use chrono::SecondsFormat;
use serde::Serialize;
use std::io;

/// Writes values as JSON-compatible text.
pub struct ReflectEncoder<W: io::Write> {
    writer: W,
    scratch: Buffer,
    options: ReflectOptions,
    err: Option<Error>,
}

impl<W: io::Write> ReflectEncoder<W> {
    /// Creates an encoder with a depth limit of 32 and HTML escaping on.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, ReflectOptions::default())
    }

    pub fn with_options(writer: W, options: ReflectOptions) -> Self {
        ReflectEncoder {
            writer,
            scratch: Buffer::new(),
            options,
            err: None,
        }
    }

    /// Sets the nesting limit. Zero is ignored.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        if max_depth == 0 {
            tracing::debug!("ignoring zero max depth");
            return;
        }
        self.options.max_depth = max_depth;
    }

    pub fn set_escape_html(&mut self, escape_html: bool) {
        self.options.escape_html = escape_html;
    }

    pub fn options(&self) -> ReflectOptions {
        self.options
    }

    /// The sticky error, if an earlier encode failed.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Clears the sticky error.
    pub fn reset(&mut self) {
        self.err = None;
        self.scratch.reset();
    }

    /// Serializes `value` and writes its rendering.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let res = value
            .serialize(ValueSerializer::new(self.options.max_depth))
            .and_then(|value| self.write_value(&value));
        self.finish(res)
    }

    /// Writes the rendering of an already-built [`Value`].
    pub fn encode_value(&mut self, value: &Value) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let res = self.write_value(value);
        self.finish(res)
    }

    /// Gives the writer back. The scratch buffer returns to its pool.
    pub fn release(self) -> W {
        self.writer
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        self.scratch.reset();
        Walker {
            out: &mut self.scratch,
            options: self.options,
            depth: 0,
        }
        .value(value)?;
        self.writer.write_all(self.scratch.as_bytes())?;
        self.scratch.reset();
        Ok(())
    }

    fn finish(&mut self, res: Result<()>) -> Result<()> {
        if let Err(err) = &res {
            tracing::debug!(error = %err, "reflective encode failed");
            self.err = Some(err.clone());
        }
        res
    }
}

struct Walker<'a> {
    out: &'a mut Buffer,
    options: ReflectOptions,
    depth: usize,
}

impl Walker<'_> {
    fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.out.append_str("null"),
            Value::Bool(b) => self.out.append_bool(*b),
            Value::Number(n) => self.number(*n),
            Value::Complex(c) => {
                self.out.append_str("{\"real\":");
                self.float(c.re, 64);
                self.out.append_str(",\"imag\":");
                self.float(c.im, 64);
                self.out.append_byte(b'}');
            }
            Value::String(s) => self.string(s),
            Value::Seq(items) => {
                self.enter()?;
                self.out.append_byte(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.append_byte(b',');
                    }
                    self.value(item)?;
                }
                self.out.append_byte(b']');
                self.depth -= 1;
            }
            Value::Map(map) => {
                self.enter()?;
                self.entries(map.sorted().into_iter())?;
                self.depth -= 1;
            }
            Value::Record(fields) => {
                self.enter()?;
                self.entries(fields.iter().filter(|(_, v)| !v.is_null()))?;
                self.depth -= 1;
            }
            Value::Time(t) => {
                self.out.append_byte(b'"');
                self.out
                    .append_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                self.out.append_byte(b'"');
            }
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(Error::depth_exceeded(self.options.max_depth));
        }
        Ok(())
    }

    fn entries<'v>(&mut self, entries: impl Iterator<Item = (&'v String, &'v Value)>) -> Result<()> {
        self.out.append_byte(b'{');
        for (i, (key, value)) in entries.enumerate() {
            if i > 0 {
                self.out.append_byte(b',');
            }
            self.string(key);
            self.out.append_byte(b':');
            self.value(value)?;
        }
        self.out.append_byte(b'}');
        Ok(())
    }

    fn number(&mut self, n: Number) {
        match n {
            Number::Int(i) => self.out.append_int(i),
            Number::Uint(u) => self.out.append_uint(u),
            Number::Float(f) => self.float(f, 64),
            Number::Float32(f) => self.float(f as f64, 32),
        }
    }

    fn float(&mut self, f: f64, bits: u32) {
        if f.is_finite() {
            self.out.append_float(f, bits);
        } else {
            self.out.append_byte(b'"');
            self.out.append_float(f, bits);
            self.out.append_byte(b'"');
        }
    }

    fn string(&mut self, s: &str) {
        self.out.append_byte(b'"');
        let bytes = s.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let escaped: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                b'<' if self.options.escape_html => b"\\u003c",
                b'>' if self.options.escape_html => b"\\u003e",
                b'&' if self.options.escape_html => b"\\u0026",
                0x00..=0x1f => {
                    self.out.append_bytes(&bytes[start..i]);
                    append_unicode_escape(self.out, b);
                    start = i + 1;
                    continue;
                }
                _ => continue,
            };
            self.out.append_bytes(&bytes[start..i]);
            self.out.append_bytes(escaped);
            start = i + 1;
        }
        self.out.append_bytes(&bytes[start..]);
        self.out.append_byte(b'"');
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Writes `\u00XX` for a control byte.
pub(crate) fn append_unicode_escape(out: &mut Buffer, b: u8) {
    out.append_str("\\u00");
    out.append_byte(HEX[(b >> 4) as usize]);
    out.append_byte(HEX[(b & 0xf) as usize]);
}

impl<W: io::Write> std::fmt::Debug for ReflectEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectEncoder")
            .field("options", &self.options)
            .field("err", &self.err)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;
    use num_complex::Complex64;

    fn render(value: &Value) -> String {
        let mut enc = ReflectEncoder::new(Vec::new());
        enc.encode_value(value).unwrap();
        String::from_utf8(enc.release()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render(&Value::Null), "null");
        assert_eq!(render(&Value::from(true)), "true");
        assert_eq!(render(&Value::from(-3)), "-3");
        assert_eq!(render(&Value::from(2.5)), "2.5");
        assert_eq!(render(&Value::from(f64::NAN)), "\"NaN\"");
        assert_eq!(render(&Value::from(f64::NEG_INFINITY)), "\"-Inf\"");
    }

    #[test]
    fn test_complex() {
        let v = Value::from(Complex64::new(1.5, -2.0));
        assert_eq!(render(&v), r#"{"real":1.5,"imag":-2}"#);
    }

    #[test]
    fn test_string_escapes() {
        let v = Value::from("a\"b\\c\nd\u{1}<&>");
        assert_eq!(
            render(&v),
            r#""a\"b\\c\nd\u0001\u003c\u0026\u003e""#
        );
    }

    #[test]
    fn test_html_escaping_off() {
        let mut enc = ReflectEncoder::new(Vec::new());
        enc.set_escape_html(false);
        enc.encode_value(&Value::from("<b>")).unwrap();
        assert_eq!(enc.release(), b"\"<b>\"");
    }

    #[test]
    fn test_record_keeps_order_and_drops_null() {
        let v = value!(@record { "z": 1, "skip": null, "a": [true] });
        assert_eq!(render(&v), r#"{"z":1,"a":[true]}"#);
    }

    #[test]
    fn test_map_sorted() {
        let v = value!({ "z": 1, "a": 2 });
        assert_eq!(render(&v), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn test_depth_limit_on_values() {
        let v = value!([[[1]]]);
        let mut enc = ReflectEncoder::new(Vec::new());
        enc.set_max_depth(2);
        assert_eq!(enc.encode_value(&v), Err(Error::depth_exceeded(2)));
        assert!(enc.release().is_empty());
    }

    #[test]
    fn test_sticky_until_reset() {
        let mut enc = ReflectEncoder::new(Vec::new());
        enc.set_max_depth(1);
        let nested = value!([[1]]);
        assert!(enc.encode_value(&nested).is_err());
        assert!(enc.encode_value(&Value::Null).is_err());
        assert!(enc.error().is_some_and(Error::is_depth_exceeded));

        enc.reset();
        enc.encode_value(&Value::Null).unwrap();
        assert_eq!(enc.release(), b"null");
    }

    #[test]
    fn test_zero_max_depth_ignored() {
        let mut enc = ReflectEncoder::new(io::sink());
        enc.set_max_depth(0);
        assert_eq!(enc.options().max_depth, 32);
    }
}
