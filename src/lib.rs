//! # serde_logtext
//!
//! Structured log field encoders: a single-line `key=value` text encoder for
//! logging pipelines, and a reflective encoder that renders any
//! `serde::Serialize` value as compact JSON-compatible text.
//!
//! ## Key Features
//!
//! - **Readable lines**: `ts=... level=INFO msg=hello user=bob ids=[1,2,3]`, quoting
//!   only the values that need it
//! - **Typed fields**: integers, floats, complex numbers, durations, timestamps,
//!   byte strings, nested arrays and objects, and arbitrary serde values
//! - **Pluggable headers**: time, duration, level and caller formatters, loadable
//!   from any serde configuration format
//! - **Bounded reflection**: the reflective encoder refuses to nest past a
//!   configurable depth, so self-referential values cannot blow the stack
//! - **Low allocation**: encoders and buffers are recycled through lock-free pools
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_logtext = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Encoding a log line
//!
//! ```rust
//! use serde_logtext::{Encoder, EncoderConfig, Entry, Field, Level, TextEncoder};
//!
//! let encoder = TextEncoder::new(EncoderConfig::new().with_time_key(""));
//! let entry = Entry::new(Level::Info, "hello");
//! let line = encoder
//!     .encode_entry(&entry, &[Field::string("name", "bob"), Field::array_of("ids", [1, 2, 3])])
//!     .unwrap();
//! assert_eq!(line.to_string_lossy(), "level=INFO msg=hello name=bob ids=[1,2,3]");
//! ```
//!
//! ### Context fields
//!
//! Fields added directly to an encoder are repeated on every line it produces.
//! Clones carry the context accumulated so far and diverge afterwards.
//!
//! ```rust
//! use serde_logtext::{Encoder, EncoderConfig, Entry, Level, ObjectEncoder, TextEncoder};
//!
//! let mut base = TextEncoder::new(EncoderConfig::bare());
//! base.add_string("service", "api");
//! let mut child = base.clone();
//! child.add_int64("request", 7);
//!
//! let entry = Entry::new(Level::Info, "");
//! assert_eq!(base.encode_entry(&entry, &[]).unwrap().to_string_lossy(), "service=api");
//! assert_eq!(
//!     child.encode_entry(&entry, &[]).unwrap().to_string_lossy(),
//!     "service=api request=7"
//! );
//! ```
//!
//! ### Reflective encoding
//!
//! ```rust
//! use serde::Serialize;
//! use serde_logtext::to_string;
//!
//! #[derive(Serialize)]
//! struct Login<'a> {
//!     user: &'a str,
//!     #[serde(rename = "ok")]
//!     succeeded: bool,
//!     reason: Option<&'a str>,
//! }
//!
//! let json = to_string(&Login { user: "bob", succeeded: true, reason: None }).unwrap();
//! assert_eq!(json, r#"{"user":"bob","ok":true}"#);
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Errors propagate through `Result`; library code does not unwrap

pub mod buffer;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod field;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod pool;
pub mod reflect;
pub mod ser;
pub mod text;
pub mod value;

pub use buffer::Buffer;
pub use encoder::{
    ArrayEncoder, ArrayMarshaler, ArrayMarshalerFn, Encoder, ObjectEncoder, ObjectMarshaler,
    ObjectMarshalerFn, PrimitiveArrayEncoder,
};
pub use entry::{Caller, Entry, Level};
pub use error::{Error, Result};
pub use field::{Field, FieldValue};
pub use format::{CallerFormat, DurationFormat, LevelFormat, TimeFormat};
pub use map::ValueMap;
pub use options::{EncoderConfig, ReflectOptions, DEFAULT_MAX_DEPTH};
pub use reflect::ReflectEncoder;
pub use ser::ValueSerializer;
pub use text::TextEncoder;
pub use value::{Number, Value};

use serde::Serialize;
use std::io;

/// Convert any `T: Serialize` to a [`Value`].
///
/// Nesting is limited to [`DEFAULT_MAX_DEPTH`] containers.
///
/// # Examples
///
/// ```rust
/// use serde_logtext::to_value;
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("k", vec![1, 2]);
/// let value = to_value(&map).unwrap();
/// assert!(value.is_map());
/// ```
///
/// # Errors
///
/// Returns an error if the value nests too deeply or has a map key that is not
/// a scalar.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::new(DEFAULT_MAX_DEPTH))
}

/// Render any `T: Serialize` as JSON-compatible text with default options.
///
/// # Errors
///
/// Returns an error if the value cannot be represented.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ReflectOptions::default())
}

/// Render any `T: Serialize` as JSON-compatible text with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_logtext::{to_string_with_options, ReflectOptions};
///
/// let options = ReflectOptions::new().with_escape_html(false);
/// assert_eq!(to_string_with_options("<b>", options).unwrap(), r#""<b>""#);
/// assert_eq!(
///     serde_logtext::to_string("<b>").unwrap(),
///     r#""\u003cb\u003e""#
/// );
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: ReflectOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut enc = ReflectEncoder::with_options(Vec::with_capacity(128), options);
    enc.encode(value)?;
    String::from_utf8(enc.release()).map_err(Error::custom)
}

/// Render any `T: Serialize` into a writer.
///
/// The rendering is written with a single `write_all`; nothing is written when
/// encoding fails.
///
/// # Errors
///
/// Returns an error if the value cannot be represented or the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    ReflectEncoder::new(writer).encode(value)
}

/// Boxed text encoder for hosts that work with `dyn Encoder`.
pub fn new_text_encoder(config: EncoderConfig) -> Box<dyn Encoder> {
    Box::new(TextEncoder::new(config))
}
