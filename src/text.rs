//! Single-line `key=value` text encoder.
//!
//! [`TextEncoder`] implements the whole encoder interface and renders fields
//! the way a human scans a log line:
//!
//! ```text
//! ts=2023-09-02T10:30:15.000+0000 level=INFO msg=hello name=bob ids=[1,2,3]
//! ```
//!
//! ## Separators
//!
//! Every value and container start is preceded by a call to the separator
//! routine, which looks only at the last byte written. After `{ [ : , =` or a
//! space nothing is added. Otherwise a `,` is written inside an array and a
//! space everywhere else. Nested objects clear the in-array state, so their
//! fields are space separated just like top-level fields.
//!
//! ## Strings
//!
//! Strings are written bare unless they are empty, contain whitespace, `"`,
//! `=` or a control byte, or end in one of the separator-suppressing bytes. In
//! those cases they are quoted and escaped. See [`needs_quoting`].
//!
//! The last rule quotes some printable strings that contain no whitespace:
//! `s=x:` would swallow the space before the next key, so it is written as
//! `s="x:"`.

use crate::encoder::{
    ArrayEncoder, ArrayMarshaler, Encoder, ObjectEncoder, ObjectMarshaler, PrimitiveArrayEncoder,
};
use crate::field::base64_standard;
use crate::format::saturating_nanos;
use crate::options::{EncoderConfig, ReflectOptions};
use crate::pool::{Pool, Reset, MAX_POOLED_CAPACITY};
use crate::reflect::{append_unicode_escape, ReflectEncoder};
use crate::{Buffer, Entry, Field, Result, Value};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use num_complex::Complex64;
use std::sync::{Arc, OnceLock};

const ENCODER_POOL_SIZE: usize = 32;

fn encoders() -> &'static Pool<TextEncoder> {
    static POOL: OnceLock<Pool<TextEncoder>> = OnceLock::new();
    POOL.get_or_init(|| Pool::new(ENCODER_POOL_SIZE, TextEncoder::default))
}

fn default_config() -> Arc<EncoderConfig> {
    static CONFIG: OnceLock<Arc<EncoderConfig>> = OnceLock::new();
    Arc::clone(CONFIG.get_or_init(|| Arc::new(EncoderConfig::default())))
}

/// Whether a string has to be quoted to survive as one `key=value` token.
///
/// ```rust
/// use serde_logtext::text::needs_quoting;
///
/// assert!(!needs_quoting(b"hello"));
/// assert!(needs_quoting(b""));
/// assert!(needs_quoting(b"two words"));
/// assert!(needs_quoting(b"a=b"));
/// assert!(needs_quoting(b"list:"));
/// assert!(needs_quoting("no\u{a0}break".as_bytes()));
/// ```
pub fn needs_quoting(bytes: &[u8]) -> bool {
    match bytes.last() {
        None | Some(b'{' | b'[' | b':' | b',') => return true,
        Some(_) => {}
    }
    if bytes
        .iter()
        .any(|&b| b < 0x20 || b == b' ' || b == b'"' || b == b'=')
    {
        return true;
    }
    !bytes.is_ascii() && String::from_utf8_lossy(bytes).chars().any(char::is_whitespace)
}

/// Pooled, append-only `key=value` encoder.
///
/// Fields added directly to an encoder become context: they are repeated on
/// every line produced by [`Encoder::encode_entry`].
#[derive(Clone, Debug)]
pub struct TextEncoder {
    config: Arc<EncoderConfig>,
    buf: Buffer,
    in_array: bool,
    open_namespaces: usize,
}

impl Default for TextEncoder {
    fn default() -> Self {
        Self::with_config(default_config())
    }
}

impl Reset for TextEncoder {
    fn reset(&mut self) {
        self.config = default_config();
        self.buf.reset();
        self.in_array = false;
        self.open_namespaces = 0;
    }

    fn reusable(&self) -> bool {
        self.buf.capacity() <= MAX_POOLED_CAPACITY
    }
}

impl TextEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    /// Creates an encoder sharing an existing configuration.
    pub fn with_config(config: Arc<EncoderConfig>) -> Self {
        TextEncoder {
            config,
            buf: Buffer::new(),
            in_array: false,
            open_namespaces: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Bytes written so far, i.e. the accumulated context fields.
    pub fn buffer(&self) -> &Buffer {
        &self.buf
    }

    pub fn open_namespaces(&self) -> usize {
        self.open_namespaces
    }

    fn acquire(config: &Arc<EncoderConfig>) -> TextEncoder {
        let mut enc = encoders().get();
        enc.config = Arc::clone(config);
        enc
    }

    fn add_element_separator(&mut self) {
        match self.buf.last_byte() {
            None | Some(b'{' | b'[' | b':' | b',' | b'=' | b' ') => {}
            Some(_) => self.buf.append_byte(if self.in_array { b',' } else { b' ' }),
        }
    }

    fn add_key(&mut self, key: &str) {
        self.add_element_separator();
        self.buf.append_str(key);
        self.buf.append_byte(b'=');
    }

    fn append_text(&mut self, bytes: &[u8]) {
        if needs_quoting(bytes) {
            self.append_quoted(bytes);
        } else {
            self.buf.append_bytes(bytes);
        }
    }

    fn append_quoted(&mut self, bytes: &[u8]) {
        self.buf.append_byte(b'"');
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let escaped: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x00..=0x1f => {
                    self.buf.append_bytes(&bytes[start..i]);
                    append_unicode_escape(&mut self.buf, b);
                    start = i + 1;
                    continue;
                }
                _ => continue,
            };
            self.buf.append_bytes(&bytes[start..i]);
            self.buf.append_bytes(escaped);
            start = i + 1;
        }
        self.buf.append_bytes(&bytes[start..]);
        self.buf.append_byte(b'"');
    }

    fn append_float(&mut self, v: f64, bits: u32) {
        self.add_element_separator();
        if v.is_finite() {
            self.buf.append_float(v, bits);
        } else {
            self.buf.append_byte(b'"');
            self.buf.append_float(v, bits);
            self.buf.append_byte(b'"');
        }
    }

    fn write_entry(&mut self, context: &Buffer, entry: &Entry, fields: &[Field]) -> Result<()> {
        let config = Arc::clone(&self.config);

        if !config.time_key.is_empty() {
            self.add_time(&config.time_key, entry.time);
        }
        if !config.level_key.is_empty() {
            self.add_key(&config.level_key);
            let mark = self.buf.len();
            if let Some(format) = &config.encode_level {
                format.encode(entry.level, self);
            }
            if self.buf.len() == mark {
                self.append_string(entry.level.as_capital_str());
            }
        }
        if !config.name_key.is_empty() && !entry.logger_name.is_empty() {
            self.add_string(&config.name_key, &entry.logger_name);
        }
        if let Some(caller) = &entry.caller {
            if !config.caller_key.is_empty() {
                self.add_key(&config.caller_key);
                let mark = self.buf.len();
                if let Some(format) = &config.encode_caller {
                    format.encode(caller, self);
                }
                if self.buf.len() == mark {
                    self.append_string(&caller.trimmed_path());
                }
            }
            if !config.function_key.is_empty() && !caller.function.is_empty() {
                self.add_string(&config.function_key, &caller.function);
            }
        }
        if !config.message_key.is_empty() {
            self.add_string(&config.message_key, &entry.message);
        }

        if !context.is_empty() {
            self.add_element_separator();
            self.buf.append_bytes(context.as_bytes());
        }
        for field in fields {
            field.add_to(self)?;
        }

        if !config.stacktrace_key.is_empty() && !entry.stack.is_empty() {
            self.add_string(&config.stacktrace_key, &entry.stack);
        }
        Ok(())
    }
}

impl PrimitiveArrayEncoder for TextEncoder {
    fn append_bool(&mut self, v: bool) {
        self.add_element_separator();
        self.buf.append_bool(v);
    }

    fn append_byte_string(&mut self, v: &[u8]) {
        self.add_element_separator();
        self.append_text(v);
    }

    fn append_complex64(&mut self, v: Complex64) {
        self.add_element_separator();
        self.buf.append_byte(b'"');
        self.buf.append_float(v.re, 64);
        // Always `re+im`; a negative part keeps its own sign after the `+`.
        self.buf.append_byte(b'+');
        self.buf.append_float(v.im, 64);
        self.buf.append_str("i\"");
    }

    fn append_float64(&mut self, v: f64) {
        self.append_float(v, 64);
    }

    fn append_float32(&mut self, v: f32) {
        self.append_float(v as f64, 32);
    }

    fn append_int64(&mut self, v: i64) {
        self.add_element_separator();
        self.buf.append_int(v);
    }

    fn append_uint64(&mut self, v: u64) {
        self.add_element_separator();
        self.buf.append_uint(v);
    }

    fn append_string(&mut self, v: &str) {
        self.add_element_separator();
        self.append_text(v.as_bytes());
    }
}

impl ArrayEncoder for TextEncoder {
    fn append_duration(&mut self, v: TimeDelta) {
        let config = Arc::clone(&self.config);
        let mark = self.buf.len();
        if let Some(format) = &config.encode_duration {
            format.encode(v, self);
        }
        if self.buf.len() == mark {
            self.append_int64(saturating_nanos(v));
        }
    }

    fn append_time(&mut self, v: DateTime<Utc>) {
        let config = Arc::clone(&self.config);
        let mark = self.buf.len();
        if let Some(format) = &config.encode_time {
            format.encode(v, self);
        }
        if self.buf.len() == mark {
            self.append_string(&v.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }

    fn append_array(&mut self, v: &dyn ArrayMarshaler) -> Result<()> {
        self.add_element_separator();
        self.buf.append_byte(b'[');
        let outer = std::mem::replace(&mut self.in_array, true);
        let res = v.marshal_log_array(self);
        self.in_array = outer;
        self.buf.append_byte(b']');
        res
    }

    fn append_object(&mut self, v: &dyn ObjectMarshaler) -> Result<()> {
        self.add_element_separator();
        let bracket = self.config.bracket_objects;
        if bracket {
            self.buf.append_byte(b'{');
        }
        let outer = std::mem::replace(&mut self.in_array, false);
        let res = v.marshal_log_object(self);
        self.in_array = outer;
        if bracket {
            self.buf.append_byte(b'}');
        }
        res
    }

    fn append_reflected(&mut self, v: &Value) -> Result<()> {
        self.add_element_separator();
        let options = ReflectOptions::new().with_escape_html(false);
        let mut enc = ReflectEncoder::with_options(&mut self.buf, options);
        enc.encode_value(v)
    }
}

impl ObjectEncoder for TextEncoder {
    fn add_array(&mut self, key: &str, v: &dyn ArrayMarshaler) -> Result<()> {
        self.add_key(key);
        self.append_array(v)
    }

    fn add_object(&mut self, key: &str, v: &dyn ObjectMarshaler) -> Result<()> {
        self.add_key(key);
        self.append_object(v)
    }

    fn add_binary(&mut self, key: &str, v: &[u8]) {
        self.add_string(key, &base64_standard(v));
    }

    fn add_byte_string(&mut self, key: &str, v: &[u8]) {
        self.add_key(key);
        self.append_byte_string(v);
    }

    fn add_bool(&mut self, key: &str, v: bool) {
        self.add_key(key);
        self.append_bool(v);
    }

    fn add_complex64(&mut self, key: &str, v: Complex64) {
        self.add_key(key);
        self.append_complex64(v);
    }

    fn add_duration(&mut self, key: &str, v: TimeDelta) {
        self.add_key(key);
        self.append_duration(v);
    }

    fn add_float64(&mut self, key: &str, v: f64) {
        self.add_key(key);
        self.append_float64(v);
    }

    fn add_float32(&mut self, key: &str, v: f32) {
        self.add_key(key);
        self.append_float32(v);
    }

    fn add_int64(&mut self, key: &str, v: i64) {
        self.add_key(key);
        self.append_int64(v);
    }

    fn add_string(&mut self, key: &str, v: &str) {
        self.add_key(key);
        self.append_string(v);
    }

    fn add_time(&mut self, key: &str, v: DateTime<Utc>) {
        self.add_key(key);
        self.append_time(v);
    }

    fn add_uint64(&mut self, key: &str, v: u64) {
        self.add_key(key);
        self.append_uint64(v);
    }

    fn add_reflected(&mut self, key: &str, v: &Value) -> Result<()> {
        self.add_key(key);
        self.append_reflected(v)
    }

    fn open_namespace(&mut self, _key: &str) {
        self.open_namespaces += 1;
    }
}

impl Encoder for TextEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        let mut line = TextEncoder::acquire(&self.config);
        let res = line.write_entry(&self.buf, entry, fields);
        let out = std::mem::take(&mut line.buf);
        encoders().put(line);
        res.map(|()| out)
    }
}
