//! Pooled append-only byte buffer.
//!
//! [`Buffer`] is what [`Encoder::encode_entry`](crate::Encoder::encode_entry)
//! hands back. Its storage is checked out of a process-wide pool and goes back
//! to that pool when the buffer is dropped, so callers should write the bytes
//! out and let the buffer go rather than keep it around.

use crate::pool::Pool;
use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

const INITIAL_CAPACITY: usize = 1024;
const POOL_SIZE: usize = 64;

fn storage() -> &'static Pool<Vec<u8>> {
    static POOL: OnceLock<Pool<Vec<u8>>> = OnceLock::new();
    POOL.get_or_init(|| Pool::new(POOL_SIZE, || Vec::with_capacity(INITIAL_CAPACITY)))
}

/// An append-only byte buffer backed by pooled storage.
///
/// # Examples
///
/// ```rust
/// use serde_logtext::Buffer;
///
/// let mut buf = Buffer::new();
/// buf.append_str("n=");
/// buf.append_int(-42);
/// assert_eq!(buf.as_bytes(), b"n=-42");
/// ```
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    /// Checks out an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Buffer {
            bytes: storage().get(),
        }
    }

    #[inline]
    pub fn append_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    #[inline]
    pub fn append_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn append_int(&mut self, v: i64) {
        self.bytes
            .extend_from_slice(itoa::Buffer::new().format(v).as_bytes());
    }

    #[inline]
    pub fn append_uint(&mut self, v: u64) {
        self.bytes
            .extend_from_slice(itoa::Buffer::new().format(v).as_bytes());
    }

    #[inline]
    pub fn append_bool(&mut self, v: bool) {
        self.append_str(if v { "true" } else { "false" });
    }

    /// Appends a finite float in shortest round-trip decimal form, without
    /// an exponent, at the given bit width (32 or 64).
    ///
    /// Non-finite values are written as `NaN`, `+Inf` and `-Inf`; callers that
    /// need them quoted handle that themselves.
    pub fn append_float(&mut self, v: f64, bits: u32) {
        if v.is_nan() {
            self.append_str("NaN");
        } else if v.is_infinite() {
            self.append_str(if v > 0.0 { "+Inf" } else { "-Inf" });
        } else if bits == 32 {
            let _ = write!(self.bytes, "{}", v as f32);
        } else {
            let _ = write!(self.bytes, "{}", v);
        }
    }

    /// Returns the last byte written, if any.
    #[inline]
    pub fn last_byte(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view; byte strings may carry invalid sequences verbatim.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Empties the buffer, keeping its storage.
    #[inline]
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Takes the bytes out; the storage is not returned to the pool.
    pub fn into_vec(mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        let mut copy = Buffer::new();
        copy.append_bytes(&self.bytes);
        copy
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        let bytes = std::mem::take(&mut self.bytes);
        if bytes.capacity() > 0 {
            storage().put(bytes);
        }
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.to_string_lossy()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        let mut buf = Buffer::new();
        buf.append_int(i64::MIN);
        buf.append_byte(b' ');
        buf.append_uint(u64::MAX);
        assert_eq!(
            buf.as_bytes(),
            b"-9223372036854775808 18446744073709551615"
        );
    }

    #[test]
    fn test_float_widths() {
        let mut buf = Buffer::new();
        buf.append_float(3.14f32 as f64, 32);
        assert_eq!(buf.as_bytes(), b"3.14");

        buf.reset();
        buf.append_float(2.718281828, 64);
        assert_eq!(buf.as_bytes(), b"2.718281828");

        buf.reset();
        buf.append_float(1e21, 64);
        assert_eq!(buf.as_bytes(), b"1000000000000000000000");

        buf.reset();
        buf.append_float(3.0, 64);
        assert_eq!(buf.as_bytes(), b"3");
    }

    #[test]
    fn test_float_specials() {
        let mut buf = Buffer::new();
        buf.append_float(f64::NAN, 64);
        buf.append_float(f64::INFINITY, 64);
        buf.append_float(f64::NEG_INFINITY, 64);
        assert_eq!(buf.as_bytes(), b"NaN+Inf-Inf");
    }

    #[test]
    fn test_last_byte_and_truncate() {
        let mut buf = Buffer::new();
        assert_eq!(buf.last_byte(), None);
        buf.append_str("a=[");
        assert_eq!(buf.last_byte(), Some(b'['));
        buf.truncate(1);
        assert_eq!(buf.as_bytes(), b"a");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut buf = Buffer::new();
        buf.append_str("x");
        let mut copy = buf.clone();
        copy.append_str("y");
        assert_eq!(buf.as_bytes(), b"x");
        assert_eq!(copy.as_bytes(), b"xy");
    }
}
