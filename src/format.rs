//! Pluggable formatters for entry header values.
//!
//! Each formatter writes through a [`PrimitiveArrayEncoder`], so it can emit a
//! string, a number, or nothing at all. When a formatter writes nothing the text
//! encoder falls back to its built-in rendering.
//!
//! The named variants deserialize from snake_case strings, which lets an
//! [`EncoderConfig`](crate::EncoderConfig) be read from a configuration file:
//!
//! ```rust
//! use serde_logtext::TimeFormat;
//!
//! let fmt: TimeFormat = serde_json::from_str(r#""epoch_millis""#).unwrap();
//! assert!(matches!(fmt, TimeFormat::EpochMillis));
//!
//! let fmt: TimeFormat = serde_json::from_str(r#"{"layout":"%Y"}"#).unwrap();
//! assert!(matches!(fmt, TimeFormat::Layout(ref l) if l == "%Y"));
//! ```

use crate::entry::{Caller, Level};
use crate::PrimitiveArrayEncoder;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::Deserialize;
use std::fmt::{self, Write};
use std::sync::Arc;

pub type TimeFn = dyn Fn(DateTime<Utc>, &mut dyn PrimitiveArrayEncoder) + Send + Sync;
pub type DurationFn = dyn Fn(TimeDelta, &mut dyn PrimitiveArrayEncoder) + Send + Sync;
pub type LevelFn = dyn Fn(Level, &mut dyn PrimitiveArrayEncoder) + Send + Sync;
pub type CallerFn = dyn Fn(&Caller, &mut dyn PrimitiveArrayEncoder) + Send + Sync;

/// How timestamps are rendered.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `2006-01-02T15:04:05Z`
    Rfc3339,
    /// RFC3339 with as many fractional digits as needed.
    Rfc3339Nano,
    /// `2006-01-02T15:04:05.000+0000`
    #[default]
    Iso8601,
    /// Floating-point seconds since the Unix epoch.
    EpochSeconds,
    /// Floating-point milliseconds since the Unix epoch.
    EpochMillis,
    /// Integer nanoseconds since the Unix epoch.
    EpochNanos,
    /// A `strftime`-style layout, as understood by `chrono`.
    Layout(String),
    #[serde(skip_deserializing)]
    Custom(Arc<TimeFn>),
}

impl TimeFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(DateTime<Utc>, &mut dyn PrimitiveArrayEncoder) + Send + Sync + 'static,
    {
        TimeFormat::Custom(Arc::new(f))
    }

    pub fn encode(&self, t: DateTime<Utc>, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            TimeFormat::Rfc3339 => enc.append_string(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            TimeFormat::Rfc3339Nano => {
                enc.append_string(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            TimeFormat::Iso8601 => {
                enc.append_string(&t.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string())
            }
            TimeFormat::EpochSeconds => {
                let secs = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9;
                enc.append_float64(secs);
            }
            TimeFormat::EpochMillis => {
                let millis = t.timestamp_millis() as f64
                    + f64::from(t.timestamp_subsec_nanos() % 1_000_000) / 1e6;
                enc.append_float64(millis);
            }
            TimeFormat::EpochNanos => {
                // Out of range for i64 nanoseconds: leave it to the fallback.
                if let Some(nanos) = t.timestamp_nanos_opt() {
                    enc.append_int64(nanos);
                }
            }
            TimeFormat::Layout(layout) => {
                let mut out = String::new();
                if write!(out, "{}", t.format(layout)).is_ok() {
                    enc.append_string(&out);
                }
            }
            TimeFormat::Custom(f) => f(t, enc),
        }
    }
}

impl fmt::Debug for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::Rfc3339 => f.write_str("Rfc3339"),
            TimeFormat::Rfc3339Nano => f.write_str("Rfc3339Nano"),
            TimeFormat::Iso8601 => f.write_str("Iso8601"),
            TimeFormat::EpochSeconds => f.write_str("EpochSeconds"),
            TimeFormat::EpochMillis => f.write_str("EpochMillis"),
            TimeFormat::EpochNanos => f.write_str("EpochNanos"),
            TimeFormat::Layout(layout) => f.debug_tuple("Layout").field(layout).finish(),
            TimeFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How durations are rendered.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    /// Floating-point seconds.
    Seconds,
    /// Integer milliseconds.
    Millis,
    /// Integer nanoseconds.
    Nanos,
    /// Human-readable, e.g. `1m30s` or `1.5ms`.
    String,
    #[serde(skip_deserializing)]
    Custom(Arc<DurationFn>),
}

impl DurationFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(TimeDelta, &mut dyn PrimitiveArrayEncoder) + Send + Sync + 'static,
    {
        DurationFormat::Custom(Arc::new(f))
    }

    pub fn encode(&self, d: TimeDelta, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            DurationFormat::Seconds => enc.append_float64(saturating_nanos(d) as f64 / 1e9),
            DurationFormat::Millis => enc.append_int64(saturating_nanos(d) / 1_000_000),
            DurationFormat::Nanos => enc.append_int64(saturating_nanos(d)),
            DurationFormat::String => enc.append_string(&duration_string(d)),
            DurationFormat::Custom(f) => f(d, enc),
        }
    }
}

impl fmt::Debug for DurationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationFormat::Seconds => f.write_str("Seconds"),
            DurationFormat::Millis => f.write_str("Millis"),
            DurationFormat::Nanos => f.write_str("Nanos"),
            DurationFormat::String => f.write_str("String"),
            DurationFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How levels are rendered.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelFormat {
    /// `INFO`
    #[default]
    Capital,
    /// `INFO` wrapped in ANSI color codes.
    CapitalColor,
    /// `info`
    Lowercase,
    /// `info` wrapped in ANSI color codes.
    LowercaseColor,
    #[serde(skip_deserializing)]
    Custom(Arc<LevelFn>),
}

impl LevelFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Level, &mut dyn PrimitiveArrayEncoder) + Send + Sync + 'static,
    {
        LevelFormat::Custom(Arc::new(f))
    }

    pub fn encode(&self, level: Level, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            LevelFormat::Capital => enc.append_string(level.as_capital_str()),
            LevelFormat::CapitalColor => enc.append_string(&colored(level, level.as_capital_str())),
            LevelFormat::Lowercase => enc.append_string(level.as_str()),
            LevelFormat::LowercaseColor => enc.append_string(&colored(level, level.as_str())),
            LevelFormat::Custom(f) => f(level, enc),
        }
    }
}

fn colored(level: Level, name: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", level.color(), name)
}

impl fmt::Debug for LevelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFormat::Capital => f.write_str("Capital"),
            LevelFormat::CapitalColor => f.write_str("CapitalColor"),
            LevelFormat::Lowercase => f.write_str("Lowercase"),
            LevelFormat::LowercaseColor => f.write_str("LowercaseColor"),
            LevelFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How caller locations are rendered.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerFormat {
    /// `dir/file.rs:42`
    #[default]
    Short,
    /// `/full/path/to/dir/file.rs:42`
    Full,
    #[serde(skip_deserializing)]
    Custom(Arc<CallerFn>),
}

impl CallerFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Caller, &mut dyn PrimitiveArrayEncoder) + Send + Sync + 'static,
    {
        CallerFormat::Custom(Arc::new(f))
    }

    pub fn encode(&self, caller: &Caller, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            CallerFormat::Short => enc.append_string(&caller.trimmed_path()),
            CallerFormat::Full => enc.append_string(&caller.full_path()),
            CallerFormat::Custom(f) => f(caller, enc),
        }
    }
}

impl fmt::Debug for CallerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerFormat::Short => f.write_str("Short"),
            CallerFormat::Full => f.write_str("Full"),
            CallerFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Whole nanoseconds in `d`, clamped to the `i64` range.
pub(crate) fn saturating_nanos(d: TimeDelta) -> i64 {
    d.num_nanoseconds()
        .unwrap_or(if d < TimeDelta::zero() { i64::MIN } else { i64::MAX })
}

/// Renders a duration as `72h3m0.5s`, `1.5ms`, `250ns` and so on.
///
/// Units larger than hours are never used. Fractions drop trailing zeros.
pub fn duration_string(d: TimeDelta) -> String {
    let nanos = saturating_nanos(d);
    if nanos == 0 {
        return "0s".to_string();
    }
    let u = nanos.unsigned_abs();
    let mut out = String::with_capacity(16);
    if nanos < 0 {
        out.push('-');
    }

    if u < 1_000_000_000 {
        let (digits, unit) = match u {
            0..=999 => (0, "ns"),
            1_000..=999_999 => (3, "µs"),
            _ => (6, "ms"),
        };
        push_fraction(&mut out, u, digits);
        out.push_str(unit);
        return out;
    }

    let secs = u / 1_000_000_000;
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        let _ = write!(out, "{}h{}m", hours, minutes);
    } else if minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    push_fraction(&mut out, seconds * 1_000_000_000 + u % 1_000_000_000, 9);
    out.push('s');
    out
}

/// Writes `v / 10^digits` with trailing fractional zeros removed.
fn push_fraction(out: &mut String, v: u64, digits: u32) {
    let scale = 10u64.pow(digits);
    let _ = write!(out, "{}", v / scale);
    let rem = v % scale;
    if rem != 0 {
        let frac = format!("{:0width$}", rem, width = digits as usize);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
}
