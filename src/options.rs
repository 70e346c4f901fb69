//! Configuration for the text and reflective encoders.
//!
//! - [`EncoderConfig`]: header keys and formatters used by [`TextEncoder`](crate::TextEncoder)
//! - [`ReflectOptions`]: depth limit and escaping used by [`ReflectEncoder`](crate::ReflectEncoder)
//!
//! ## Examples
//!
//! ```rust
//! use serde_logtext::{EncoderConfig, DurationFormat, LevelFormat};
//!
//! let config = EncoderConfig::new()
//!     .with_time_key("")
//!     .with_level_format(LevelFormat::Lowercase)
//!     .with_duration_format(DurationFormat::String);
//! assert!(config.time_key.is_empty());
//!
//! // Or from a configuration file; unset keys keep their defaults.
//! let config: EncoderConfig = serde_json::from_str(r#"{"message_key":"message"}"#).unwrap();
//! assert_eq!(config.message_key, "message");
//! assert_eq!(config.level_key, "level");
//! ```

use crate::format::{CallerFormat, DurationFormat, LevelFormat, TimeFormat};
use serde::Deserialize;

/// Default nesting limit of the reflective encoder.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Header keys and formatters for the text encoder.
///
/// An empty key leaves that header field out. A formatter set to `None` means
/// the encoder uses its fallback rendering.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub function_key: String,
    pub message_key: String,
    pub stacktrace_key: String,

    #[serde(rename = "time_format")]
    pub encode_time: Option<TimeFormat>,
    #[serde(rename = "duration_format")]
    pub encode_duration: Option<DurationFormat>,
    #[serde(rename = "level_format")]
    pub encode_level: Option<LevelFormat>,
    #[serde(rename = "caller_format")]
    pub encode_caller: Option<CallerFormat>,

    /// Wrap nested objects in `{` `}`.
    pub bracket_objects: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            time_key: "ts".to_string(),
            level_key: "level".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            function_key: String::new(),
            message_key: "msg".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            encode_time: Some(TimeFormat::Iso8601),
            encode_duration: None,
            encode_level: Some(LevelFormat::Capital),
            encode_caller: Some(CallerFormat::Short),
            bracket_objects: false,
        }
    }
}

impl EncoderConfig {
    /// Creates the production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every header key and formatter switched off.
    ///
    /// Handy for encoding bare field lists.
    #[must_use]
    pub fn bare() -> Self {
        EncoderConfig {
            time_key: String::new(),
            level_key: String::new(),
            name_key: String::new(),
            caller_key: String::new(),
            function_key: String::new(),
            message_key: String::new(),
            stacktrace_key: String::new(),
            encode_time: None,
            encode_duration: None,
            encode_level: None,
            encode_caller: None,
            bracket_objects: false,
        }
    }

    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    #[must_use]
    pub fn with_level_key(mut self, key: impl Into<String>) -> Self {
        self.level_key = key.into();
        self
    }

    #[must_use]
    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = key.into();
        self
    }

    #[must_use]
    pub fn with_caller_key(mut self, key: impl Into<String>) -> Self {
        self.caller_key = key.into();
        self
    }

    #[must_use]
    pub fn with_function_key(mut self, key: impl Into<String>) -> Self {
        self.function_key = key.into();
        self
    }

    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }

    #[must_use]
    pub fn with_stacktrace_key(mut self, key: impl Into<String>) -> Self {
        self.stacktrace_key = key.into();
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: TimeFormat) -> Self {
        self.encode_time = Some(format);
        self
    }

    #[must_use]
    pub fn with_duration_format(mut self, format: DurationFormat) -> Self {
        self.encode_duration = Some(format);
        self
    }

    #[must_use]
    pub fn with_level_format(mut self, format: LevelFormat) -> Self {
        self.encode_level = Some(format);
        self
    }

    #[must_use]
    pub fn with_caller_format(mut self, format: CallerFormat) -> Self {
        self.encode_caller = Some(format);
        self
    }

    /// Enables or disables `{` `}` around nested objects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_logtext::EncoderConfig;
    ///
    /// let config = EncoderConfig::new().with_bracket_objects(true);
    /// assert!(config.bracket_objects);
    /// ```
    #[must_use]
    pub fn with_bracket_objects(mut self, enabled: bool) -> Self {
        self.bracket_objects = enabled;
        self
    }
}

/// Settings for the reflective encoder.
///
/// # Examples
///
/// ```rust
/// use serde_logtext::ReflectOptions;
///
/// let options = ReflectOptions::new().with_max_depth(8).with_escape_html(false);
/// assert_eq!(options.max_depth, 8);
/// assert!(!options.escape_html);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReflectOptions {
    /// Maximum number of nested sequences, mappings and records.
    pub max_depth: usize,
    /// Escape `<`, `>` and `&` as `\u003c`, `\u003e` and `\u0026`.
    pub escape_html: bool,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        ReflectOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            escape_html: true,
        }
    }
}

impl ReflectOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depth limit. Zero is ignored.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        if max_depth > 0 {
            self.max_depth = max_depth;
        }
        self
    }

    #[must_use]
    pub fn with_escape_html(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }
}
