//! Log entry header types.
//!
//! An [`Entry`] is the fixed metadata of one log line: when it happened, how
//! severe it is, the message, and optionally where it came from. The host
//! logger builds one per call and hands it to
//! [`Encoder::encode_entry`](crate::Encoder::encode_entry) together with the
//! call's fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Panics in development builds only
    DPanic,
    Panic,
    Fatal,
}

impl Level {
    /// Lowercase name, e.g. `info`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    /// Uppercase name, e.g. `INFO`.
    pub const fn as_capital_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// ANSI color code used by the colored level formats.
    pub(crate) const fn color(&self) -> u8 {
        match self {
            Level::Debug => 35,
            Level::Info => 34,
            Level::Warn => 33,
            _ => 31,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location of the logging call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Caller {
            file: file.into(),
            line,
            function: String::new(),
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// `file:line` with the full path.
    pub fn full_path(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// `dir/file:line`, keeping only the last directory of the path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_logtext::Caller;
    ///
    /// let caller = Caller::new("/path/to/file.go", 123);
    /// assert_eq!(caller.trimmed_path(), "to/file.go:123");
    /// ```
    pub fn trimmed_path(&self) -> String {
        let file = self.file.as_str();
        let start = file
            .rfind('/')
            .and_then(|last| file[..last].rfind('/'))
            .map_or(0, |idx| idx + 1);
        format!("{}:{}", &file[start..], self.line)
    }
}

/// Header of one log line.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: String,
    pub message: String,
    pub caller: Option<Caller>,
    pub stack: String,
}

impl Entry {
    /// Creates an entry stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Entry {
            level,
            time: Utc::now(),
            logger_name: String::new(),
            message: message.into(),
            caller: None,
            stack: String::new(),
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}
