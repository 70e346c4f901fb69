//! Error types for field and value encoding.
//!
//! Both encoders report failures through the single [`Error`] enum.
//!
//! ## Error Categories
//!
//! - **Marshal errors**: a caller-supplied array or object marshaler failed
//! - **Depth errors**: the reflective encoder walked deeper than its limit
//! - **I/O errors**: the destination writer rejected the output
//! - **Unsupported types**: a value has no text form (e.g. a map keyed by a struct)
//!
//! `Error` is `Clone` because the reflective encoder keeps the first failure
//! and hands it back on every later call until it is reset.
//!
//! ## Examples
//!
//! ```rust
//! use serde_logtext::Error;
//!
//! let err = Error::depth_exceeded(32);
//! assert_eq!(err.to_string(), "maximum encoding depth exceeded: 32");
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A caller-supplied array or object marshaler reported failure
    #[error("marshal error: {0}")]
    Marshal(String),

    /// Recursion went past the configured maximum depth
    #[error("maximum encoding depth exceeded: {limit}")]
    DepthExceeded { limit: usize },

    /// The destination writer failed
    #[error("IO error: {0}")]
    Io(String),

    /// Value has no text representation
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a marshaler failure.
    ///
    /// Marshalers return this to abort the field they are populating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_logtext::Error;
    ///
    /// let err = Error::marshal("user has no id");
    /// assert!(err.to_string().contains("user has no id"));
    /// ```
    pub fn marshal<T: fmt::Display>(msg: T) -> Self {
        Error::Marshal(msg.to_string())
    }

    /// Creates a depth-exceeded error naming the configured limit.
    pub fn depth_exceeded(limit: usize) -> Self {
        Error::DepthExceeded { limit }
    }

    /// Creates an I/O error for writer failures.
    ///
    /// `From<io::Error>` goes through here, so `?` on a writer call yields the
    /// same error as calling this directly.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` if this error came from the depth guard.
    #[must_use]
    pub const fn is_depth_exceeded(&self) -> bool {
        matches!(self, Error::DepthExceeded { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
