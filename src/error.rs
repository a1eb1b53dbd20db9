//! Error types for building, loading and parsing values.
//!
//! ## Error Categories
//!
//! - **Type errors**: malformed type strings, mismatched or ambiguous container types
//! - **String errors**: invalid UTF-8, embedded NUL bytes, bad object paths or signatures
//! - **Access errors**: child indices out of range, wrongly sized output buffers
//! - **Text errors**: malformed text-format input, reported with a byte position
//!
//! Malformed *serialised* data is never an error: readers fall back to
//! well-defined defaults instead (see [`crate::Value::normal_form`]).
//!
//! ## Examples
//!
//! ```rust
//! use gvariant::{Error, VariantType};
//!
//! let err = VariantType::new("a{vs}").unwrap_err();
//! assert!(matches!(err, Error::MalformedType { .. }));
//! ```

use thiserror::Error;

/// Represents every error the crate can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A type string violates the type grammar.
    #[error("malformed type string {type_string:?} at byte {position}: {reason}")]
    MalformedType {
        type_string: String,
        position: usize,
        reason: String,
    },

    /// A value of one type was supplied where another was required.
    #[error("type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// A type could not be determined, or an indefinite type was used where a
    /// definite one is required.
    #[error("ambiguous type: {0}")]
    AmbiguousType(String),

    /// String content is not valid UTF-8.
    #[error("invalid UTF-8 in string data after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },

    /// String content is UTF-8 but not acceptable for its kind.
    #[error("invalid {kind}: {reason}")]
    InvalidString { kind: &'static str, reason: String },

    /// A child index is past the end of a container.
    #[error("index {index} out of bounds for container with {len} children")]
    OutOfBounds { index: usize, len: usize },

    /// An output buffer does not have the serialised size of the value.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Text-format input could not be parsed.
    #[error("parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a malformed type error for `type_string`, pointing at `position`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::Error;
    ///
    /// let err = Error::malformed_type("a(i", 3, "unterminated tuple");
    /// assert!(err.to_string().contains("byte 3"));
    /// ```
    pub fn malformed_type(type_string: &str, position: usize, reason: &str) -> Self {
        Error::MalformedType {
            type_string: type_string.to_string(),
            position,
            reason: reason.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::Error;
    ///
    /// let err = Error::type_mismatch("i", "s");
    /// assert!(err.to_string().contains("expected 'i'"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an ambiguous type error.
    pub fn ambiguous(msg: &str) -> Self {
        Error::AmbiguousType(msg.to_string())
    }

    /// Creates an invalid string error for the given kind of string.
    pub fn invalid_string(kind: &'static str, reason: &str) -> Self {
        Error::InvalidString {
            kind,
            reason: reason.to_string(),
        }
    }

    /// Creates a text-format parse error at byte `position` of the input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::Error;
    ///
    /// let err = Error::parse(7, "expected ']'");
    /// assert_eq!(err.position(), Some(7));
    /// ```
    pub fn parse(position: usize, message: &str) -> Self {
        Error::Parse {
            position,
            message: message.to_string(),
        }
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the input position for errors that carry one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::MalformedType { position, .. } | Error::Parse { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
