//! # gvariant
//!
//! Self-describing typed values with a compact, alignment-aware binary wire
//! format and a human-readable text form.
//!
//! ## What is a variant?
//!
//! A [`Value`] pairs data with a [`VariantType`], a short type string such as
//! `i` (int32), `as` (array of strings) or `a{sv}` (a dictionary of boxed
//! values). The binary form carries no type information, so it is compact
//! and any child can be reached without decoding its siblings.
//!
//! ## Key Features
//!
//! - **Zero-copy loading**: children of a loaded value share its buffer
//! - **Safe on untrusted input**: malformed data never fails or panics; readers
//!   fall back to well-defined defaults, see [`format`]
//! - **Normal form**: validation, canonicalisation and byte swapping
//! - **Text format**: a literal syntax with optional type annotations that
//!   round-trips every value
//! - **Builders**: [`VariantBuilder`], [`VariantDict`] and the [`variant!`] macro
//!
//! ## Quick Start
//!
//! ```rust
//! use gvariant::{from_bytes, to_bytes, Value, VariantType};
//!
//! let value = Value::new_tuple(vec![
//!     Value::new_int32(500),
//!     Value::new_string("hi").unwrap(),
//! ]);
//! assert_eq!(value.type_string(), "(is)");
//!
//! let bytes = to_bytes(&value);
//! assert_eq!(bytes, [0xf4, 0x01, 0, 0, b'h', b'i', 0]);
//!
//! let loaded = from_bytes(&VariantType::new("(is)").unwrap(), bytes).unwrap();
//! assert_eq!(loaded, value);
//! assert_eq!(loaded.child(1).unwrap().as_str(), Some("hi"));
//! ```
//!
//! ### Text format
//!
//! ```rust
//! use gvariant::{from_text, to_text, Value};
//!
//! let value = from_text("{'width': <500>, 'title': <'main'>}").unwrap();
//! assert_eq!(value.type_string(), "a{sv}");
//! assert_eq!(value.lookup_value("width", None), Some(Value::new_int32(500)));
//! assert_eq!(to_text(&value), "{'width': <500>, 'title': <'main'>}");
//! ```
//!
//! ### Building values
//!
//! ```rust
//! use gvariant::variant;
//!
//! let value = variant!((1u8, ["a", "b"], {"k": true})).unwrap();
//! assert_eq!(value.type_string(), "(yasa{sb})");
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: type cache activity at debug
//! level, fallbacks on untrusted data at trace level. No logger is installed.
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - building, storing and loading values
//! - **`text_format.rs`** - printing and parsing with type annotations
//! - **`dynamic_values.rs`** - walking values of unknown type
//! - **`untrusted_data.rs`** - loading malformed data and normal form
//!
//! Run any demo with: `cargo run --example <name>`

pub mod builder;
pub mod dict;
pub mod error;
pub mod format;
pub mod macros;
pub mod options;
mod parse;
mod print;
pub mod serialised;
pub mod type_info;
pub mod value;
pub mod variant_type;

pub use builder::VariantBuilder;
pub use bytes::Bytes;
pub use dict::VariantDict;
pub use error::{Error, Result};
pub use options::{ParseOptions, PrintOptions};
pub use type_info::{MemberEnding, MemberInfo, TypeInfo, TypeInfoCache};
pub use value::{Children, Class, ToVariant, Value};
pub use variant_type::{is_object_path, is_signature, VariantType};

use std::io;

/// Maximum nesting depth of types, serialised variants and text input.
pub const MAX_DEPTH: usize = 128;

/// Serialises `value` into a new buffer.
///
/// # Examples
///
/// ```rust
/// use gvariant::{to_bytes, Value};
///
/// assert_eq!(to_bytes(&Value::new_uint16(0x0102)), [0x02, 0x01]);
/// ```
#[must_use]
pub fn to_bytes(value: &Value) -> Vec<u8> {
    value.data().to_vec()
}

/// Loads untrusted serialised data as a value of type `ty`.
///
/// The data is not validated up front; malformed parts read as defaults.
///
/// # Errors
///
/// Returns [`Error::AmbiguousType`] if `ty` is not definite.
pub fn from_bytes(ty: &VariantType, bytes: impl Into<Bytes>) -> Result<Value> {
    Value::from_bytes(ty, bytes, false)
}

/// Loads data the caller guarantees to be in normal form.
///
/// Trusted data skips validation in [`Value::normal_form`]; passing data
/// that is not in normal form gives unspecified (but memory-safe) results.
///
/// # Errors
///
/// Returns [`Error::AmbiguousType`] if `ty` is not definite.
pub fn from_bytes_trusted(ty: &VariantType, bytes: impl Into<Bytes>) -> Result<Value> {
    Value::from_bytes(ty, bytes, true)
}

/// Writes the serialised form of `value` to `writer`.
///
/// # Examples
///
/// ```rust
/// use gvariant::{to_writer, Value};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Value::new_string("ab").unwrap()).unwrap();
/// assert_eq!(buffer, b"ab\0");
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, value: &Value) -> Result<()>
where
    W: io::Write,
{
    writer
        .write_all(&value.data())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Reads `reader` to the end and loads the bytes as an untrusted value of
/// type `ty`.
///
/// # Examples
///
/// ```rust
/// use gvariant::{from_reader, VariantType};
/// use std::io::Cursor;
///
/// let value = from_reader(Cursor::new(b"ab\0"), &VariantType::STRING).unwrap();
/// assert_eq!(value.as_str(), Some("ab"));
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails and [`Error::AmbiguousType`] if
/// `ty` is not definite.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R, ty: &VariantType) -> Result<Value>
where
    R: io::Read,
{
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_bytes(ty, data)
}

/// Prints `value` in the text format without type annotations.
#[must_use]
pub fn to_text(value: &Value) -> String {
    to_text_with_options(value, PrintOptions::default())
}

/// Prints `value` in the text format.
///
/// # Examples
///
/// ```rust
/// use gvariant::{to_text_with_options, PrintOptions, Value, VariantType};
///
/// let empty = Value::new_array(Some(&VariantType::STRING), vec![]).unwrap();
/// assert_eq!(to_text_with_options(&empty, PrintOptions::annotated()), "@as []");
/// ```
#[must_use]
pub fn to_text_with_options(value: &Value, options: PrintOptions) -> String {
    print::print(value, &options)
}

/// Parses text, inferring the type from the text alone.
///
/// # Errors
///
/// Returns [`Error::Parse`] with the byte position of the problem.
pub fn from_text(text: &str) -> Result<Value> {
    from_text_with_options(text, ParseOptions::default())
}

/// Parses text as a value of type `ty`, which may be a pattern.
///
/// # Examples
///
/// ```rust
/// use gvariant::{from_text_with_type, VariantType};
///
/// let value = from_text_with_type("[1, 2]", &VariantType::new("aq").unwrap()).unwrap();
/// assert_eq!(value.type_string(), "aq");
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] if the text is malformed or does not fit `ty`.
pub fn from_text_with_type(text: &str, ty: &VariantType) -> Result<Value> {
    from_text_with_options(text, ParseOptions::new().with_type(ty.clone()))
}

/// Parses text with custom options.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the text is malformed, nests deeper than
/// `options.max_depth` or does not fit `options.expected_type`.
pub fn from_text_with_options(text: &str, options: ParseOptions) -> Result<Value> {
    parse::parse(text, &options)
}
