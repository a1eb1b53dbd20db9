//! The immutable, reference-counted tagged value.
//!
//! A [`Value`] is held in one of two forms:
//!
//! - **tree form**: a container built from child values, serialised lazily
//!   the first time its bytes are requested;
//! - **serialised form**: a view of a shared [`Bytes`] buffer plus a type.
//!   Children are located on demand and share the same buffer.
//!
//! Leaf values (numbers, strings) are always held in serialised form.
//!
//! ## Floating references
//!
//! Values returned by the `new_*` constructors start out *floating*: not yet
//! claimed by any owner. Container constructors [`sink`](Value::sink) every
//! child they accept, so builder-style code can nest constructors directly:
//!
//! ```rust
//! use gvariant::Value;
//!
//! let tuple = Value::new_tuple(vec![
//!     Value::new_int32(500),
//!     Value::new_string("hi").unwrap(),
//! ]);
//! assert!(tuple.is_floating());
//! assert!(!tuple.child(0).unwrap().is_floating());
//! ```
//!
//! ## Untrusted data
//!
//! Values loaded from untrusted bytes never fail to read. Malformed framing
//! produces zero-filled or empty children, and malformed strings read as `""`
//! (or `"/"` for object paths). [`Value::normal_form`] returns a value that is
//! guaranteed to be well formed.

use crate::serialised::{self, Filler};
use crate::type_info::{self, TypeInfo};
use crate::variant_type::{is_object_path, is_signature};
use crate::{Error, ParseOptions, PrintOptions, Result, VariantType};
use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

static ZEROS: [u8; 64] = [0; 64];

/// A buffer of `len` zero bytes, used in place of unreadable data.
fn zeroed(len: usize) -> Bytes {
    match ZEROS.get(..len) {
        Some(zeros) => Bytes::from_static(zeros),
        None => Bytes::from(vec![0u8; len]),
    }
}

/// The kind of a value, determined by the first character of its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Boolean,
    Byte,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Handle,
    Double,
    String,
    ObjectPath,
    Signature,
    Variant,
    Maybe,
    Array,
    Tuple,
    DictEntry,
}

impl Class {
    fn of(type_string: &str) -> Class {
        match type_string.as_bytes()[0] {
            b'b' => Class::Boolean,
            b'y' => Class::Byte,
            b'n' => Class::Int16,
            b'q' => Class::Uint16,
            b'i' => Class::Int32,
            b'u' => Class::Uint32,
            b'x' => Class::Int64,
            b't' => Class::Uint64,
            b'h' => Class::Handle,
            b'd' => Class::Double,
            b's' => Class::String,
            b'o' => Class::ObjectPath,
            b'g' => Class::Signature,
            b'v' => Class::Variant,
            b'm' => Class::Maybe,
            b'a' => Class::Array,
            b'{' => Class::DictEntry,
            _ => Class::Tuple,
        }
    }

    /// Returns `true` for the classes that hold child values.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Class::Variant | Class::Maybe | Class::Array | Class::Tuple | Class::DictEntry
        )
    }

    /// Returns `true` for the classes that may be compared with [`Value::compare`].
    #[must_use]
    pub fn is_basic(self) -> bool {
        !self.is_container()
    }
}

enum Repr {
    Tree {
        children: Box<[Value]>,
        serialised: OnceLock<Bytes>,
    },
    Serialised {
        bytes: Bytes,
    },
}

struct ValueInner {
    type_info: TypeInfo,
    repr: Repr,
    floating: AtomicBool,
    trusted: AtomicBool,
    depth: usize,
    size: OnceLock<usize>,
}

/// An immutable, self-describing value.
///
/// Cloning a `Value` adds a reference; the data is shared. Values are `Send`
/// and `Sync` and may be read from many threads at once.
#[derive(Clone)]
pub struct Value(Arc<ValueInner>);

macro_rules! fixed_value {
    ($($(#[$meta:meta])* $new:ident, $get:ident, $ty:ty, $vt:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $new(value: $ty) -> Value {
                Value::leaf(&VariantType::$vt, Bytes::copy_from_slice(&value.to_ne_bytes()))
            }

            #[doc = concat!("Returns the value if this is a `", stringify!($vt), "` value.")]
            #[must_use]
            pub fn $get(&self) -> Option<$ty> {
                if self.type_string() != VariantType::$vt.as_str() {
                    return None;
                }
                Some(<$ty>::from_ne_bytes(self.fixed_bytes()))
            }
        )*
    };
}

impl Value {
    fn from_parts(type_info: TypeInfo, repr: Repr, trusted: bool, depth: usize) -> Value {
        Value(Arc::new(ValueInner {
            type_info,
            repr,
            floating: AtomicBool::new(true),
            trusted: AtomicBool::new(trusted),
            depth,
            size: OnceLock::new(),
        }))
    }

    fn leaf(ty: &VariantType, bytes: Bytes) -> Value {
        Value::from_parts(
            type_info::intern_definite(ty),
            Repr::Serialised { bytes },
            true,
            0,
        )
    }

    fn tree(type_info: TypeInfo, children: Vec<Value>) -> Value {
        let children: Box<[Value]> = children.into_iter().map(Value::sink).collect();
        let trusted = children.iter().all(Value::is_trusted);
        Value::from_parts(
            type_info,
            Repr::Tree {
                children,
                serialised: OnceLock::new(),
            },
            trusted,
            0,
        )
    }

    fn owned(self) -> Value {
        self.0.floating.store(false, AtomicOrdering::Release);
        self
    }

    // --- Scalar constructors ---

    /// Creates a boolean value.
    pub fn new_boolean(value: bool) -> Value {
        Value::leaf(&VariantType::BOOLEAN, Bytes::from(vec![u8::from(value)]))
    }

    fixed_value! {
        /// Creates a byte value.
        new_byte, as_byte, u8, BYTE;
        /// Creates a signed 16-bit value.
        new_int16, as_int16, i16, INT16;
        /// Creates an unsigned 16-bit value.
        new_uint16, as_uint16, u16, UINT16;
        /// Creates a signed 32-bit value.
        ///
        /// ```rust
        /// use gvariant::Value;
        ///
        /// let v = Value::new_int32(-7);
        /// assert_eq!(v.type_string(), "i");
        /// assert_eq!(v.as_int32(), Some(-7));
        /// assert_eq!(v.size(), 4);
        /// ```
        new_int32, as_int32, i32, INT32;
        /// Creates an unsigned 32-bit value.
        new_uint32, as_uint32, u32, UINT32;
        /// Creates a signed 64-bit value.
        new_int64, as_int64, i64, INT64;
        /// Creates an unsigned 64-bit value.
        new_uint64, as_uint64, u64, UINT64;
        /// Creates a handle: an index into an out-of-band table of file descriptors.
        new_handle, as_handle, i32, HANDLE;
        /// Creates a double precision value.
        new_double, as_double, f64, DOUBLE;
    }

    fn new_text(ty: &VariantType, kind: &'static str, s: &str) -> Result<Value> {
        if s.contains('\0') {
            return Err(Error::invalid_string(kind, "embedded NUL byte"));
        }
        let mut bytes = Vec::with_capacity(s.len() + 1);
        bytes.extend_from_slice(s.as_bytes());
        bytes.push(0);
        Ok(Value::leaf(ty, Bytes::from(bytes)))
    }

    /// Creates a string value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if `s` contains a NUL byte.
    pub fn new_string(s: &str) -> Result<Value> {
        Value::new_text(&VariantType::STRING, "string", s)
    }

    /// Creates a string value from raw bytes, which must be UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] for invalid UTF-8 and
    /// [`Error::InvalidString`] for embedded NUL bytes.
    pub fn new_string_from_bytes(bytes: &[u8]) -> Result<Value> {
        Value::new_string(std::str::from_utf8(bytes)?)
    }

    /// Creates an object path value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if `path` is not a valid object path.
    pub fn new_object_path(path: &str) -> Result<Value> {
        if !is_object_path(path) {
            return Err(Error::invalid_string("object path", path));
        }
        Value::new_text(&VariantType::OBJECT_PATH, "object path", path)
    }

    /// Creates a signature value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if `signature` is not a valid signature.
    pub fn new_signature(signature: &str) -> Result<Value> {
        if !is_signature(signature) {
            return Err(Error::invalid_string("signature", signature));
        }
        Value::new_text(&VariantType::SIGNATURE, "signature", signature)
    }

    // --- Container constructors ---

    /// Boxes `value` in a variant.
    pub fn new_variant(value: Value) -> Value {
        Value::tree(
            type_info::intern_definite(&VariantType::VARIANT),
            vec![value],
        )
    }

    /// Creates a maybe value: `Just(child)` or `Nothing`.
    ///
    /// At least one of `child_type` and `child` must be given. When both are,
    /// `child_type` may be a pattern the child's type matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if the element type cannot be
    /// determined and [`Error::TypeMismatch`] if the child does not match
    /// `child_type`.
    pub fn new_maybe(child_type: Option<&VariantType>, child: Option<Value>) -> Result<Value> {
        let element = element_type(child_type, child.as_ref())?;
        let info = type_info::intern_definite(&VariantType::maybe(&element));
        Ok(Value::tree(info, child.into_iter().collect()))
    }

    /// Creates an array of `children`, each of which must have the same type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if `children` is empty and no definite
    /// `child_type` is given, and [`Error::TypeMismatch`] if any child's type
    /// differs from the element type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::{Error, Value, VariantType};
    ///
    /// let empty = Value::new_array(Some(&VariantType::STRING), vec![]).unwrap();
    /// assert_eq!(empty.type_string(), "as");
    /// assert_eq!(empty.size(), 0);
    ///
    /// assert!(matches!(Value::new_array(None, vec![]), Err(Error::AmbiguousType(_))));
    /// ```
    pub fn new_array(child_type: Option<&VariantType>, children: Vec<Value>) -> Result<Value> {
        let element = element_type(child_type, children.first())?;
        if let Some(odd) = children.iter().find(|c| c.variant_type() != &element) {
            return Err(Error::type_mismatch(element.as_str(), odd.type_string()));
        }
        let info = type_info::intern_definite(&VariantType::array(&element));
        Ok(Value::tree(info, children))
    }

    /// Creates a tuple of `children`. An empty vector gives the unit value `()`.
    pub fn new_tuple(children: Vec<Value>) -> Value {
        let types: Vec<VariantType> = children.iter().map(|c| c.variant_type().clone()).collect();
        let info = type_info::intern_definite(&VariantType::tuple(&types));
        Value::tree(info, children)
    }

    /// Creates a dictionary entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `key` is not of a basic type.
    pub fn new_dict_entry(key: Value, value: Value) -> Result<Value> {
        if !key.classify().is_basic() {
            return Err(Error::type_mismatch("?", key.type_string()));
        }
        let ty = VariantType::dict_entry(key.variant_type(), value.variant_type())?;
        Ok(Value::tree(type_info::intern_definite(&ty), vec![key, value]))
    }

    /// Creates a dictionary: an array of `{K V}` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `key_type` is not basic or an entry
    /// does not match the given types, and [`Error::AmbiguousType`] for
    /// indefinite types.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::{Value, VariantType};
    ///
    /// let dict = Value::new_dict(
    ///     &VariantType::STRING,
    ///     &VariantType::INT32,
    ///     vec![(Value::new_string("a").unwrap(), Value::new_int32(1))],
    /// )
    /// .unwrap();
    /// assert_eq!(dict.type_string(), "a{si}");
    /// ```
    pub fn new_dict(
        key_type: &VariantType,
        value_type: &VariantType,
        entries: Vec<(Value, Value)>,
    ) -> Result<Value> {
        let entry_type = VariantType::dict_entry(key_type, value_type)
            .map_err(|_| Error::type_mismatch("?", key_type.as_str()))?;
        let entries = entries
            .into_iter()
            .map(|(k, v)| Value::new_dict_entry(k, v))
            .collect::<Result<Vec<_>>>()?;
        Value::new_array(Some(&entry_type), entries)
    }

    /// Creates an array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if any string contains a NUL byte.
    pub fn new_strv<S: AsRef<str>>(strings: &[S]) -> Result<Value> {
        let children = strings
            .iter()
            .map(|s| Value::new_string(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Value::new_array(Some(&VariantType::STRING), children)
    }

    /// Creates an array of a fixed-size element type from its raw serialised
    /// elements, without building a child value per element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `element_type` is not fixed-size,
    /// [`Error::AmbiguousType`] if it is not definite and
    /// [`Error::BufferSize`] if `data` is not a whole number of elements.
    pub fn new_fixed_array(element_type: &VariantType, data: &[u8]) -> Result<Value> {
        let element = type_info::intern(element_type)?;
        let Some(fixed) = element.fixed_size() else {
            return Err(Error::type_mismatch("fixed-size element", element_type.as_str()));
        };
        if data.len() % fixed != 0 {
            return Err(Error::BufferSize {
                expected: data.len() - data.len() % fixed,
                actual: data.len(),
            });
        }
        let info = type_info::intern_definite(&VariantType::array(element_type));
        // Trusted only if every element is already normal.
        let trusted = serialised::is_normal(&info, data, 0);
        Ok(Value::from_parts(
            info,
            Repr::Serialised {
                bytes: Bytes::copy_from_slice(data),
            },
            trusted,
            0,
        ))
    }

    /// Loads a value of type `ty` from serialised bytes.
    ///
    /// With `trusted` set the bytes are assumed to be in normal form;
    /// otherwise every read validates lazily and falls back to defaults. Bytes
    /// of the wrong length for a fixed-size type are replaced by zeros.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if `ty` is not definite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::{Value, VariantType};
    ///
    /// let v = Value::from_bytes(&VariantType::new("as").unwrap(), b"ab\0c\0\x03\x05".to_vec(), false)
    ///     .unwrap();
    /// assert_eq!(v.n_children(), 2);
    /// assert_eq!(v.child(1).unwrap().as_str(), Some("c"));
    /// ```
    pub fn from_bytes(ty: &VariantType, bytes: impl Into<Bytes>, trusted: bool) -> Result<Value> {
        let info = type_info::intern(ty)?;
        let mut bytes = bytes.into();
        let mut trusted = trusted;
        if let Some(fixed) = info.fixed_size() {
            if bytes.len() != fixed {
                log::trace!(
                    "[value] {} bytes for fixed-size type '{}' ({} expected), zero-filling",
                    bytes.len(),
                    ty,
                    fixed
                );
                bytes = zeroed(fixed);
                trusted = true;
            }
        }
        Ok(Value::from_parts(info, Repr::Serialised { bytes }, trusted, 0))
    }

    // --- Reference discipline ---

    /// Claims a floating value.
    ///
    /// A floating value becomes owned and is returned without adding a
    /// reference. An owned value is returned unchanged; callers that want to
    /// keep their own reference pass a clone.
    ///
    /// ```rust
    /// use gvariant::Value;
    ///
    /// let v = Value::new_byte(1);
    /// assert!(v.is_floating());
    /// let v = v.sink();
    /// assert!(!v.is_floating());
    /// let count = v.ref_count();
    /// let v = v.sink();
    /// assert_eq!(v.ref_count(), count);
    /// ```
    #[must_use]
    pub fn sink(self) -> Value {
        self.claim();
        self
    }

    /// Clears the floating flag, returning `true` for the one caller that
    /// observed it set.
    fn claim(&self) -> bool {
        self.0.floating.swap(false, AtomicOrdering::AcqRel)
    }

    /// Claims a floating value like [`sink`](Value::sink), but without an
    /// atomic exchange.
    ///
    /// If another thread sinks the same floating value concurrently both
    /// parties may end up believing they claimed it. Callers must not race
    /// two claims on one floating value.
    #[must_use]
    pub fn take_ref(self) -> Value {
        if self.0.floating.load(AtomicOrdering::Acquire) {
            self.0.floating.store(false, AtomicOrdering::Release);
        }
        self
    }

    /// Returns `true` if the value has not been claimed by an owner yet.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.0.floating.load(AtomicOrdering::Acquire)
    }

    /// Number of live references to this value.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    // --- Type and structure ---

    #[inline]
    #[must_use]
    pub fn variant_type(&self) -> &VariantType {
        self.0.type_info.variant_type()
    }

    #[inline]
    #[must_use]
    pub fn type_string(&self) -> &str {
        self.0.type_info.type_string()
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> &TypeInfo {
        &self.0.type_info
    }

    #[must_use]
    pub fn classify(&self) -> Class {
        Class::of(self.type_string())
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.classify().is_container()
    }

    /// Returns `true` if the value is of type `ty`, which may be a pattern.
    #[must_use]
    pub fn is_of_type(&self, ty: &VariantType) -> bool {
        ty.matches(self.variant_type())
    }

    /// Returns `true` if the value is held in serialised form.
    #[must_use]
    pub fn is_serialised(&self) -> bool {
        matches!(self.0.repr, Repr::Serialised { .. })
    }

    fn is_trusted(&self) -> bool {
        self.0.trusted.load(AtomicOrdering::Acquire)
    }

    /// Number of children: array elements, tuple members, 0 or 1 for a maybe,
    /// 1 for a variant, 0 for basic values.
    #[must_use]
    pub fn n_children(&self) -> usize {
        match &self.0.repr {
            Repr::Tree { children, .. } => children.len(),
            Repr::Serialised { bytes } => serialised::n_children(&self.0.type_info, bytes),
        }
    }

    /// Returns child `index`.
    ///
    /// Children of a serialised value share its buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= self.n_children()`.
    pub fn child(&self, index: usize) -> Result<Value> {
        let len = self.n_children();
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
        match &self.0.repr {
            Repr::Tree { children, .. } => Ok(children[index].clone()),
            Repr::Serialised { bytes } => {
                let slot =
                    serialised::child_slot(&self.0.type_info, bytes, index, self.0.depth);
                let child_bytes = match slot.range {
                    Some(range) => bytes.slice(range),
                    None => {
                        log::trace!(
                            "[value] child {} of '{}' unreadable, using {} zero bytes",
                            index,
                            self.type_string(),
                            slot.fallback_size
                        );
                        zeroed(slot.fallback_size)
                    }
                };
                Ok(Value::from_parts(
                    slot.type_info,
                    Repr::Serialised { bytes: child_bytes },
                    self.is_trusted(),
                    self.0.depth + 1,
                )
                .owned())
            }
        }
    }

    /// Iterates over the children.
    pub fn iter(&self) -> Children<'_> {
        Children {
            value: self,
            index: 0,
            len: self.n_children(),
        }
    }

    /// Serialised size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        match &self.0.repr {
            Repr::Serialised { bytes } => bytes.len(),
            Repr::Tree { children, .. } => *self
                .0
                .size
                .get_or_init(|| serialised::needed_size(&self.0.type_info, &children[..])),
        }
    }

    /// Serialised bytes, serialising a tree-form value on first use.
    #[must_use]
    pub fn data(&self) -> Bytes {
        match &self.0.repr {
            Repr::Serialised { bytes } => bytes.clone(),
            Repr::Tree { serialised, .. } => serialised
                .get_or_init(|| {
                    let mut buf = vec![0; self.size()];
                    self.write_to(&mut buf);
                    Bytes::from(buf)
                })
                .clone(),
        }
    }

    /// Writes the serialised bytes into `out`, which must be exactly
    /// [`size`](Value::size) bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `out` has the wrong length.
    pub fn store(&self, out: &mut [u8]) -> Result<()> {
        let expected = self.size();
        if out.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: out.len(),
            });
        }
        self.write_to(out);
        Ok(())
    }

    // --- Typed accessors ---

    fn leaf_bytes(&self) -> &[u8] {
        match &self.0.repr {
            Repr::Serialised { bytes } => &bytes[..],
            Repr::Tree { .. } => &[],
        }
    }

    fn fixed_bytes<const N: usize>(&self) -> [u8; N] {
        self.leaf_bytes().try_into().unwrap_or([0; N])
    }

    /// Returns the value if this is a boolean. Any nonzero byte reads as `true`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if self.classify() != Class::Boolean {
            return None;
        }
        Some(self.fixed_bytes::<1>()[0] != 0)
    }

    /// Returns the content of a string, object path or signature.
    ///
    /// Malformed untrusted content reads as `""`, or `"/"` for object paths.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        let class = self.classify();
        let fallback = match class {
            Class::String | Class::Signature => "",
            Class::ObjectPath => "/",
            _ => return None,
        };
        let content = serialised::string_content(self.leaf_bytes());
        let valid = match (class, content) {
            (_, None) => None,
            (_, Some(s)) if self.is_trusted() => Some(s),
            (Class::ObjectPath, Some(s)) => Some(s).filter(|s| is_object_path(s)),
            (Class::Signature, Some(s)) => Some(s).filter(|s| is_signature(s)),
            (_, Some(s)) => Some(s),
        };
        if valid.is_none() {
            log::trace!("[value] malformed '{}' content, reading {:?}", self.type_string(), fallback);
        }
        Some(valid.unwrap_or(fallback))
    }

    /// Unboxes a variant.
    #[must_use]
    pub fn as_variant(&self) -> Option<Value> {
        if self.classify() != Class::Variant {
            return None;
        }
        self.child(0).ok()
    }

    /// Returns `Some(Some(child))` for Just, `Some(None)` for Nothing and
    /// `None` if this is not a maybe value.
    #[must_use]
    pub fn as_maybe(&self) -> Option<Option<Value>> {
        if self.classify() != Class::Maybe {
            return None;
        }
        Some(self.child(0).ok())
    }

    /// Returns the strings of an `as`, `ao` or `ag` array.
    #[must_use]
    pub fn strv(&self) -> Option<Vec<String>> {
        if !matches!(self.type_string(), "as" | "ao" | "ag") {
            return None;
        }
        Some(
            self.iter()
                .map(|s| s.as_str().unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// Returns the serialised elements of an array of a fixed-size type.
    ///
    /// Untrusted data whose length is not a whole number of elements reads
    /// as empty.
    #[must_use]
    pub fn fixed_array_data(&self) -> Option<Bytes> {
        let element = match self.type_info().element() {
            Some(element) if self.classify() == Class::Array => element,
            _ => return None,
        };
        let fixed = element.fixed_size()?;
        let data = self.data();
        if data.len() % fixed != 0 {
            return Some(zeroed(0));
        }
        Some(data)
    }

    /// Looks up `key` in a dictionary with string or object path keys.
    ///
    /// Variant values are unboxed. When `expected_type` is given, a value of
    /// any other type is treated as missing.
    ///
    /// ```rust
    /// use gvariant::{Value, VariantType};
    ///
    /// let dict: Value = "{'width': <500>, 'title': <'x'>}".parse().unwrap();
    /// assert_eq!(dict.lookup_value("width", None).unwrap().as_int32(), Some(500));
    /// assert!(dict.lookup_value("width", Some(&VariantType::STRING)).is_none());
    /// ```
    #[must_use]
    pub fn lookup_value(&self, key: &str, expected_type: Option<&VariantType>) -> Option<Value> {
        if !matches!(self.type_string().get(..3), Some("a{s" | "a{o")) {
            return None;
        }
        let entry = self
            .iter()
            .find(|entry| entry.child(0).ok().as_ref().and_then(Value::as_str) == Some(key))?;
        let mut value = entry.child(1).ok()?;
        if let Some(inner) = value.as_variant() {
            value = inner;
        }
        match expected_type {
            Some(ty) if !value.is_of_type(ty) => None,
            _ => Some(value),
        }
    }

    // --- Comparison ---

    /// Returns `true` if both values have the same type and content.
    ///
    /// Values of different types are never equal.
    #[must_use]
    pub fn equal(&self, other: &Value) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.type_string() == other.type_string()
            && self.normal_form().data() == other.normal_form().data()
    }

    /// Orders two basic values of the same type.
    ///
    /// Numbers compare numerically, strings by bytes, `false < true`.
    ///
    /// # Panics
    ///
    /// Panics if the types differ or are not basic. Comparing containers or
    /// mixed types is a bug in the caller.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Ordering {
        let class = self.classify();
        assert!(
            self.type_string() == other.type_string(),
            "cannot compare values of different types '{}' and '{}'",
            self.type_string(),
            other.type_string()
        );
        assert!(
            class.is_basic(),
            "cannot compare container values of type '{}'",
            self.type_string()
        );
        match class {
            Class::Boolean => self.as_bool().cmp(&other.as_bool()),
            Class::Byte => self.as_byte().cmp(&other.as_byte()),
            Class::Int16 => self.as_int16().cmp(&other.as_int16()),
            Class::Uint16 => self.as_uint16().cmp(&other.as_uint16()),
            Class::Int32 => self.as_int32().cmp(&other.as_int32()),
            Class::Uint32 => self.as_uint32().cmp(&other.as_uint32()),
            Class::Int64 => self.as_int64().cmp(&other.as_int64()),
            Class::Uint64 => self.as_uint64().cmp(&other.as_uint64()),
            Class::Handle => self.as_handle().cmp(&other.as_handle()),
            Class::Double => {
                let (a, b) = (self.as_double().unwrap_or(0.0), other.as_double().unwrap_or(0.0));
                a.total_cmp(&b)
            }
            _ => self.as_str().cmp(&other.as_str()),
        }
    }

    // --- Normal form ---

    /// Returns `true` if the value's serialised bytes are in normal form.
    ///
    /// A successful check is remembered, so repeated calls are O(1).
    #[must_use]
    pub fn is_normal_form(&self) -> bool {
        if self.is_trusted() {
            return true;
        }
        let normal = match &self.0.repr {
            Repr::Tree { children, .. } => children.iter().all(Value::is_normal_form),
            Repr::Serialised { bytes } => {
                serialised::is_normal(&self.0.type_info, bytes, self.0.depth)
            }
        };
        if normal {
            self.0.trusted.store(true, AtomicOrdering::Release);
        } else {
            log::trace!("[value] '{}' is not in normal form", self.type_string());
        }
        normal
    }

    /// Returns a value guaranteed to be in normal form.
    ///
    /// A value already in normal form is returned as a new reference;
    /// otherwise a corrected copy is built from the values its accessors
    /// read.
    ///
    /// ```rust
    /// use gvariant::{Value, VariantType};
    ///
    /// // A boolean stored as 2 reads as `true` but is not normal.
    /// let v = Value::from_bytes(&VariantType::BOOLEAN, vec![2u8], false).unwrap();
    /// assert!(!v.is_normal_form());
    /// let fixed = v.normal_form();
    /// assert_eq!(&fixed.data()[..], &[1]);
    /// ```
    #[must_use]
    pub fn normal_form(&self) -> Value {
        if self.is_normal_form() {
            return self.clone();
        }
        self.rebuild().owned()
    }

    fn rebuild(&self) -> Value {
        let class = self.classify();
        if class.is_container() {
            let children = self.iter().map(|c| c.normal_form()).collect();
            return Value::tree(self.0.type_info.clone(), children);
        }
        match class {
            Class::Boolean => Value::new_boolean(self.as_bool().unwrap_or(false)),
            Class::String | Class::ObjectPath | Class::Signature => {
                let content = self.as_str().unwrap_or_default();
                let ty = self.variant_type();
                match Value::new_text(ty, "string", content) {
                    Ok(value) => value,
                    Err(_) => Value::leaf(ty, Bytes::from_static(&[0])),
                }
            }
            // Fixed-size numbers are normal at any bit pattern.
            _ => Value::leaf(self.variant_type(), Bytes::copy_from_slice(self.leaf_bytes())),
        }
    }

    /// Returns the value with every multi-byte number byte-swapped, in normal
    /// form.
    ///
    /// ```rust
    /// use gvariant::Value;
    ///
    /// let v = Value::new_uint32(0x1122_3344);
    /// assert_eq!(v.byteswap().as_uint32(), Some(0x4433_2211));
    /// assert!(v.byteswap().byteswap().equal(&v));
    /// ```
    #[must_use]
    pub fn byteswap(&self) -> Value {
        let normal = self.normal_form();
        if normal.type_info().alignment() == 1 {
            return normal;
        }
        let mut data = normal.data().to_vec();
        serialised::byteswap(&self.0.type_info, &mut data, 0);
        Value::from_parts(
            self.0.type_info.clone(),
            Repr::Serialised {
                bytes: Bytes::from(data),
            },
            true,
            0,
        )
        .owned()
    }

    // --- Text format ---

    /// Prints the value in the text format.
    ///
    /// With `type_annotate`, enough `@type` annotations are added for
    /// [`Value::parse`] to recover the exact type without a hint.
    #[must_use]
    pub fn print(&self, type_annotate: bool) -> String {
        crate::print::print(self, &PrintOptions::new().with_type_annotations(type_annotate))
    }

    /// Parses text-format input, optionally checked against `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed input, unresolvable types or
    /// nesting deeper than [`crate::MAX_DEPTH`].
    pub fn parse(ty: Option<&VariantType>, text: &str) -> Result<Value> {
        let mut options = ParseOptions::new();
        if let Some(ty) = ty {
            options = options.with_type(ty.clone());
        }
        crate::parse::parse(text, &options)
    }
}

/// Determines the element type of a maybe or array from an optional type
/// hint and an optional sample child.
fn element_type(hint: Option<&VariantType>, sample: Option<&Value>) -> Result<VariantType> {
    match (hint, sample) {
        (Some(ty), _) if ty.is_definite() => {
            if let Some(child) = sample {
                if child.variant_type() != ty {
                    return Err(Error::type_mismatch(ty.as_str(), child.type_string()));
                }
            }
            Ok(ty.clone())
        }
        (Some(pattern), Some(child)) => {
            if !child.is_of_type(pattern) {
                return Err(Error::type_mismatch(pattern.as_str(), child.type_string()));
            }
            Ok(child.variant_type().clone())
        }
        (None, Some(child)) => Ok(child.variant_type().clone()),
        (Some(pattern), None) => Err(Error::ambiguous(&format!(
            "cannot infer a definite element type from '{}' without a child",
            pattern
        ))),
        (None, None) => Err(Error::ambiguous(
            "element type is required when there are no children",
        )),
    }
}

impl Filler for Value {
    fn type_info(&self) -> &TypeInfo {
        &self.0.type_info
    }

    fn serialised_size(&self) -> usize {
        self.size()
    }

    fn write_to(&self, out: &mut [u8]) {
        match &self.0.repr {
            Repr::Serialised { bytes } => out.copy_from_slice(bytes),
            Repr::Tree {
                children,
                serialised,
            } => match serialised.get() {
                Some(bytes) => out.copy_from_slice(bytes),
                None => serialised::serialise(&self.0.type_info, &children[..], out),
            },
        }
    }
}

/// Iterator over the children of a [`Value`].
pub struct Children<'a> {
    value: &'a Value,
    index: usize,
    len: usize,
}

impl Iterator for Children<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.index >= self.len {
            return None;
        }
        let child = self.value.child(self.index).ok();
        self.index += 1;
        child
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl<'a> IntoIterator for &'a Value {
    type Item = Value;
    type IntoIter = Children<'a>;

    fn into_iter(self) -> Children<'a> {
        self.iter()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for Value {}

/// Hashes the type and normal-form bytes; stable only within one process.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_string().hash(state);
        self.normal_form().data().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(true))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.print(true))
    }
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Value::parse(None, s)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.classify() {
            Class::Boolean => serializer.serialize_bool(self.as_bool().unwrap_or_default()),
            Class::Byte => serializer.serialize_u8(self.as_byte().unwrap_or_default()),
            Class::Int16 => serializer.serialize_i16(self.as_int16().unwrap_or_default()),
            Class::Uint16 => serializer.serialize_u16(self.as_uint16().unwrap_or_default()),
            Class::Int32 => serializer.serialize_i32(self.as_int32().unwrap_or_default()),
            Class::Uint32 => serializer.serialize_u32(self.as_uint32().unwrap_or_default()),
            Class::Int64 => serializer.serialize_i64(self.as_int64().unwrap_or_default()),
            Class::Uint64 => serializer.serialize_u64(self.as_uint64().unwrap_or_default()),
            Class::Handle => serializer.serialize_i32(self.as_handle().unwrap_or_default()),
            Class::Double => serializer.serialize_f64(self.as_double().unwrap_or_default()),
            Class::String | Class::ObjectPath | Class::Signature => {
                serializer.serialize_str(self.as_str().unwrap_or_default())
            }
            Class::Variant => match self.as_variant() {
                Some(inner) => inner.serialize(serializer),
                None => serializer.serialize_unit(),
            },
            Class::Maybe => match self.child(0).ok() {
                Some(inner) => serializer.serialize_some(&inner),
                None => serializer.serialize_none(),
            },
            Class::Array if self.type_string().starts_with("a{") => {
                let mut map = serializer.serialize_map(Some(self.n_children()))?;
                for entry in self {
                    let key = entry.child(0).map_err(<S::Error as serde::ser::Error>::custom)?;
                    let value = entry.child(1).map_err(<S::Error as serde::ser::Error>::custom)?;
                    map.serialize_entry(&key, &value)?;
                }
                map.end()
            }
            Class::Array => {
                let mut seq = serializer.serialize_seq(Some(self.n_children()))?;
                for child in self {
                    seq.serialize_element(&child)?;
                }
                seq.end()
            }
            Class::Tuple if self.n_children() == 0 => serializer.serialize_unit(),
            Class::Tuple | Class::DictEntry => {
                let mut tuple = serializer.serialize_tuple(self.n_children())?;
                for child in self {
                    tuple.serialize_element(&child)?;
                }
                tuple.end()
            }
        }
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty => $new:ident, $get:ident;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Value {
                    Value::$new(value)
                }
            }

            impl TryFrom<&Value> for $ty {
                type Error = Error;

                fn try_from(value: &Value) -> Result<$ty> {
                    value
                        .$get()
                        .ok_or_else(|| Error::type_mismatch(stringify!($ty), value.type_string()))
                }
            }

            impl ToVariant for $ty {
                fn to_variant(&self) -> Result<Value> {
                    Ok(Value::$new(*self))
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => new_boolean, as_bool;
    u8 => new_byte, as_byte;
    i16 => new_int16, as_int16;
    u16 => new_uint16, as_uint16;
    i32 => new_int32, as_int32;
    u32 => new_uint32, as_uint32;
    i64 => new_int64, as_int64;
    u64 => new_uint64, as_uint64;
    f64 => new_double, as_double;
}

impl TryFrom<&str> for Value {
    type Error = Error;

    fn try_from(s: &str) -> Result<Value> {
        Value::new_string(s)
    }
}

impl TryFrom<&Value> for String {
    type Error = Error;

    fn try_from(value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::type_mismatch("s", value.type_string()))
    }
}

/// Conversion of Rust data into a [`Value`].
///
/// Used by the [`variant!`](crate::variant) macro for leaf expressions.
pub trait ToVariant {
    /// Builds a new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be represented, for example a
    /// string with an embedded NUL byte.
    fn to_variant(&self) -> Result<Value>;
}

impl ToVariant for str {
    fn to_variant(&self) -> Result<Value> {
        Value::new_string(self)
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Result<Value> {
        Value::new_string(self)
    }
}

impl ToVariant for Value {
    fn to_variant(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl<T: ToVariant + ?Sized> ToVariant for &T {
    fn to_variant(&self) -> Result<Value> {
        (**self).to_variant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> VariantType {
        VariantType::new(s).unwrap()
    }

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(Value::new_boolean(true).size(), 1);
        assert_eq!(Value::new_int16(1).size(), 2);
        assert_eq!(Value::new_handle(3).size(), 4);
        assert_eq!(Value::new_double(1.5).size(), 8);
        assert_eq!(Value::new_string("hi").unwrap().size(), 3);
    }

    #[test]
    fn test_typed_accessors_reject_other_types() {
        let v = Value::new_int32(5);
        assert_eq!(v.as_uint32(), None);
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_variant(), None);
    }

    #[test]
    fn test_string_constructors() {
        assert!(matches!(
            Value::new_string("a\0b"),
            Err(Error::InvalidString { .. })
        ));
        assert!(matches!(
            Value::new_string_from_bytes(&[0x61, 0xff]),
            Err(Error::InvalidUtf8 { valid_up_to: 1 })
        ));
        assert!(Value::new_object_path("/a/b").is_ok());
        assert!(Value::new_object_path("a").is_err());
        assert!(Value::new_signature("a{sv}").is_ok());
        assert!(Value::new_signature("a{").is_err());
    }

    #[test]
    fn test_floating_discipline() {
        let v = Value::new_int64(9);
        assert!(v.is_floating());
        let v = v.take_ref();
        assert!(!v.is_floating());

        let child = Value::new_byte(1);
        let keep = child.clone();
        let array = Value::new_array(None, vec![child]).unwrap();
        assert!(array.is_floating());
        assert!(!keep.is_floating());
        assert_eq!(keep.ref_count(), 2);
    }

    #[test]
    fn test_array_type_checks() {
        let err = Value::new_array(None, vec![Value::new_int32(1), Value::new_uint32(2)])
            .unwrap_err();
        assert_eq!(err, Error::type_mismatch("i", "u"));
        let err = Value::new_array(Some(&ty("s")), vec![Value::new_int32(1)]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(matches!(
            Value::new_array(Some(&ty("a*")), vec![]),
            Err(Error::AmbiguousType(_))
        ));
        let v = Value::new_array(Some(&VariantType::ANY), vec![Value::new_int16(3)]).unwrap();
        assert_eq!(v.type_string(), "an");
    }

    #[test]
    fn test_maybe() {
        assert!(matches!(Value::new_maybe(None, None), Err(Error::AmbiguousType(_))));
        let nothing = Value::new_maybe(Some(&ty("s")), None).unwrap();
        assert_eq!(nothing.type_string(), "ms");
        assert_eq!(nothing.size(), 0);
        assert_eq!(nothing.as_maybe(), Some(None));

        let just = Value::new_maybe(None, Some(Value::new_string("x").unwrap())).unwrap();
        assert_eq!(&just.data()[..], b"x\0\0");
        let just_int = Value::new_maybe(None, Some(Value::new_int32(7))).unwrap();
        assert_eq!(just_int.size(), 4);
    }

    #[test]
    fn test_dict_entry_key_must_be_basic() {
        let key = Value::new_variant(Value::new_int32(1));
        assert!(Value::new_dict_entry(key, Value::new_int32(2)).is_err());
    }

    #[test]
    fn test_child_out_of_bounds() {
        let v = Value::new_tuple(vec![Value::new_int32(1)]);
        assert_eq!(v.child(1).unwrap_err(), Error::OutOfBounds { index: 1, len: 1 });
        assert!(Value::new_int32(1).child(0).is_err());
    }

    #[test]
    fn test_serialised_children_share_buffer() {
        let v = Value::from_bytes(&ty("(ss)"), b"ab\0cd\0\x03".to_vec(), false).unwrap();
        let first = v.child(0).unwrap();
        let second = v.child(1).unwrap();
        let parent = v.data();
        assert!(parent.as_ptr_range().contains(&first.data().as_ptr()));
        assert!(parent.as_ptr_range().contains(&second.data().as_ptr()));
        drop(parent);
        drop(v);
        assert_eq!(first.as_str(), Some("ab"));
        assert_eq!(second.as_str(), Some("cd"));
    }

    struct Notify(Vec<u8>, Arc<AtomicBool>);

    impl AsRef<[u8]> for Notify {
        fn as_ref(&self) -> &[u8] {
            &self.0
        }
    }

    impl Drop for Notify {
        fn drop(&mut self) {
            self.1.store(true, AtomicOrdering::SeqCst);
        }
    }

    #[test]
    fn test_owner_released_with_last_child() {
        let released = Arc::new(AtomicBool::new(false));
        let owner = Notify(b"one\0two\0\x04\x08".to_vec(), Arc::clone(&released));
        let v = Value::from_bytes(&VariantType::STRING_ARRAY, Bytes::from_owner(owner), false)
            .unwrap();
        let second = v.child(1).unwrap();
        drop(v);
        assert!(!released.load(AtomicOrdering::SeqCst));
        assert_eq!(second.as_str(), Some("two"));
        drop(second);
        assert!(released.load(AtomicOrdering::SeqCst));
    }

    #[test]
    fn test_floating_claimed_once_under_contention() {
        for _ in 0..50 {
            let value = Value::new_string("shared").unwrap();
            let claims = std::sync::atomic::AtomicUsize::new(0);
            std::thread::scope(|scope| {
                for _ in 0..8 {
                    scope.spawn(|| {
                        if value.claim() {
                            claims.fetch_add(1, AtomicOrdering::SeqCst);
                        }
                    });
                }
            });
            assert_eq!(claims.load(AtomicOrdering::SeqCst), 1);
            assert!(!value.is_floating());
            assert_eq!(value.ref_count(), 1);
        }
    }

    #[test]
    fn test_zeroed_fallbacks() {
        assert!(zeroed(0).is_empty());
        assert_eq!(&zeroed(3)[..], &[0, 0, 0]);
        assert_eq!(zeroed(100).len(), 100);
        assert!(zeroed(100).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_untrusted_string_fallbacks() {
        let s = Value::from_bytes(&VariantType::STRING, b"abc".to_vec(), false).unwrap();
        assert_eq!(s.as_str(), Some(""));
        let o = Value::from_bytes(&VariantType::OBJECT_PATH, b"x\0".to_vec(), false).unwrap();
        assert_eq!(o.as_str(), Some("/"));
        assert_eq!(o.normal_form().as_str(), Some("/"));
        assert!(o.normal_form().is_normal_form());
    }

    #[test]
    fn test_fixed_size_mismatch_zero_fills() {
        let v = Value::from_bytes(&VariantType::INT32, vec![1u8, 2], false).unwrap();
        assert_eq!(v.as_int32(), Some(0));
        assert_eq!(v.size(), 4);
    }

    #[test]
    fn test_store_checks_buffer_size() {
        let v = Value::new_tuple(vec![Value::new_int32(1), Value::new_string("a").unwrap()]);
        let mut small = [0u8; 2];
        assert_eq!(
            v.store(&mut small),
            Err(Error::BufferSize {
                expected: 6,
                actual: 2
            })
        );
        let mut exact = vec![0u8; v.size()];
        v.store(&mut exact).unwrap();
        assert_eq!(exact, v.data().to_vec());
    }

    #[test]
    fn test_equality_requires_same_type() {
        assert_ne!(Value::new_int32(1), Value::new_uint32(1));
        assert_eq!(Value::new_int32(1), Value::new_int32(1));
        let tree = Value::new_tuple(vec![Value::new_byte(1)]);
        let loaded = Value::from_bytes(&ty("(y)"), vec![1u8], false).unwrap();
        assert_eq!(tree, loaded);
    }

    #[test]
    fn test_compare_basic() {
        assert_eq!(Value::new_int32(-1).compare(&Value::new_int32(1)), Ordering::Less);
        assert_eq!(
            Value::new_string("b").unwrap().compare(&Value::new_string("a").unwrap()),
            Ordering::Greater
        );
        assert_eq!(
            Value::new_boolean(true).compare(&Value::new_boolean(true)),
            Ordering::Equal
        );
    }

    #[test]
    #[should_panic(expected = "container")]
    fn test_compare_containers_panics() {
        let a = Value::new_tuple(vec![]);
        let _ = a.compare(&a.clone());
    }

    #[test]
    fn test_normal_form_rebuilds_corrupt_array() {
        // Offsets claim the second string ends before it starts.
        let v = Value::from_bytes(&ty("as"), b"a\0b\0\x05\x04".to_vec(), false).unwrap();
        assert!(!v.is_normal_form());
        let normal = v.normal_form();
        assert!(normal.is_normal_form());
        assert_eq!(normal.strv(), Some(vec![String::new(), String::new()]));
    }

    #[test]
    fn test_lookup_value() {
        let dict = Value::new_dict(
            &VariantType::STRING,
            &VariantType::VARIANT,
            vec![(
                Value::new_string("k").unwrap(),
                Value::new_variant(Value::new_uint16(4)),
            )],
        )
        .unwrap();
        assert_eq!(dict.lookup_value("k", None).unwrap().as_uint16(), Some(4));
        assert!(dict.lookup_value("missing", None).is_none());
        assert!(Value::new_int32(1).lookup_value("k", None).is_none());
    }

    #[test]
    fn test_fixed_array() {
        let data: Vec<u8> = [1i32, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let v = Value::new_fixed_array(&VariantType::INT32, &data).unwrap();
        assert_eq!(v.n_children(), 3);
        assert_eq!(v.child(2).unwrap().as_int32(), Some(3));
        assert_eq!(&v.fixed_array_data().unwrap()[..], &data[..]);
        assert!(Value::new_fixed_array(&VariantType::STRING, b"").is_err());
        assert!(matches!(
            Value::new_fixed_array(&VariantType::INT32, &[0; 5]),
            Err(Error::BufferSize { .. })
        ));
    }

    #[test]
    fn test_conversions() {
        let v: Value = 7u16.into();
        assert_eq!(u16::try_from(&v), Ok(7));
        assert!(i32::try_from(&v).is_err());
        let s = Value::try_from("hey").unwrap();
        assert_eq!(String::try_from(&s).unwrap(), "hey");
    }

    #[test]
    fn test_serde_json() {
        let v = Value::new_tuple(vec![
            Value::new_int32(1),
            Value::new_maybe(Some(&VariantType::STRING), None).unwrap(),
            Value::new_strv(&["a", "b"]).unwrap(),
        ]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,null,["a","b"]]"#);
    }
}
