//! Type strings.
//!
//! Every value carries a type written in a small grammar of ASCII codes:
//!
//! | Code | Meaning | Code | Meaning |
//! |------|---------|------|---------|
//! | `b` | boolean | `h` | handle (`i32` index) |
//! | `y` | byte | `d` | double |
//! | `n` / `q` | int16 / uint16 | `s` | string |
//! | `i` / `u` | int32 / uint32 | `o` | object path |
//! | `x` / `t` | int64 / uint64 | `g` | signature |
//! | `v` | variant (any value, self-describing) | `a T` | array of `T` |
//! | `m T` | maybe `T` | `(T1 T2 ...)` | tuple |
//! | `{K V}` | dictionary entry (`K` basic) | | |
//!
//! The wildcards `*` (any type), `?` (any basic type) and `r` (any tuple)
//! only appear in patterns; a type without them is *definite*.
//!
//! ```rust
//! use gvariant::VariantType;
//!
//! let ty = VariantType::new("a{sv}").unwrap();
//! assert!(ty.is_array() && ty.is_definite());
//! assert_eq!(ty.element().unwrap().as_str(), "{sv}");
//!
//! let pattern = VariantType::new("a{s*}").unwrap();
//! assert!(pattern.matches(&ty));
//! ```

use crate::{Error, Result, MAX_DEPTH};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

const BASIC_CODES: &[u8] = b"bynqiuxthdsog?";
const SIGNATURE_CODES: &[u8] = b"ybnqiuxthdvasog(){}";

#[inline]
fn is_basic_code(c: u8) -> bool {
    BASIC_CODES.contains(&c)
}

/// Scans one complete type starting at `start`, returning the index just past it.
fn scan(s: &[u8], start: usize, depth: usize) -> std::result::Result<usize, (usize, &'static str)> {
    if depth > MAX_DEPTH {
        return Err((start, "type nesting too deep"));
    }

    match s.get(start) {
        None => Err((start, "unexpected end of type string")),
        Some(b'a') | Some(b'm') => scan(s, start + 1, depth + 1),
        Some(b'(') => {
            let mut pos = start + 1;
            loop {
                match s.get(pos) {
                    None => return Err((pos, "unterminated tuple")),
                    Some(b')') => return Ok(pos + 1),
                    Some(_) => pos = scan(s, pos, depth + 1)?,
                }
            }
        }
        Some(b'{') => {
            match s.get(start + 1) {
                None => return Err((start + 1, "unterminated dictionary entry")),
                Some(&c) if is_basic_code(c) => {}
                Some(_) => {
                    return Err((start + 1, "dictionary entry key must be a basic type"));
                }
            }
            let pos = scan(s, start + 2, depth + 1)?;
            match s.get(pos) {
                Some(b'}') => Ok(pos + 1),
                None => Err((pos, "unterminated dictionary entry")),
                Some(_) => Err((pos, "dictionary entry must have exactly two items")),
            }
        }
        Some(c) if b"bynqiuxthdsogv*?r".contains(c) => Ok(start + 1),
        Some(b')') | Some(b'}') => Err((start, "unbalanced closing bracket")),
        Some(_) => Err((start, "unknown type code")),
    }
}

/// Length of the complete type at the start of `s`, if there is one.
pub(crate) fn type_prefix_len(s: &str) -> Option<usize> {
    scan(s.as_bytes(), 0, 0).ok()
}

/// A parsed, immutable type string.
///
/// Construction validates the grammar, so every `VariantType` holds exactly
/// one complete type. Cloning is cheap for the built-in constants.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantType(Cow<'static, str>);

impl VariantType {
    pub const BOOLEAN: VariantType = VariantType(Cow::Borrowed("b"));
    pub const BYTE: VariantType = VariantType(Cow::Borrowed("y"));
    pub const INT16: VariantType = VariantType(Cow::Borrowed("n"));
    pub const UINT16: VariantType = VariantType(Cow::Borrowed("q"));
    pub const INT32: VariantType = VariantType(Cow::Borrowed("i"));
    pub const UINT32: VariantType = VariantType(Cow::Borrowed("u"));
    pub const INT64: VariantType = VariantType(Cow::Borrowed("x"));
    pub const UINT64: VariantType = VariantType(Cow::Borrowed("t"));
    pub const HANDLE: VariantType = VariantType(Cow::Borrowed("h"));
    pub const DOUBLE: VariantType = VariantType(Cow::Borrowed("d"));
    pub const STRING: VariantType = VariantType(Cow::Borrowed("s"));
    pub const OBJECT_PATH: VariantType = VariantType(Cow::Borrowed("o"));
    pub const SIGNATURE: VariantType = VariantType(Cow::Borrowed("g"));
    pub const VARIANT: VariantType = VariantType(Cow::Borrowed("v"));
    pub const UNIT: VariantType = VariantType(Cow::Borrowed("()"));
    pub const ANY: VariantType = VariantType(Cow::Borrowed("*"));
    pub const BASIC: VariantType = VariantType(Cow::Borrowed("?"));
    pub const MAYBE: VariantType = VariantType(Cow::Borrowed("m*"));
    pub const ARRAY: VariantType = VariantType(Cow::Borrowed("a*"));
    pub const TUPLE: VariantType = VariantType(Cow::Borrowed("r"));
    pub const DICT_ENTRY: VariantType = VariantType(Cow::Borrowed("{?*}"));
    pub const DICTIONARY: VariantType = VariantType(Cow::Borrowed("a{?*}"));
    pub const STRING_ARRAY: VariantType = VariantType(Cow::Borrowed("as"));
    pub const BYTESTRING: VariantType = VariantType(Cow::Borrowed("ay"));
    pub const VARDICT: VariantType = VariantType(Cow::Borrowed("a{sv}"));

    /// Parses a type string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedType`] on unbalanced brackets, unknown codes,
    /// non-basic dictionary keys, trailing characters or truncated input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::VariantType;
    ///
    /// assert!(VariantType::new("(ia{sv})").is_ok());
    /// assert!(VariantType::new("(i").is_err());
    /// assert!(VariantType::new("ii").is_err());
    /// ```
    pub fn new(type_string: &str) -> Result<Self> {
        let bytes = type_string.as_bytes();
        let end = scan(bytes, 0, 0)
            .map_err(|(pos, reason)| Error::malformed_type(type_string, pos, reason))?;
        if end != bytes.len() {
            return Err(Error::malformed_type(
                type_string,
                end,
                "trailing characters after complete type",
            ));
        }
        Ok(VariantType(Cow::Owned(type_string.to_string())))
    }

    /// Wraps a string already known to hold one complete type.
    pub(crate) fn from_validated(type_string: &str) -> Self {
        VariantType(Cow::Owned(type_string.to_string()))
    }

    /// Builds `a T`.
    pub fn array(element: &VariantType) -> Self {
        VariantType(Cow::Owned(format!("a{}", element.as_str())))
    }

    /// Builds `m T`.
    pub fn maybe(element: &VariantType) -> Self {
        VariantType(Cow::Owned(format!("m{}", element.as_str())))
    }

    /// Builds a tuple type from its item types.
    pub fn tuple(items: &[VariantType]) -> Self {
        let mut s = String::with_capacity(2 + items.iter().map(|t| t.0.len()).sum::<usize>());
        s.push('(');
        for item in items {
            s.push_str(item.as_str());
        }
        s.push(')');
        VariantType(Cow::Owned(s))
    }

    /// Builds `{K V}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedType`] if `key` is not a basic type.
    pub fn dict_entry(key: &VariantType, value: &VariantType) -> Result<Self> {
        let s = format!("{{{}{}}}", key.as_str(), value.as_str());
        if !key.is_basic() {
            return Err(Error::malformed_type(
                &s,
                1,
                "dictionary entry key must be a basic type",
            ));
        }
        Ok(VariantType(Cow::Owned(s)))
    }

    /// The canonical type string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    fn first(&self) -> u8 {
        self.0.as_bytes()[0]
    }

    /// Returns `true` if no wildcard appears anywhere in the type.
    #[must_use]
    pub fn is_definite(&self) -> bool {
        !self.0.bytes().any(|c| matches!(c, b'*' | b'?' | b'r'))
    }

    /// Returns `true` for the basic types and the `?` wildcard.
    #[must_use]
    pub fn is_basic(&self) -> bool {
        self.0.len() == 1 && is_basic_code(self.first())
    }

    /// Returns `true` for types whose every definite instance is a container,
    /// including `v` and `r`.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.first(), b'a' | b'm' | b'(' | b'{' | b'v' | b'r')
    }

    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.first() == b'a'
    }

    #[inline]
    #[must_use]
    pub fn is_maybe(&self) -> bool {
        self.first() == b'm'
    }

    #[inline]
    #[must_use]
    pub fn is_tuple(&self) -> bool {
        matches!(self.first(), b'(' | b'r')
    }

    #[inline]
    #[must_use]
    pub fn is_dict_entry(&self) -> bool {
        self.first() == b'{'
    }

    #[inline]
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.first() == b'v'
    }

    /// The element type of an array or maybe type.
    #[must_use]
    pub fn element(&self) -> Option<VariantType> {
        match self.first() {
            b'a' | b'm' => Some(Self::from_validated(&self.0[1..])),
            _ => None,
        }
    }

    /// The item types of a definite tuple or dictionary entry type.
    ///
    /// Returns an empty vector for every other type, including `r`.
    #[must_use]
    pub fn items(&self) -> Vec<VariantType> {
        let bytes = self.0.as_bytes();
        if !matches!(bytes[0], b'(' | b'{') {
            return Vec::new();
        }
        let mut items = Vec::new();
        let mut pos = 1;
        while pos < bytes.len() - 1 {
            // Grammar was validated on construction.
            let end = scan(bytes, pos, 0).unwrap_or(bytes.len() - 1);
            items.push(VariantType(Cow::Owned(self.0[pos..end].to_string())));
            pos = end;
        }
        items
    }

    /// Number of items in a tuple or dictionary entry type.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.items().len()
    }

    /// Key type of a dictionary entry type.
    #[must_use]
    pub fn key(&self) -> Option<VariantType> {
        if self.is_dict_entry() {
            Some(VariantType(Cow::Owned(self.0[1..2].to_string())))
        } else {
            None
        }
    }

    /// Value type of a dictionary entry type.
    #[must_use]
    pub fn value(&self) -> Option<VariantType> {
        if self.is_dict_entry() {
            Some(VariantType(Cow::Owned(self.0[2..self.0.len() - 1].to_string())))
        } else {
            None
        }
    }

    /// Returns `true` if `self`, read as a pattern, matches `other`.
    ///
    /// `*` matches anything, `?` any basic type and `r` any tuple; everything
    /// else must match exactly, element by element. Every type matches itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::VariantType;
    ///
    /// let pattern = VariantType::new("(?*)").unwrap();
    /// assert!(pattern.matches(&VariantType::new("(sav)").unwrap()));
    /// assert!(!pattern.matches(&VariantType::new("(avs)").unwrap()));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &VariantType) -> bool {
        other.is_subtype_of(self)
    }

    /// Returns `true` if every value of type `self` is also of type `supertype`.
    #[must_use]
    pub fn is_subtype_of(&self, supertype: &VariantType) -> bool {
        let ty = self.0.as_bytes();
        let mut t = 0;

        for &sc in supertype.0.as_bytes() {
            match ty.get(t) {
                Some(&c) if c == sc => t += 1,
                Some(b')') | None => return false,
                Some(_) => {
                    let end = match scan(ty, t, 0) {
                        Ok(end) => end,
                        Err(_) => return false,
                    };
                    let target = &ty[t..end];
                    let ok = match sc {
                        b'*' => true,
                        b'r' => matches!(target[0], b'(' | b'r'),
                        b'?' => target.len() == 1 && is_basic_code(target[0]),
                        _ => false,
                    };
                    if !ok {
                        return false;
                    }
                    t = end;
                }
            }
        }
        t == ty.len()
    }

    /// Depth of the type tree; basic types have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        depth_at(self.0.as_bytes(), 0).0
    }
}

/// Returns `(depth, end)` for the validated type starting at `pos`.
fn depth_at(s: &[u8], pos: usize) -> (usize, usize) {
    match s[pos] {
        b'a' | b'm' => {
            let (depth, end) = depth_at(s, pos + 1);
            (depth + 1, end)
        }
        b'(' | b'{' => {
            let mut p = pos + 1;
            let mut max = 0;
            while !matches!(s[p], b')' | b'}') {
                let (depth, end) = depth_at(s, p);
                max = max.max(depth);
                p = end;
            }
            (max + 1, p + 1)
        }
        _ => (1, pos + 1),
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantType({:?})", self.as_str())
    }
}

impl FromStr for VariantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VariantType::new(s)
    }
}

impl AsRef<str> for VariantType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Returns `true` if `path` is a valid object path.
///
/// Object paths start with `/` and consist of non-empty segments of
/// `[A-Za-z0-9_]` separated by single slashes, with no trailing slash
/// except for the root path `/` itself.
///
/// # Examples
///
/// ```rust
/// use gvariant::is_object_path;
///
/// assert!(is_object_path("/"));
/// assert!(is_object_path("/org/example/Obj_1"));
/// assert!(!is_object_path("/org//example"));
/// assert!(!is_object_path("/org/"));
/// ```
#[must_use]
pub fn is_object_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'_')
    })
}

/// Returns `true` if `signature` is a concatenation of zero or more definite
/// types without maybe types.
///
/// # Examples
///
/// ```rust
/// use gvariant::is_signature;
///
/// assert!(is_signature(""));
/// assert!(is_signature("ia{sv}(ss)"));
/// assert!(!is_signature("mi"));
/// assert!(!is_signature("a"));
/// ```
#[must_use]
pub fn is_signature(signature: &str) -> bool {
    let bytes = signature.as_bytes();
    if !bytes.iter().all(|c| SIGNATURE_CODES.contains(c)) {
        return false;
    }
    let mut pos = 0;
    while pos < bytes.len() {
        match scan(bytes, pos, 0) {
            Ok(end) => pos = end,
            Err(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        for s in [
            "b", "y", "n", "q", "i", "u", "x", "t", "h", "d", "s", "o", "g", "v", "()", "ai",
            "mi", "a{sv}", "(i(ss)a{s(ii)})", "aav", "mmas", "*", "?", "r", "a{?*}", "{sv}",
        ] {
            let ty = VariantType::new(s).unwrap();
            assert_eq!(ty.as_str(), s);
        }
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["", "(", "(i", "a", "m", "{vs}", "{s}", "{sii}", "z", "i)", "ii", "{(i)s}"] {
            assert!(
                matches!(VariantType::new(s), Err(Error::MalformedType { .. })),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_definite() {
        assert!(VariantType::new("a{sv}").unwrap().is_definite());
        assert!(!VariantType::new("a{s*}").unwrap().is_definite());
        assert!(!VariantType::new("(ir)").unwrap().is_definite());
        assert!(!VariantType::BASIC.is_definite());
    }

    #[test]
    fn test_matches() {
        let t = |s: &str| VariantType::new(s).unwrap();
        assert!(VariantType::ANY.matches(&t("a{sv}")));
        assert!(VariantType::BASIC.matches(&t("s")));
        assert!(!VariantType::BASIC.matches(&t("v")));
        assert!(VariantType::TUPLE.matches(&t("(is)")));
        assert!(VariantType::TUPLE.matches(&t("()")));
        assert!(!VariantType::TUPLE.matches(&t("ai")));
        assert!(t("a*").matches(&t("aas")));
        assert!(t("(i*)").matches(&t("(iv)")));
        assert!(!t("(i*)").matches(&t("(ivv)")));
        assert!(!t("(i**)").matches(&t("(iv)")));
        assert!(t("ai").matches(&t("ai")));
        assert!(!t("ai").matches(&t("au")));
        assert!(VariantType::DICTIONARY.matches(&t("a{sv}")));
        assert!(t("a*").matches(&t("a?")));
    }

    #[test]
    fn test_items() {
        let ty = VariantType::new("(ia{sv}(s))").unwrap();
        let items: Vec<String> = ty.items().iter().map(|t| t.to_string()).collect();
        assert_eq!(items, vec!["i", "a{sv}", "(s)"]);
        assert_eq!(VariantType::UNIT.n_items(), 0);

        let entry = VariantType::new("{s(ii)}").unwrap();
        assert_eq!(entry.key().unwrap().as_str(), "s");
        assert_eq!(entry.value().unwrap().as_str(), "(ii)");
        assert_eq!(entry.n_items(), 2);
    }

    #[test]
    fn test_constructors() {
        let s = VariantType::STRING;
        assert_eq!(VariantType::array(&s).as_str(), "as");
        assert_eq!(VariantType::maybe(&s).as_str(), "ms");
        assert_eq!(
            VariantType::tuple(&[VariantType::INT32, s.clone()]).as_str(),
            "(is)"
        );
        assert_eq!(
            VariantType::dict_entry(&s, &VariantType::VARIANT)
                .unwrap()
                .as_str(),
            "{sv}"
        );
        assert!(VariantType::dict_entry(&VariantType::VARIANT, &s).is_err());
    }

    #[test]
    fn test_depth() {
        assert_eq!(VariantType::INT32.depth(), 1);
        assert_eq!(VariantType::new("ai").unwrap().depth(), 2);
        assert_eq!(VariantType::new("a{sv}").unwrap().depth(), 3);
        assert_eq!(VariantType::new("(i(s))").unwrap().depth(), 3);
        assert_eq!(VariantType::UNIT.depth(), 1);
    }

    #[test]
    fn test_object_path_and_signature() {
        assert!(is_object_path("/a/b_c/D1"));
        assert!(!is_object_path(""));
        assert!(!is_object_path("a/b"));
        assert!(!is_object_path("/a-b"));
        assert!(is_signature("a{sv}"));
        assert!(!is_signature("a{sv"));
        assert!(!is_signature("*"));
    }
}
