//! Ordered `a{sv}` dictionary helper.
//!
//! [`VariantDict`] is a mutable, insertion-ordered view of a vardict. Values
//! are stored unboxed; the variant wrapping is added by [`VariantDict::end`]
//! and removed by [`VariantDict::from_value`].
//!
//! ## Examples
//!
//! ```rust
//! use gvariant::{Value, VariantDict};
//!
//! let mut dict = VariantDict::new();
//! dict.insert("width", Value::new_int32(640));
//! dict.insert("title", Value::new_string("main").unwrap());
//!
//! let value = dict.end().unwrap();
//! assert_eq!(value.type_string(), "a{sv}");
//! assert_eq!(value.print(false), "{'width': <640>, 'title': <'main'>}");
//! ```

use crate::{Error, Result, Value, VariantType};
use indexmap::IndexMap;

/// An insertion-ordered map of string keys to values, convertible to and
/// from `a{sv}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantDict(IndexMap<String, Value>);

impl VariantDict {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        VariantDict(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        VariantDict(IndexMap::with_capacity(capacity))
    }

    /// Loads the entries of an `a{sv}` value.
    ///
    /// A key seen twice keeps its first position and its last value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` is not of type `a{sv}`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::{Value, VariantDict};
    ///
    /// let value: Value = "{'a': <1>, 'b': <'x'>}".parse().unwrap();
    /// let dict = VariantDict::from_value(&value).unwrap();
    /// assert_eq!(dict.get("a").and_then(Value::as_int32), Some(1));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_of_type(&VariantType::VARDICT) {
            return Err(Error::type_mismatch(
                VariantType::VARDICT.as_str(),
                value.type_string(),
            ));
        }
        let mut dict = VariantDict::with_capacity(value.n_children());
        for entry in value {
            let key = entry.child(0)?;
            let boxed = entry.child(1)?;
            if let (Some(key), Some(inner)) = (key.as_str(), boxed.as_variant()) {
                dict.0.insert(key.to_string(), inner);
            }
        }
        Ok(dict)
    }

    /// Inserts `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value.sink())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up `key`, returning the value only if it matches
    /// `expected_type`.
    ///
    /// ```rust
    /// use gvariant::{Value, VariantDict, VariantType};
    ///
    /// let mut dict = VariantDict::new();
    /// dict.insert("n", Value::new_uint32(3));
    /// assert!(dict.lookup("n", Some(&VariantType::UINT32)).is_some());
    /// assert!(dict.lookup("n", Some(&VariantType::STRING)).is_none());
    /// assert!(dict.lookup("n", Some(&VariantType::BASIC)).is_some());
    /// ```
    #[must_use]
    pub fn lookup(&self, key: &str, expected_type: Option<&VariantType>) -> Option<Value> {
        let value = self.0.get(key)?;
        match expected_type {
            Some(ty) if !value.is_of_type(ty) => None,
            _ => Some(value.clone()),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Builds the `a{sv}` value, boxing each entry in a variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if a key contains a NUL byte.
    pub fn end(&self) -> Result<Value> {
        let entry_type = VariantType::dict_entry(&VariantType::STRING, &VariantType::VARIANT)?;
        let entries = self
            .0
            .iter()
            .map(|(key, value)| {
                Value::new_dict_entry(Value::new_string(key)?, Value::new_variant(value.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Value::new_array(Some(&entry_type), entries)
    }
}

impl From<IndexMap<String, Value>> for VariantDict {
    fn from(map: IndexMap<String, Value>) -> Self {
        VariantDict(map.into_iter().map(|(k, v)| (k, v.sink())).collect())
    }
}

impl From<VariantDict> for IndexMap<String, Value> {
    fn from(dict: VariantDict) -> Self {
        dict.0
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for VariantDict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = VariantDict::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for VariantDict {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariantDict {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<&Value> for VariantDict {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        VariantDict::from_value(value)
    }
}

impl TryFrom<VariantDict> for Value {
    type Error = Error;

    fn try_from(dict: VariantDict) -> Result<Self> {
        dict.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut dict = VariantDict::new();
        dict.insert("z", Value::new_int32(1));
        dict.insert("a", Value::new_int32(2));
        dict.insert("m", Value::new_int32(3));
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);

        assert!(dict.insert("a", Value::new_int32(9)).is_some());
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);

        dict.remove("z");
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "m"]);
    }

    #[test]
    fn test_end_and_reload() {
        let mut dict = VariantDict::new();
        dict.insert("flag", Value::new_boolean(true));
        dict.insert("name", Value::new_string("x").unwrap());

        let value = dict.end().unwrap();
        assert_eq!(value.type_string(), "a{sv}");
        assert_eq!(value.n_children(), 2);
        assert_eq!(
            value.lookup_value("flag", None).and_then(|v| v.as_bool()),
            Some(true)
        );

        let loaded = Value::from_bytes(&VariantType::VARDICT, value.data(), false).unwrap();
        let reloaded = VariantDict::from_value(&loaded).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("name").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn test_empty_end() {
        let value = VariantDict::new().end().unwrap();
        assert_eq!(value.type_string(), "a{sv}");
        assert_eq!(value.size(), 0);
    }

    #[test]
    fn test_wrong_type() {
        let value = Value::new_strv(&["a"]).unwrap();
        assert!(matches!(
            VariantDict::from_value(&value),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_nul_key() {
        let mut dict = VariantDict::new();
        dict.insert("a\0b", Value::new_int32(1));
        assert!(matches!(dict.end(), Err(Error::InvalidString { .. })));
    }

    #[test]
    fn test_values_are_sunk() {
        let mut dict = VariantDict::new();
        dict.insert("k", Value::new_int32(1));
        assert!(!dict.get("k").unwrap().is_floating());
    }
}
