//! Incremental construction of container values.
//!
//! [`VariantBuilder`] keeps a stack of open containers. Children are added
//! to the innermost one; [`close`](VariantBuilder::close) finishes it and
//! adds the result to its parent. The builder type may be indefinite
//! (`a*`, `m*`, `r`, `{?*}`), in which case the concrete type is taken from
//! the children.
//!
//! ## Examples
//!
//! ```rust
//! use gvariant::{Value, VariantBuilder, VariantType};
//!
//! let mut builder = VariantBuilder::new(&VariantType::TUPLE).unwrap();
//! builder.add_value(Value::new_int32(1)).unwrap();
//! builder.open(&VariantType::STRING_ARRAY).unwrap();
//! builder.add_value(Value::new_string("a").unwrap()).unwrap();
//! builder.add_value(Value::new_string("b").unwrap()).unwrap();
//! builder.close().unwrap();
//!
//! let value = builder.end().unwrap();
//! assert_eq!(value.type_string(), "(ias)");
//! assert_eq!(value.print(false), "(1, ['a', 'b'])");
//! ```

use crate::{Error, Result, Value, VariantType};

/// One open container.
struct Frame {
    ty: VariantType,
    items: Vec<VariantType>,
    children: Vec<Value>,
    min_items: usize,
    max_items: Option<usize>,
}

impl Frame {
    fn new(ty: &VariantType) -> Result<Self> {
        if !ty.is_container() {
            return Err(Error::type_mismatch("a container type", ty.as_str()));
        }
        let items = ty.items();
        let (min_items, max_items) = match ty.as_str().as_bytes()[0] {
            b'a' => (0, None),
            b'm' => (0, Some(1)),
            b'v' => (1, Some(1)),
            b'r' => (0, None),
            _ => (items.len(), Some(items.len())),
        };
        Ok(Frame {
            ty: ty.clone(),
            items,
            children: Vec::new(),
            min_items,
            max_items,
        })
    }

    /// Type pattern for the next position, or `None` if the container is full.
    fn slot_type(&self) -> Option<VariantType> {
        let n = self.children.len();
        if self.max_items.is_some_and(|max| n >= max) {
            return None;
        }
        match self.ty.as_str().as_bytes()[0] {
            b'a' | b'm' => self.ty.element(),
            b'v' | b'r' => Some(VariantType::ANY),
            _ => self.items.get(n).cloned(),
        }
    }

    fn full(&self) -> Error {
        Error::OutOfBounds {
            index: self.children.len(),
            len: self.max_items.unwrap_or(self.children.len()),
        }
    }

    /// Checks a finished child of type `child` for the next position.
    fn check_child(&self, child: &VariantType) -> Result<()> {
        let expected = self.slot_type().ok_or_else(|| self.full())?;
        if !child.is_subtype_of(&expected) {
            return Err(Error::type_mismatch(expected.as_str(), child.as_str()));
        }
        // Array elements must all share the first element's type.
        match self.children.first() {
            Some(first) if self.ty.is_array() && first.variant_type() != child => Err(
                Error::type_mismatch(first.type_string(), child.as_str()),
            ),
            _ => Ok(()),
        }
    }

    /// Checks that a container of type `ty` may be opened at the next
    /// position. `ty` may be a pattern; the closed child is checked again.
    fn check_open(&self, ty: &VariantType) -> Result<()> {
        let expected = self.slot_type().ok_or_else(|| self.full())?;
        if !ty.is_subtype_of(&expected) {
            return Err(Error::type_mismatch(expected.as_str(), ty.as_str()));
        }
        match self.children.first() {
            Some(first) if self.ty.is_array() && !first.is_of_type(ty) => {
                Err(Error::type_mismatch(first.type_string(), ty.as_str()))
            }
            _ => Ok(()),
        }
    }

    fn finish(self) -> Result<Value> {
        if self.children.len() < self.min_items {
            let found: Vec<VariantType> = self
                .children
                .iter()
                .map(|c| c.variant_type().clone())
                .collect();
            return Err(Error::type_mismatch(
                self.ty.as_str(),
                VariantType::tuple(&found).as_str(),
            ));
        }

        let mut children = self.children;
        match self.ty.as_str().as_bytes()[0] {
            b'a' => Value::new_array(self.ty.element().as_ref(), children),
            b'm' => Value::new_maybe(self.ty.element().as_ref(), children.pop()),
            b'v' => children
                .pop()
                .map(Value::new_variant)
                .ok_or_else(|| Error::ambiguous("variant requires a child")),
            b'{' => {
                let value = children.pop();
                let key = children.pop();
                match (key, value) {
                    (Some(key), Some(value)) => Value::new_dict_entry(key, value),
                    _ => Err(Error::ambiguous("dictionary entry requires two children")),
                }
            }
            _ => Ok(Value::new_tuple(children)),
        }
    }
}

/// Builds a container value one child at a time.
pub struct VariantBuilder {
    stack: Vec<Frame>,
}

impl VariantBuilder {
    /// Starts building a value of the container type `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `ty` is not a container type.
    pub fn new(ty: &VariantType) -> Result<Self> {
        Ok(VariantBuilder {
            stack: vec![Frame::new(ty)?],
        })
    }

    fn current(&self) -> Result<&Frame> {
        self.stack
            .last()
            .ok_or_else(|| Error::ambiguous("builder has already ended"))
    }

    /// Adds `value` to the innermost open container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value's type is not allowed at
    /// this position and [`Error::OutOfBounds`] if the container is full.
    pub fn add_value(&mut self, value: Value) -> Result<()> {
        self.current()?.check_child(value.variant_type())?;
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(value.sink());
        }
        Ok(())
    }

    /// Opens a nested container of type `ty` at the current position.
    ///
    /// # Errors
    ///
    /// Fails like [`add_value`](VariantBuilder::add_value) would for a value
    /// of type `ty`, or if `ty` is not a container type.
    ///
    /// ```rust
    /// use gvariant::{VariantBuilder, VariantType};
    ///
    /// let mut builder = VariantBuilder::new(&VariantType::new("(ii)").unwrap()).unwrap();
    /// assert!(builder.open(&VariantType::STRING_ARRAY).is_err());
    /// ```
    pub fn open(&mut self, ty: &VariantType) -> Result<()> {
        self.current()?.check_open(ty)?;
        let frame = Frame::new(ty)?;
        self.stack.push(frame);
        Ok(())
    }

    /// Finishes the innermost open container and adds it to its parent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if no container is open or its
    /// element type cannot be determined, and [`Error::TypeMismatch`] if it
    /// has too few children.
    pub fn close(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(Error::ambiguous("no open container to close"));
        }
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::ambiguous("no open container to close"))?;
        let value = frame.finish()?;
        self.add_value(value)
    }

    /// Number of containers opened with [`open`](VariantBuilder::open) and
    /// not yet closed.
    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Finishes the builder and returns the value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if containers are still open or the
    /// type cannot be determined, and [`Error::TypeMismatch`] if a tuple or
    /// dictionary entry is incomplete.
    pub fn end(mut self) -> Result<Value> {
        if self.stack.len() != 1 {
            return Err(Error::ambiguous("builder has unclosed containers"));
        }
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::ambiguous("builder has already ended"))?;
        frame.finish()
    }
}
