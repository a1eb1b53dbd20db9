//! Configuration for the text format.
//!
//! - [`PrintOptions`]: controls how values are printed
//! - [`ParseOptions`]: controls how text is parsed
//!
//! ## Examples
//!
//! ```rust
//! use gvariant::{from_text_with_options, to_text_with_options, ParseOptions, PrintOptions, Value, VariantType};
//!
//! let v = Value::new_uint32(7);
//! assert_eq!(to_text_with_options(&v, PrintOptions::new()), "7");
//! assert_eq!(to_text_with_options(&v, PrintOptions::annotated()), "uint32 7");
//!
//! let options = ParseOptions::new().with_type(VariantType::UINT32);
//! assert_eq!(from_text_with_options("7", options).unwrap(), v);
//! ```

use crate::{VariantType, MAX_DEPTH};

/// Options for printing values as text.
///
/// # Examples
///
/// ```rust
/// use gvariant::PrintOptions;
///
/// let options = PrintOptions::new().with_type_annotations(true);
/// assert!(options.type_annotate);
/// assert_eq!(options, PrintOptions::annotated());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PrintOptions {
    /// Add the annotations needed to recover the exact type when parsing
    /// without a type hint.
    pub type_annotate: bool,
}

impl PrintOptions {
    /// Plain output without type annotations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output with type annotations.
    #[must_use]
    pub fn annotated() -> Self {
        PrintOptions {
            type_annotate: true,
        }
    }

    #[must_use]
    pub fn with_type_annotations(mut self, type_annotate: bool) -> Self {
        self.type_annotate = type_annotate;
        self
    }
}

/// Options for parsing text into values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum container nesting accepted before the parser gives up.
    pub max_depth: usize,
    /// Type the parsed value must have; may be a pattern.
    pub expected_type: Option<VariantType>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: MAX_DEPTH,
            expected_type: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits container nesting. Values below 64 are raised to 64.
    ///
    /// ```rust
    /// use gvariant::ParseOptions;
    ///
    /// assert_eq!(ParseOptions::new().with_max_depth(10).max_depth, 64);
    /// assert_eq!(ParseOptions::new().with_max_depth(100).max_depth, 100);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(64);
        self
    }

    /// Requires the parsed value to be of type `ty`.
    #[must_use]
    pub fn with_type(mut self, ty: VariantType) -> Self {
        self.expected_type = Some(ty);
        self
    }
}
