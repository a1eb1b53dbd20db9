//! Text format printing.
//!
//! The printer is the inverse of [`crate::parse`]: with type annotations
//! enabled its output parses back to an equal value without a type hint.
//!
//! | Value | Plain | Annotated |
//! |---|---|---|
//! | `int32 5` | `5` | `5` |
//! | `uint32 5` | `5` | `uint32 5` |
//! | `byte 5` | `0x05` | `byte 0x05` |
//! | empty `as` | `[]` | `@as []` |
//! | `ms` Nothing | `nothing` | `@ms nothing` |
//! | variant | `<5>` | `<5>` |
//!
//! Variant contents are always annotated.

use crate::value::Class;
use crate::{PrintOptions, Value};
use std::fmt::{self, Write as _};

/// Prints `value` according to `options`.
pub(crate) fn print(value: &Value, options: &PrintOptions) -> String {
    let mut printer = Printer::new();
    printer.write_value(value, options.type_annotate);
    printer.into_inner()
}

struct Printer {
    output: String,
}

impl Printer {
    fn new() -> Self {
        Printer {
            output: String::new(),
        }
    }

    fn into_inner(self) -> String {
        self.output
    }

    /// Target of `write!(self, ...)`. Formatting into a `String` cannot fail.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.output.write_fmt(args);
    }

    fn annotate(&mut self, keyword: &str, type_annotate: bool) {
        if type_annotate {
            self.output.push_str(keyword);
            self.output.push(' ');
        }
    }

    fn write_value(&mut self, value: &Value, type_annotate: bool) {
        match value.classify() {
            Class::Boolean => {
                let b = value.as_bool().unwrap_or_default();
                self.output.push_str(if b { "true" } else { "false" });
            }
            Class::Byte => {
                self.annotate("byte", type_annotate);
                write!(self, "0x{:02x}", value.as_byte().unwrap_or_default());
            }
            Class::Int16 => {
                self.annotate("int16", type_annotate);
                write!(self, "{}", value.as_int16().unwrap_or_default());
            }
            Class::Uint16 => {
                self.annotate("uint16", type_annotate);
                write!(self, "{}", value.as_uint16().unwrap_or_default());
            }
            Class::Int32 => {
                write!(self, "{}", value.as_int32().unwrap_or_default());
            }
            Class::Uint32 => {
                self.annotate("uint32", type_annotate);
                write!(self, "{}", value.as_uint32().unwrap_or_default());
            }
            Class::Int64 => {
                self.annotate("int64", type_annotate);
                write!(self, "{}", value.as_int64().unwrap_or_default());
            }
            Class::Uint64 => {
                self.annotate("uint64", type_annotate);
                write!(self, "{}", value.as_uint64().unwrap_or_default());
            }
            Class::Handle => {
                self.annotate("handle", type_annotate);
                write!(self, "{}", value.as_handle().unwrap_or_default());
            }
            Class::Double => self.write_double(value.as_double().unwrap_or_default()),
            Class::String => self.write_string(value.as_str().unwrap_or_default()),
            Class::ObjectPath => {
                self.annotate("objectpath", type_annotate);
                self.write_string(value.as_str().unwrap_or("/"));
            }
            Class::Signature => {
                self.annotate("signature", type_annotate);
                self.write_string(value.as_str().unwrap_or_default());
            }
            Class::Variant => {
                self.output.push('<');
                if let Some(inner) = value.as_variant() {
                    self.write_value(&inner, true);
                }
                self.output.push('>');
            }
            Class::Maybe => self.write_maybe(value, type_annotate),
            Class::Array => self.write_array(value, type_annotate),
            Class::Tuple => self.write_tuple(value, type_annotate),
            Class::DictEntry => {
                self.output.push('{');
                self.write_children(value, type_annotate, ", ");
                self.output.push('}');
            }
        }
    }

    fn write_double(&mut self, d: f64) {
        if d.is_nan() {
            self.output.push_str("nan");
        } else {
            // Debug output always keeps a '.' or exponent, so it reads back as a float.
            write!(self, "{:?}", d);
        }
    }

    fn write_maybe(&mut self, value: &Value, type_annotate: bool) {
        if type_annotate {
            write!(self, "@{} ", value.type_string());
        }
        match value.as_maybe().flatten() {
            None => self.output.push_str("nothing"),
            Some(inner) => {
                if inner.classify() == Class::Maybe {
                    self.output.push_str("just ");
                }
                self.write_value(&inner, false);
            }
        }
    }

    fn write_array(&mut self, value: &Value, type_annotate: bool) {
        let is_dict = value.type_string().starts_with("a{");
        if value.n_children() == 0 {
            if type_annotate {
                write!(self, "@{} ", value.type_string());
            }
            self.output.push_str(if is_dict { "{}" } else { "[]" });
            return;
        }

        // Only the first element carries annotations; the rest share its type.
        self.output.push(if is_dict { '{' } else { '[' });
        for (i, child) in value.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let annotate = type_annotate && i == 0;
            if is_dict {
                if let (Ok(key), Ok(entry_value)) = (child.child(0), child.child(1)) {
                    self.write_value(&key, annotate);
                    self.output.push_str(": ");
                    self.write_value(&entry_value, annotate);
                }
            } else {
                self.write_value(&child, annotate);
            }
        }
        self.output.push(if is_dict { '}' } else { ']' });
    }

    fn write_tuple(&mut self, value: &Value, type_annotate: bool) {
        self.output.push('(');
        self.write_children(value, type_annotate, ", ");
        if value.n_children() == 1 {
            self.output.push(',');
        }
        self.output.push(')');
    }

    fn write_children(&mut self, value: &Value, type_annotate: bool, separator: &str) {
        for (i, child) in value.iter().enumerate() {
            if i > 0 {
                self.output.push_str(separator);
            }
            self.write_value(&child, type_annotate);
        }
    }

    fn write_string(&mut self, s: &str) {
        let quote = if s.contains('\'') && !s.contains('"') {
            '"'
        } else {
            '\''
        };
        self.output.push(quote);
        for ch in s.chars() {
            match ch {
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                '\r' => self.output.push_str("\\r"),
                '\u{0008}' => self.output.push_str("\\b"),
                '\u{000C}' => self.output.push_str("\\f"),
                '\u{000B}' => self.output.push_str("\\v"),
                '\u{0007}' => self.output.push_str("\\a"),
                c if c == quote => {
                    self.output.push('\\');
                    self.output.push(c);
                }
                c if c.is_control() => {
                    write!(self, "\\u{:04x}", c as u32);
                }
                c => self.output.push(c),
            }
        }
        self.output.push(quote);
    }
}
