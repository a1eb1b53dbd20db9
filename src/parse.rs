//! Text format parsing.
//!
//! Parsing runs in three passes over a small syntax tree:
//!
//! 1. **Syntax**: the input is read into nodes, each remembering its byte
//!    position for error reporting.
//! 2. **Inference**: every node yields a type *pattern*, and patterns of
//!    sibling array elements or dictionary entries are merged. Besides the
//!    type codes, patterns use `N` (integer literal, any numeric type), `D`
//!    (float literal), `S` (string literal: `s`, `o` or `g`), `M` (an
//!    optional implicit maybe) and `*` (unknown).
//! 3. **Construction**: with a definite type fixed, values are built top-down.
//!
//! ## Examples
//!
//! ```rust
//! use gvariant::{from_text, from_text_with_type, VariantType};
//!
//! let v = from_text("[1, 2, 3]").unwrap();
//! assert_eq!(v.type_string(), "ai");
//!
//! let v = from_text_with_type("[1, 2.5]", &VariantType::new("ad").unwrap()).unwrap();
//! assert_eq!(v.child(0).unwrap().as_double(), Some(1.0));
//!
//! let err = from_text("[1, 'a']").unwrap_err();
//! assert_eq!(err.position(), Some(0));
//! ```

use crate::variant_type::type_prefix_len;
use crate::{Error, ParseOptions, Result, Value, VariantType};

/// Parses `text` according to `options`.
pub(crate) fn parse(text: &str, options: &ParseOptions) -> Result<Value> {
    let result = parse_inner(text, options);
    if let Err(err) = &result {
        log::debug!("[parse] rejected text input: {}", err);
    }
    result
}

fn parse_inner(text: &str, options: &ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(text, options.max_depth);
    let node = parser.parse_value(0)?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(Error::parse(parser.position, "expected end of input"));
    }

    let ty = match &options.expected_type {
        Some(ty) if ty.is_definite() => ty.clone(),
        Some(pattern) => {
            let merged = coalesce(&node.pattern()?, pattern.as_str()).ok_or_else(|| {
                Error::parse(
                    node.pos,
                    &format!("can not parse as value of type '{}'", pattern),
                )
            })?;
            resolve(&merged, node.pos)?
        }
        None => resolve(&node.pattern()?, node.pos)?,
    };
    Ok(node.value(&ty)?.sink())
}

struct Node {
    pos: usize,
    kind: Kind,
}

enum Kind {
    Boolean(bool),
    Number { text: String, float: bool },
    Str(String),
    Variant(Box<Node>),
    Array(Vec<Node>),
    Tuple(Vec<Node>),
    Dict(Vec<(Node, Node)>),
    DictEntry(Box<Node>, Box<Node>),
    Nothing,
    Just(Box<Node>),
    Typed(VariantType, Box<Node>),
}

/// Returns the index just past the complete pattern starting at `i`.
fn pattern_end(p: &[u8], i: usize) -> usize {
    match p.get(i) {
        Some(b'a' | b'm' | b'M') => pattern_end(p, i + 1),
        Some(b'(') => {
            let mut j = i + 1;
            while j < p.len() && p[j] != b')' {
                j = pattern_end(p, j);
            }
            j + 1
        }
        Some(b'{') => {
            let j = pattern_end(p, i + 1);
            pattern_end(p, j) + 1
        }
        _ => i + 1,
    }
}

/// Merges two patterns into the most specific pattern both describe.
fn coalesce(left: &str, right: &str) -> Option<String> {
    let (l, r) = (left.as_bytes(), right.as_bytes());
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(l.len().max(r.len()));

    while i < l.len() && j < r.len() {
        if l[i] == r[j] {
            out.push(l[i]);
            i += 1;
            j += 1;
            continue;
        }
        if !coalesce_step(l, &mut i, r, &mut j, &mut out)
            && !coalesce_step(r, &mut j, l, &mut i, &mut out)
        {
            return None;
        }
    }

    if i < l.len() || j < r.len() {
        return None;
    }
    String::from_utf8(out).ok()
}

/// Applies one merge rule with `one[*i]` as the more general side.
fn coalesce_step(one: &[u8], i: &mut usize, other: &[u8], j: &mut usize, out: &mut Vec<u8>) -> bool {
    let (a, b) = (one[*i], other[*j]);
    match a {
        b'*' if b != b')' => {
            let end = pattern_end(other, *j);
            out.extend_from_slice(&other[*j..end]);
            *i += 1;
            *j = end;
        }
        b'M' if b == b'm' => {
            out.push(b'm');
            *j += 1;
        }
        b'M' if b != b'*' => *i += 1,
        b'?' if b"bynqiuxthdsogNDS".contains(&b) => {
            out.push(b);
            *i += 1;
            *j += 1;
        }
        b'r' if b == b'(' => {
            let end = pattern_end(other, *j);
            out.extend_from_slice(&other[*j..end]);
            *i += 1;
            *j = end;
        }
        b'N' if b"ynqiuxthdD".contains(&b) => {
            out.push(b);
            *i += 1;
            *j += 1;
        }
        b'D' if b == b'd' => {
            out.push(b);
            *i += 1;
            *j += 1;
        }
        b'S' if b"sog".contains(&b) => {
            out.push(b);
            *i += 1;
            *j += 1;
        }
        _ => return false,
    }
    true
}

/// Turns a fully inferred pattern into a definite type.
fn resolve(pattern: &str, pos: usize) -> Result<VariantType> {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            'M' => {}
            'N' => out.push('i'),
            'D' => out.push('d'),
            'S' => out.push('s'),
            '*' | '?' | 'r' => return Err(Error::parse(pos, "unable to infer type")),
            c => out.push(c),
        }
    }
    VariantType::new(&out).map_err(|e| Error::parse(pos, &e.to_string()))
}

impl Node {
    fn new(pos: usize, kind: Kind) -> Self {
        Node { pos, kind }
    }

    fn error(&self, message: &str) -> Error {
        Error::parse(self.pos, message)
    }

    fn mismatch(&self, ty: &VariantType) -> Error {
        self.error(&format!("can not parse as value of type '{}'", ty))
    }

    fn merge<'a>(nodes: impl Iterator<Item = &'a Node>, pos: usize) -> Result<String> {
        let mut merged = String::from("*");
        for node in nodes {
            merged = coalesce(&merged, &node.pattern()?)
                .ok_or_else(|| Error::parse(pos, "unable to find a common type"))?;
        }
        Ok(merged)
    }

    fn pattern(&self) -> Result<String> {
        Ok(match &self.kind {
            Kind::Boolean(_) => "Mb".to_string(),
            Kind::Number { float: false, .. } => "MN".to_string(),
            Kind::Number { float: true, .. } => "MD".to_string(),
            Kind::Str(_) => "MS".to_string(),
            Kind::Variant(_) => "Mv".to_string(),
            Kind::Nothing => "m*".to_string(),
            Kind::Just(inner) => format!("m{}", inner.pattern()?),
            Kind::Typed(ty, _) => ty.to_string(),
            Kind::Array(items) => format!("Ma{}", Node::merge(items.iter(), self.pos)?),
            Kind::Dict(entries) => format!(
                "Ma{{{}{}}}",
                Node::merge(entries.iter().map(|(k, _)| k), self.pos)?,
                Node::merge(entries.iter().map(|(_, v)| v), self.pos)?
            ),
            Kind::DictEntry(key, value) => format!("M{{{}{}}}", key.pattern()?, value.pattern()?),
            Kind::Tuple(items) => {
                let mut pattern = String::from("M(");
                for item in items {
                    pattern.push_str(&item.pattern()?);
                }
                pattern.push(')');
                pattern
            }
        })
    }

    /// Builds the value of definite type `ty` this node describes.
    fn value(&self, ty: &VariantType) -> Result<Value> {
        let wrap = |result: Result<Value>| result.map_err(|e| self.error(&e.to_string()));

        match &self.kind {
            Kind::Nothing => match ty.element() {
                Some(element) if ty.is_maybe() => wrap(Value::new_maybe(Some(&element), None)),
                _ => Err(self.mismatch(ty)),
            },
            Kind::Just(inner) => match ty.element() {
                Some(element) if ty.is_maybe() => {
                    let child = inner.value(&element)?;
                    wrap(Value::new_maybe(Some(&element), Some(child)))
                }
                _ => Err(self.mismatch(ty)),
            },
            Kind::Typed(declared, inner) if declared == ty => inner.value(ty),
            _ if ty.is_maybe() => {
                // A bare value where a maybe is expected is an implicit Just.
                let element = ty.element().ok_or_else(|| self.mismatch(ty))?;
                let child = self.value(&element)?;
                wrap(Value::new_maybe(Some(&element), Some(child)))
            }
            Kind::Typed(..) => Err(self.mismatch(ty)),
            Kind::Boolean(b) if ty == &VariantType::BOOLEAN => Ok(Value::new_boolean(*b)),
            Kind::Boolean(_) => Err(self.mismatch(ty)),
            Kind::Number { text, float } => self.number(text, *float, ty),
            Kind::Str(s) => match ty.as_str() {
                "s" => wrap(Value::new_string(s)),
                "o" => wrap(Value::new_object_path(s)),
                "g" => wrap(Value::new_signature(s)),
                _ => Err(self.mismatch(ty)),
            },
            Kind::Variant(inner) if ty.is_variant() => {
                let inner_type = resolve(&inner.pattern()?, inner.pos)?;
                Ok(Value::new_variant(inner.value(&inner_type)?))
            }
            Kind::Array(items) if ty.is_array() => {
                let element = ty.element().ok_or_else(|| self.mismatch(ty))?;
                let children = items
                    .iter()
                    .map(|item| item.value(&element))
                    .collect::<Result<Vec<_>>>()?;
                wrap(Value::new_array(Some(&element), children))
            }
            Kind::Dict(entries) if ty.is_array() => {
                let element = ty.element().ok_or_else(|| self.mismatch(ty))?;
                let (Some(key_type), Some(value_type)) = (element.key(), element.value()) else {
                    return Err(self.mismatch(ty));
                };
                let children = entries
                    .iter()
                    .map(|(k, v)| {
                        let entry = Value::new_dict_entry(k.value(&key_type)?, v.value(&value_type)?);
                        entry.map_err(|e| k.error(&e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                wrap(Value::new_array(Some(&element), children))
            }
            Kind::DictEntry(key, value) if ty.is_dict_entry() => {
                let (Some(key_type), Some(value_type)) = (ty.key(), ty.value()) else {
                    return Err(self.mismatch(ty));
                };
                wrap(Value::new_dict_entry(
                    key.value(&key_type)?,
                    value.value(&value_type)?,
                ))
            }
            Kind::Tuple(items) if ty.is_tuple() && ty.n_items() == items.len() => {
                let children = items
                    .iter()
                    .zip(ty.items())
                    .map(|(item, item_type)| item.value(&item_type))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::new_tuple(children))
            }
            _ => Err(self.mismatch(ty)),
        }
    }

    fn number(&self, text: &str, float: bool, ty: &VariantType) -> Result<Value> {
        let code = ty.as_str();
        if code == "d" {
            let value = if float {
                text.parse::<f64>()
                    .map_err(|_| self.error("invalid floating point number"))?
            } else {
                self.integer(text)? as f64
            };
            return Ok(Value::new_double(value));
        }
        if !matches!(code, "y" | "n" | "q" | "i" | "u" | "x" | "t" | "h") {
            return Err(self.mismatch(ty));
        }
        if float {
            return Err(self.error(&format!(
                "floating point literal where '{}' was expected",
                ty
            )));
        }
        let n = self.integer(text)?;
        let out_of_range = || self.error(&format!("number out of range for type '{}'", ty));
        Ok(match code {
            "y" => Value::new_byte(u8::try_from(n).map_err(|_| out_of_range())?),
            "n" => Value::new_int16(i16::try_from(n).map_err(|_| out_of_range())?),
            "q" => Value::new_uint16(u16::try_from(n).map_err(|_| out_of_range())?),
            "i" => Value::new_int32(i32::try_from(n).map_err(|_| out_of_range())?),
            "u" => Value::new_uint32(u32::try_from(n).map_err(|_| out_of_range())?),
            "x" => Value::new_int64(i64::try_from(n).map_err(|_| out_of_range())?),
            "t" => Value::new_uint64(u64::try_from(n).map_err(|_| out_of_range())?),
            _ => Value::new_handle(i32::try_from(n).map_err(|_| out_of_range())?),
        })
    }

    fn integer(&self, text: &str) -> Result<i128> {
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => i128::from_str_radix(hex, 16),
            None => digits.parse::<i128>(),
        }
        .map_err(|_| self.error("invalid number"))?;
        Ok(if negative { -magnitude } else { magnitude })
    }
}

/// Type named by a keyword such as `uint32` or `objectpath`.
fn keyword_type(word: &str) -> Option<VariantType> {
    Some(match word {
        "boolean" => VariantType::BOOLEAN,
        "byte" => VariantType::BYTE,
        "int16" => VariantType::INT16,
        "uint16" => VariantType::UINT16,
        "int32" => VariantType::INT32,
        "uint32" => VariantType::UINT32,
        "handle" => VariantType::HANDLE,
        "int64" => VariantType::INT64,
        "uint64" => VariantType::UINT64,
        "double" => VariantType::DOUBLE,
        "string" => VariantType::STRING,
        "objectpath" => VariantType::OBJECT_PATH,
        "signature" => VariantType::SIGNATURE,
        _ => return None,
    })
}

/// Reads text into [`Node`]s.
struct Parser<'a> {
    input: &'a str,
    position: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, max_depth: usize) -> Self {
        Parser {
            input,
            position: 0,
            max_depth,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error(&self, message: &str) -> Error {
        Error::parse(self.position, message)
    }

    /// Skips whitespace and consumes `expected` if it comes next.
    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Node> {
        self.skip_whitespace();
        if depth > self.max_depth {
            return Err(self.error("nesting too deep"));
        }
        let pos = self.position;
        match self.peek_char() {
            None => Err(self.error("unexpected end of input")),
            Some('@') => {
                self.next_char();
                let ty = self.parse_type()?;
                let inner = self.parse_value(depth + 1)?;
                Ok(Node::new(pos, Kind::Typed(ty, Box::new(inner))))
            }
            Some('[') => self.parse_array(depth),
            Some('(') => self.parse_tuple(depth),
            Some('{') => self.parse_dict(depth),
            Some('<') => {
                self.next_char();
                let inner = self.parse_value(depth + 1)?;
                self.expect('>')?;
                Ok(Node::new(pos, Kind::Variant(Box::new(inner))))
            }
            Some(quote @ ('\'' | '"')) => {
                self.next_char();
                let s = self.parse_string(quote)?;
                Ok(Node::new(pos, Kind::Str(s)))
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(depth),
            Some(c) => Err(self.error(&format!("unexpected character '{}'", c))),
        }
    }

    fn parse_type(&mut self) -> Result<VariantType> {
        let rest = &self.input[self.position..];
        let len = type_prefix_len(rest).ok_or_else(|| self.error("invalid type annotation"))?;
        let ty = VariantType::new(&rest[..len]).map_err(|e| self.error(&e.to_string()))?;
        if !ty.is_definite() {
            return Err(self.error("type annotation must be definite"));
        }
        self.position += len;
        Ok(ty)
    }

    fn parse_array(&mut self, depth: usize) -> Result<Node> {
        let pos = self.position;
        self.next_char();
        let mut items = Vec::new();
        if !self.eat(']') {
            loop {
                items.push(self.parse_value(depth + 1)?);
                if self.eat(']') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.error("expected ',' or ']'"));
                }
            }
        }
        Ok(Node::new(pos, Kind::Array(items)))
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<Node> {
        let pos = self.position;
        self.next_char();
        let mut items = Vec::new();
        if !self.eat(')') {
            loop {
                items.push(self.parse_value(depth + 1)?);
                if self.eat(')') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.error("expected ',' or ')'"));
                }
                // A trailing comma marks a one-element tuple.
                if self.eat(')') {
                    break;
                }
            }
        }
        Ok(Node::new(pos, Kind::Tuple(items)))
    }

    /// Parses `{k: v, ...}` dictionaries and `{k, v}` dictionary entries.
    fn parse_dict(&mut self, depth: usize) -> Result<Node> {
        let pos = self.position;
        self.next_char();
        if self.eat('}') {
            return Ok(Node::new(pos, Kind::Dict(Vec::new())));
        }
        let key = self.parse_value(depth + 1)?;
        if self.eat(',') {
            let value = self.parse_value(depth + 1)?;
            self.expect('}')?;
            return Ok(Node::new(pos, Kind::DictEntry(Box::new(key), Box::new(value))));
        }
        self.expect(':')?;
        let mut entries = vec![(key, self.parse_value(depth + 1)?)];
        while !self.eat('}') {
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}'"));
            }
            let key = self.parse_value(depth + 1)?;
            self.expect(':')?;
            entries.push((key, self.parse_value(depth + 1)?));
        }
        Ok(Node::new(pos, Kind::Dict(entries)))
    }

    fn parse_string(&mut self, quote: char) -> Result<String> {
        let mut result = String::new();
        while let Some(ch) = self.next_char() {
            match ch {
                c if c == quote => return Ok(result),
                '\\' => match self.next_char() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some('b') => result.push('\u{0008}'),
                    Some('f') => result.push('\u{000C}'),
                    Some('v') => result.push('\u{000B}'),
                    Some('a') => result.push('\u{0007}'),
                    Some('u') => result.push(self.parse_unicode_escape(4)?),
                    Some('U') => result.push(self.parse_unicode_escape(8)?),
                    Some(other) => result.push(other),
                    None => return Err(self.error("unterminated string")),
                },
                other => result.push(other),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn parse_unicode_escape(&mut self, digits: usize) -> Result<char> {
        let start = self.position;
        for _ in 0..digits {
            match self.next_char() {
                Some(c) if c.is_ascii_hexdigit() => {}
                _ => return Err(Error::parse(start, "invalid unicode escape")),
            }
        }
        u32::from_str_radix(&self.input[start..self.position], 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Error::parse(start, "invalid unicode code point"))
    }

    fn parse_number(&mut self) -> Result<Node> {
        let pos = self.position;
        if matches!(self.peek_char(), Some('-' | '+')) {
            self.next_char();
        }
        let mut prev = ' ';
        while let Some(c) = self.peek_char() {
            let exponent_sign = matches!(c, '-' | '+') && matches!(prev, 'e' | 'E');
            if c.is_ascii_alphanumeric() || c == '.' || exponent_sign {
                prev = c;
                self.next_char();
            } else {
                break;
            }
        }
        let text = &self.input[pos..self.position];
        let unsigned = text.trim_start_matches(['-', '+']);
        let hex = unsigned.starts_with("0x") || unsigned.starts_with("0X");
        let float = !hex
            && (unsigned.contains(['.', 'e', 'E'])
                || unsigned.eq_ignore_ascii_case("inf")
                || unsigned.eq_ignore_ascii_case("nan"));
        if unsigned.is_empty() {
            return Err(Error::parse(pos, "invalid number"));
        }
        Ok(Node::new(
            pos,
            Kind::Number {
                text: text.to_string(),
                float,
            },
        ))
    }

    fn parse_keyword(&mut self, depth: usize) -> Result<Node> {
        let pos = self.position;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.next_char();
        }
        let word = &self.input[pos..self.position];
        let kind = match word {
            "true" => Kind::Boolean(true),
            "false" => Kind::Boolean(false),
            "nothing" => Kind::Nothing,
            "just" => Kind::Just(Box::new(self.parse_value(depth + 1)?)),
            w if w.eq_ignore_ascii_case("inf") || w.eq_ignore_ascii_case("nan") => Kind::Number {
                text: w.to_string(),
                float: true,
            },
            w => match keyword_type(w) {
                Some(ty) => {
                    let inner = self.parse_value(depth + 1)?;
                    Kind::Typed(ty, Box::new(inner))
                }
                None => return Err(Error::parse(pos, &format!("unknown keyword '{}'", w))),
            },
        };
        Ok(Node::new(pos, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Result<Value> {
        parse(text, &ParseOptions::new())
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(coalesce("MN", "MN").as_deref(), Some("MN"));
        assert_eq!(coalesce("MN", "u").as_deref(), Some("u"));
        assert_eq!(coalesce("MN", "MD").as_deref(), Some("MD"));
        assert_eq!(coalesce("*", "MaMN").as_deref(), Some("MaMN"));
        assert_eq!(coalesce("m*", "MS").as_deref(), Some("mMS"));
        assert_eq!(coalesce("a{s*}", "Ma{MSMv}").as_deref(), Some("a{sMv}"));
        assert_eq!(coalesce("MN", "MS"), None);
        assert_eq!(coalesce("(MN)", "(MNMN)"), None);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("MaMN", 0).unwrap().as_str(), "ai");
        assert_eq!(resolve("M(MSMD)", 0).unwrap().as_str(), "(sd)");
        assert!(resolve("Ma*", 0).is_err());
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_str("true").unwrap().as_bool(), Some(true));
        assert_eq!(parse_str("-12").unwrap().as_int32(), Some(-12));
        assert_eq!(parse_str("1.5").unwrap().as_double(), Some(1.5));
        assert_eq!(parse_str("1e3").unwrap().as_double(), Some(1000.0));
        assert_eq!(parse_str("byte 0x1f").unwrap().as_byte(), Some(0x1f));
        assert_eq!(parse_str("uint64 18446744073709551615").unwrap().as_uint64(), Some(u64::MAX));
        assert!(parse_str("nan").unwrap().as_double().unwrap().is_nan());
        assert_eq!(parse_str("-inf").unwrap().as_double(), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_str(r#"'it\'s'"#).unwrap().as_str(), Some("it's"));
        assert_eq!(parse_str(r#""tab\there""#).unwrap().as_str(), Some("tab\there"));
        assert_eq!(parse_str(r"'é'").unwrap().as_str(), Some("é"));
        let path = parse_str("objectpath '/a/b'").unwrap();
        assert_eq!(path.type_string(), "o");
    }

    #[test]
    fn test_containers() {
        assert_eq!(parse_str("[1, 2]").unwrap().type_string(), "ai");
        assert_eq!(parse_str("(1, 'a', true)").unwrap().type_string(), "(isb)");
        assert_eq!(parse_str("(5,)").unwrap().type_string(), "(i)");
        assert_eq!(parse_str("()").unwrap().type_string(), "()");
        assert_eq!(parse_str("{1: 'a'}").unwrap().type_string(), "a{is}");
        assert_eq!(parse_str("{1, 'a'}").unwrap().type_string(), "{is}");
        assert_eq!(parse_str("[<1>, <'a'>]").unwrap().type_string(), "av");
        assert_eq!(parse_str("[1, 2.5]").unwrap().type_string(), "ad");
        assert_eq!(parse_str("[nothing, 'a']").unwrap().type_string(), "ams");
        assert_eq!(parse_str("just just 3").unwrap().type_string(), "mmi");
        assert_eq!(parse_str("@as []").unwrap().type_string(), "as");
        assert_eq!(parse_str("[[], [uint16 1]]").unwrap().type_string(), "aaq");
    }

    #[test]
    fn test_implicit_just() {
        let options = ParseOptions::new().with_type(VariantType::new("ms").unwrap());
        let v = parse("'x'", &options).unwrap();
        assert_eq!(v.as_maybe().unwrap().unwrap().as_str(), Some("x"));
    }

    #[test]
    fn test_errors_carry_positions() {
        assert_eq!(parse_str("[1, 'a']").unwrap_err().position(), Some(0));
        assert_eq!(parse_str("[1 2]").unwrap_err().position(), Some(3));
        assert_eq!(parse_str("'abc").unwrap_err().position(), Some(4));
        assert_eq!(parse_str("[]").unwrap_err().position(), Some(0));
        assert_eq!(parse_str("1 2").unwrap_err().position(), Some(2));
        assert_eq!(parse_str("wat").unwrap_err().position(), Some(0));
        assert!(parse_str("byte 256").is_err());
        assert!(parse_str("int32 1.5").is_err());
        assert!(parse_str("objectpath 'nope'").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "[".repeat(200), "]".repeat(200));
        assert!(matches!(parse_str(&deep), Err(Error::Parse { .. })));
        let ok = format!("{}1{}", "[".repeat(64), "]".repeat(64));
        assert_eq!(parse_str(&ok).unwrap().variant_type().depth(), 65);
    }
}
