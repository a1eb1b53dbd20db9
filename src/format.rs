//! Wire and text format reference
//!
//! This module documents the formats implemented by this library. It
//! contains no code.
//!
//! # Type strings
//!
//! Every value has a type, written as a compact ASCII string.
//!
//! | Code | Type | Size | Alignment |
//! |------|------|------|-----------|
//! | `b` | boolean | 1 | 1 |
//! | `y` | byte | 1 | 1 |
//! | `n` / `q` | int16 / uint16 | 2 | 2 |
//! | `i` / `u` | int32 / uint32 | 4 | 4 |
//! | `h` | handle (int32) | 4 | 4 |
//! | `x` / `t` | int64 / uint64 | 8 | 8 |
//! | `d` | double | 8 | 8 |
//! | `s` | string | variable | 1 |
//! | `o` | object path | variable | 1 |
//! | `g` | signature | variable | 1 |
//! | `v` | variant | variable | 8 |
//! | `aT` | array of `T` | variable | of `T` |
//! | `mT` | maybe `T` | variable | of `T` |
//! | `(T...)` | tuple | fixed if all members are | largest member |
//! | `{KV}` | dictionary entry, `K` basic | like a tuple | largest member |
//!
//! The wildcards `*` (any type), `?` (any basic type) and `r` (any tuple)
//! make a type *indefinite*. Indefinite types are patterns: they can be
//! matched against and used as parser hints, but no value has one.
//!
//! The unit type `()` has fixed size 1; its single byte is zero.
//!
//! # Wire format
//!
//! Values serialise without any type information; the reader must already
//! know the type. All integers are little-endian in this library's output,
//! see [`Value::byteswap`](crate::Value::byteswap) for exchanging data with
//! big-endian producers.
//!
//! ## Framing offsets
//!
//! Containers locate variable-sized children through *framing offsets*:
//! little-endian integers recording where a child ends. Their width is
//! picked from the total container size:
//!
//! | Container size | Offset width |
//! |----------------|--------------|
//! | 0 | 0 |
//! | 1 ..= 255 | 1 |
//! | 256 ..= 65535 | 2 |
//! | 65536 ..= 2³²-1 | 4 |
//! | larger | 8 |
//!
//! The size considered includes the offsets themselves, so the smallest
//! width that fits is chosen.
//!
//! ## Strings
//!
//! UTF-8 content followed by a single NUL byte. `"hi"` is `68 69 00`.
//!
//! ## Arrays
//!
//! Fixed-size elements are packed back to back, each aligned. Variable-size
//! elements are followed by one framing offset per element, in element
//! order:
//!
//! ```text
//! ['a', 'b'] as `as`:  61 00 62 00 | 02 04
//! ```
//!
//! The element count follows from the last offset. An empty array is zero
//! bytes long.
//!
//! ## Maybes
//!
//! `Nothing` is zero bytes. `Just x` of a fixed-size element is exactly the
//! bytes of `x`. `Just x` of a variable-size element is the bytes of `x`
//! followed by a single zero byte, so that an empty `x` is told apart from
//! `Nothing`.
//!
//! ## Tuples and dictionary entries
//!
//! Members are laid out in order, each aligned. Every variable-size member
//! except the last is followed by a framing offset; the offsets are stored
//! at the very end of the container in *reverse* member order.
//!
//! ```text
//! (500, 'hi') as `(is)`:  f4 01 00 00 68 69 00
//! ```
//!
//! No offset appears above because the only variable member is the last one.
//!
//! A tuple whose members are all fixed-size is itself fixed-size, padded at
//! the end to a multiple of its alignment.
//!
//! ## Variants
//!
//! The child's serialised bytes, a zero byte, then the child's type string:
//!
//! ```text
//! <5> as `v`:  05 00 00 00 00 69
//! ```
//!
//! # Untrusted data
//!
//! Loading never fails on malformed data. Readers substitute defaults:
//!
//! - a child whose frame lies outside the container reads as zero bytes of
//!   its fixed size, or as empty data
//! - a string without a terminating NUL or with invalid UTF-8 reads as `""`
//! - an invalid object path reads as `"/"`, an invalid signature as `""`
//! - a variant with an unknown, indefinite or too deeply nested type reads
//!   as `()`
//!
//! Data in *normal form* has no such defects and also uses minimal offset
//! widths and zeroed padding. [`Value::normal_form`](crate::Value::normal_form)
//! rebuilds any value into normal form.
//!
//! # Text format
//!
//! Values print and parse in a literal syntax:
//!
//! | Value | Text |
//! |-------|------|
//! | booleans | `true`, `false` |
//! | integers | `5`, `-3`, `0x1f`; typed with `byte`, `int16`, `uint16`, `int32`, `uint32`, `int64`, `uint64`, `handle` |
//! | doubles | `1.5`, `2e3`, `inf`, `nan` |
//! | strings | `'it'`, `"it's"`; escapes `\n \t \r \b \f \v \a \uXXXX \UXXXXXXXX` |
//! | object paths, signatures | `objectpath '/a'`, `signature 'as'` |
//! | variants | `<5>` |
//! | maybes | `nothing`, `just 5`, or the bare child |
//! | arrays | `[1, 2]` |
//! | tuples | `()`, `(1,)`, `(1, 'a')` |
//! | dictionaries | `{'a': 1, 'b': 2}`, a single entry `{'a', 1}` |
//! | type annotation | `@as []`, `@mi nothing` |
//!
//! Without annotation, integers are `int32`, floating point literals are
//! `double` and strings are `string`. Elements of an array must agree:
//! `[1, uint32 2]` fails, while `[nothing, 'a']` is `ms`.
//!
//! Printing with type annotations emits exactly the annotations needed to
//! parse the text back to the same type without a hint.
