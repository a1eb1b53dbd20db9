//! The binary codec.
//!
//! Everything here works on plain byte slices plus a [`TypeInfo`]: locating
//! children inside a serialised container, sizing and writing containers from
//! their children, checking normal form and swapping byte order. Nothing in
//! this module allocates values; [`crate::Value`] builds on top of it.
//!
//! ## Framing offsets
//!
//! Containers with variable-sized children record where those children end
//! in little-endian *framing offsets* at the end of the container. The width
//! of every offset in a container is chosen from the container's total size:
//!
//! | Total size | Width |
//! |---|---|
//! | 0 | 0 |
//! | 1 ..= 0xff | 1 |
//! | 0x100 ..= 0xffff | 2 |
//! | 0x1_0000 ..= 0xffff_ffff | 4 |
//! | larger | 8 |
//!
//! Arrays store one offset per element, in element order. Tuples store one
//! offset per variable-sized member except the last, in reverse member order.
//!
//! ## Untrusted data
//!
//! Readers never fail. A child whose framing is inconsistent is reported as
//! absent, and the caller substitutes zero bytes of the child's fixed size
//! (or an empty buffer for variable-sized children).

use crate::type_info::{self, Layout, MemberEnding, TypeInfo};
use crate::variant_type::{is_object_path, is_signature};
use crate::{VariantType, MAX_DEPTH};
use std::ops::Range;

/// Width in bytes of each framing offset in a container of `size` bytes.
///
/// # Examples
///
/// ```rust
/// use gvariant::serialised::offset_size;
///
/// assert_eq!(offset_size(0), 0);
/// assert_eq!(offset_size(255), 1);
/// assert_eq!(offset_size(256), 2);
/// assert_eq!(offset_size(65536), 4);
/// ```
#[inline]
pub fn offset_size(size: usize) -> usize {
    let size = size as u64;
    if size > u64::from(u32::MAX) {
        8
    } else if size > u64::from(u16::MAX) {
        4
    } else if size > u64::from(u8::MAX) {
        2
    } else if size > 0 {
        1
    } else {
        0
    }
}

/// Total size of a container whose children occupy `body_size` bytes and
/// which needs `n_offsets` framing offsets.
#[inline]
pub fn total_size(body_size: usize, n_offsets: usize) -> usize {
    if n_offsets == 0 {
        return body_size;
    }
    let fits = |width: usize, max: u64| (body_size + width * n_offsets) as u64 <= max;
    if fits(1, u64::from(u8::MAX)) {
        body_size + n_offsets
    } else if fits(2, u64::from(u16::MAX)) {
        body_size + 2 * n_offsets
    } else if fits(4, u64::from(u32::MAX)) {
        body_size + 4 * n_offsets
    } else {
        body_size + 8 * n_offsets
    }
}

#[inline]
fn read_offset(data: &[u8], pos: usize, width: usize) -> usize {
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(&data[pos..pos + width]);
    usize::try_from(u64::from_le_bytes(buf)).unwrap_or(usize::MAX)
}

#[inline]
fn write_offset(out: &mut [u8], pos: usize, value: usize, width: usize) {
    out[pos..pos + width].copy_from_slice(&(value as u64).to_le_bytes()[..width]);
}

#[inline]
fn align_up(offset: usize, mask: usize) -> Option<usize> {
    offset.checked_add(mask).map(|v| v & !mask)
}

/// Something that can be written as one child of a container.
pub(crate) trait Filler {
    fn type_info(&self) -> &TypeInfo;
    fn serialised_size(&self) -> usize;
    fn write_to(&self, out: &mut [u8]);
}

/// Where a child lives inside its container's bytes.
pub(crate) struct ChildSlot {
    pub type_info: TypeInfo,
    /// `None` when the container's framing does not yield a usable range.
    pub range: Option<Range<usize>>,
    /// Size to substitute with zero bytes when `range` is `None`.
    pub fallback_size: usize,
}

impl ChildSlot {
    fn present(type_info: TypeInfo, range: Range<usize>) -> Self {
        ChildSlot {
            type_info,
            range: Some(range),
            fallback_size: 0,
        }
    }

    fn absent(type_info: TypeInfo) -> Self {
        let fallback_size = type_info.fixed_size().unwrap_or(0);
        ChildSlot {
            type_info,
            range: None,
            fallback_size,
        }
    }
}

struct ArrayFrame {
    width: usize,
    last_end: usize,
    n: usize,
}

fn array_frame(data: &[u8]) -> Option<ArrayFrame> {
    let size = data.len();
    if size == 0 {
        return None;
    }
    let width = offset_size(size);
    let last_end = read_offset(data, size - width, width);
    if last_end > size {
        return None;
    }
    let table = size - last_end;
    if table % width != 0 {
        return None;
    }
    Some(ArrayFrame {
        width,
        last_end,
        n: table / width,
    })
}

/// Number of children the container in `data` holds.
pub(crate) fn n_children(info: &TypeInfo, data: &[u8]) -> usize {
    match info.layout() {
        Layout::Fixed | Layout::Text => 0,
        Layout::Variant => 1,
        Layout::Maybe(element) => match element.fixed_size() {
            Some(fixed) => usize::from(data.len() == fixed),
            None => usize::from(!data.is_empty()),
        },
        Layout::Array(element) => match element.fixed_size() {
            Some(fixed) if data.len() % fixed == 0 => data.len() / fixed,
            Some(_) => 0,
            None => array_frame(data).map_or(0, |frame| frame.n),
        },
        Layout::Tuple(members) => members.len(),
    }
}

/// Locates child `index` of the container in `data`.
///
/// `depth` is the nesting depth of the container itself. `index` must be
/// below [`n_children`].
pub(crate) fn child_slot(info: &TypeInfo, data: &[u8], index: usize, depth: usize) -> ChildSlot {
    match info.layout() {
        Layout::Fixed | Layout::Text => unreachable!("basic values have no children"),
        Layout::Maybe(element) => {
            let end = match element.fixed_size() {
                Some(fixed) => fixed,
                None => data.len().saturating_sub(1),
            };
            ChildSlot::present(element.clone(), 0..end)
        }
        Layout::Array(element) => match element.fixed_size() {
            Some(fixed) => ChildSlot::present(element.clone(), index * fixed..(index + 1) * fixed),
            None => variable_array_child(element, data, index),
        },
        Layout::Tuple(members) => tuple_child(members, data, index),
        Layout::Variant => variant_child(data, depth),
    }
}

fn variable_array_child(element: &TypeInfo, data: &[u8], index: usize) -> ChildSlot {
    let Some(frame) = array_frame(data) else {
        return ChildSlot::absent(element.clone());
    };
    if index >= frame.n {
        return ChildSlot::absent(element.clone());
    }
    let start = if index == 0 {
        Some(0)
    } else {
        let prev = read_offset(data, frame.last_end + (index - 1) * frame.width, frame.width);
        align_up(prev, element.alignment_mask())
    };
    let end = read_offset(data, frame.last_end + index * frame.width, frame.width);
    match start {
        Some(start) if start <= end && end <= frame.last_end => {
            ChildSlot::present(element.clone(), start..end)
        }
        _ => ChildSlot::absent(element.clone()),
    }
}

fn tuple_child(members: &[type_info::MemberInfo], data: &[u8], index: usize) -> ChildSlot {
    let member = &members[index];
    let info = member.type_info().clone();
    let size = data.len();
    let width = offset_size(size);
    let n_frames = members.last().map_or(0, |m| m.end_frame());

    let Some(frames_start) = size.checked_sub(width * n_frames) else {
        return ChildSlot::absent(info);
    };

    let base = match member.frame() {
        Some(frame) => read_offset(data, size - width * (frame + 1), width),
        None => 0,
    };
    let Some(start) = member.start(base) else {
        return ChildSlot::absent(info);
    };

    let end = match member.ending() {
        MemberEnding::Fixed => start.checked_add(info.fixed_size().unwrap_or(0)),
        MemberEnding::Last => Some(frames_start),
        MemberEnding::Offset => {
            let pos = member.end_frame() + 1;
            Some(read_offset(data, size - width * pos, width))
        }
    };

    match end {
        Some(end) if start <= end && end <= frames_start => ChildSlot::present(info, start..end),
        _ => ChildSlot::absent(info),
    }
}

fn variant_child(data: &[u8], depth: usize) -> ChildSlot {
    if let Some(slot) = parse_variant(data, depth) {
        return slot;
    }
    log::trace!("[serialised] malformed variant content, substituting ()");
    ChildSlot {
        type_info: type_info::intern_definite(&VariantType::UNIT),
        range: None,
        fallback_size: 1,
    }
}

fn parse_variant(data: &[u8], depth: usize) -> Option<ChildSlot> {
    let sep = data.iter().rposition(|&b| b == 0)?;
    let type_string = std::str::from_utf8(&data[sep + 1..]).ok()?;
    let ty = VariantType::new(type_string).ok()?;
    if !ty.is_definite() {
        return None;
    }
    let info = type_info::intern_definite(&ty);
    if depth + info.depth() >= MAX_DEPTH {
        return None;
    }
    match info.fixed_size() {
        Some(fixed) if fixed != sep => None,
        _ => Some(ChildSlot::present(info, 0..sep)),
    }
}

/// Serialised size of a container of type `info` built from `children`.
pub(crate) fn needed_size<F: Filler>(info: &TypeInfo, children: &[F]) -> usize {
    if let Some(fixed) = info.fixed_size() {
        return fixed;
    }
    match info.layout() {
        Layout::Fixed | Layout::Text => unreachable!("leaf values are stored serialised"),
        Layout::Maybe(element) => match children.first() {
            None => 0,
            Some(child) if element.is_fixed_size() => child.serialised_size(),
            Some(child) => child.serialised_size() + 1,
        },
        Layout::Array(element) => match element.fixed_size() {
            Some(fixed) => fixed * children.len(),
            None => {
                let mask = element.alignment_mask();
                let body = children.iter().fold(0, |offset, child| {
                    align_up(offset, mask).unwrap_or(offset) + child.serialised_size()
                });
                total_size(body, children.len())
            }
        },
        Layout::Tuple(members) => {
            let body = children.iter().fold(0, |offset, child| {
                align_up(offset, child.type_info().alignment_mask()).unwrap_or(offset)
                    + child.serialised_size()
            });
            total_size(body, members.last().map_or(0, |m| m.end_frame()))
        }
        Layout::Variant => children.first().map_or(0, |child| {
            child.serialised_size() + 1 + child.type_info().type_string().len()
        }),
    }
}

/// Writes a container of type `info` built from `children` into `out`, which
/// must be exactly [`needed_size`] bytes long.
pub(crate) fn serialise<F: Filler>(info: &TypeInfo, children: &[F], out: &mut [u8]) {
    match info.layout() {
        Layout::Fixed | Layout::Text => unreachable!("leaf values are stored serialised"),
        Layout::Maybe(element) => {
            if let Some(child) = children.first() {
                let size = child.serialised_size();
                child.write_to(&mut out[..size]);
                if !element.is_fixed_size() {
                    out[size] = 0;
                }
            }
        }
        Layout::Array(element) => match element.fixed_size() {
            Some(fixed) => {
                for (chunk, child) in out.chunks_exact_mut(fixed).zip(children) {
                    child.write_to(chunk);
                }
            }
            None => {
                let width = offset_size(out.len());
                let mask = element.alignment_mask();
                let mut table = out.len() - width * children.len();
                let mut offset = 0;
                for child in children {
                    offset = pad_to(out, offset, mask);
                    let size = child.serialised_size();
                    child.write_to(&mut out[offset..offset + size]);
                    offset += size;
                    write_offset(out, table, offset, width);
                    table += width;
                }
            }
        },
        Layout::Tuple(members) => {
            let width = offset_size(out.len());
            let mut table = out.len();
            let mut offset = 0;
            for (member, child) in members.iter().zip(children) {
                offset = pad_to(out, offset, member.type_info().alignment_mask());
                let size = child.serialised_size();
                child.write_to(&mut out[offset..offset + size]);
                offset += size;
                if member.ending() == MemberEnding::Offset {
                    table -= width;
                    write_offset(out, table, offset, width);
                }
            }
            out[offset..table].fill(0);
        }
        Layout::Variant => {
            if let Some(child) = children.first() {
                let size = child.serialised_size();
                child.write_to(&mut out[..size]);
                out[size] = 0;
                out[size + 1..].copy_from_slice(child.type_info().type_string().as_bytes());
            }
        }
    }
}

fn pad_to(out: &mut [u8], offset: usize, mask: usize) -> usize {
    let aligned = offset + (offset.wrapping_neg() & mask);
    out[offset..aligned].fill(0);
    aligned
}

/// Checks the string rules shared by `s`, `o` and `g`: a single trailing NUL
/// and valid UTF-8 before it. Returns the content without the terminator.
pub(crate) fn string_content(data: &[u8]) -> Option<&str> {
    let (&last, content) = data.split_last()?;
    if last != 0 || content.contains(&0) {
        return None;
    }
    std::str::from_utf8(content).ok()
}

/// Returns `true` if `data` is in normal form for `info`.
///
/// Normal form is the unique encoding the serialiser would produce: every
/// framing offset consistent, all padding zero, booleans 0 or 1, strings
/// terminated by exactly one NUL, and fixed-size values of exactly their size.
pub(crate) fn is_normal(info: &TypeInfo, data: &[u8], depth: usize) -> bool {
    if depth >= MAX_DEPTH {
        return false;
    }
    if let Some(fixed) = info.fixed_size() {
        if data.len() != fixed {
            return false;
        }
    }
    match info.layout() {
        Layout::Fixed => info.type_string() != "b" || data[0] <= 1,
        Layout::Text => match (string_content(data), info.type_string()) {
            (None, _) => false,
            (Some(s), "o") => is_object_path(s),
            (Some(s), "g") => is_signature(s),
            (Some(_), _) => true,
        },
        Layout::Maybe(element) => match (data.len(), element.fixed_size()) {
            (0, _) => true,
            (_, Some(_)) => is_normal(element, data, depth + 1),
            (len, None) => data[len - 1] == 0 && is_normal(element, &data[..len - 1], depth + 1),
        },
        Layout::Array(element) => match element.fixed_size() {
            Some(fixed) => data
                .chunks_exact(fixed)
                .all(|chunk| is_normal(element, chunk, depth + 1)),
            None => variable_array_is_normal(element, data, depth),
        },
        Layout::Tuple(members) => tuple_is_normal(info, members, data, depth),
        Layout::Variant => {
            let slot = variant_child(data, depth);
            match slot.range {
                Some(range) => is_normal(&slot.type_info, &data[range], depth + 1),
                None => false,
            }
        }
    }
}

fn variable_array_is_normal(element: &TypeInfo, data: &[u8], depth: usize) -> bool {
    if data.is_empty() {
        return true;
    }
    let Some(frame) = array_frame(data) else {
        return false;
    };
    if frame.n == 0 || total_size(frame.last_end, frame.n) != data.len() {
        return false;
    }
    let mask = element.alignment_mask();
    let mut offset = 0;
    for i in 0..frame.n {
        let end = read_offset(data, frame.last_end + i * frame.width, frame.width);
        let Some(start) = align_up(offset, mask) else {
            return false;
        };
        if start > end || end > frame.last_end {
            return false;
        }
        if data[offset..start].iter().any(|&b| b != 0) {
            return false;
        }
        if !is_normal(element, &data[start..end], depth + 1) {
            return false;
        }
        offset = end;
    }
    offset == frame.last_end
}

fn tuple_is_normal(
    info: &TypeInfo,
    members: &[type_info::MemberInfo],
    data: &[u8],
    depth: usize,
) -> bool {
    let size = data.len();
    let width = offset_size(size);
    let mut table = size;
    let mut offset = 0;

    for member in members {
        let child = member.type_info();
        let Some(start) = align_up(offset, child.alignment_mask()) else {
            return false;
        };
        if start > table || data[offset..start].iter().any(|&b| b != 0) {
            return false;
        }
        let end = match member.ending() {
            MemberEnding::Fixed => start + child.fixed_size().unwrap_or(0),
            MemberEnding::Last => table,
            MemberEnding::Offset => {
                if table < start + width {
                    return false;
                }
                table -= width;
                read_offset(data, table, width)
            }
        };
        if end < start || end > table {
            return false;
        }
        if !is_normal(child, &data[start..end], depth + 1) {
            return false;
        }
        offset = end;
    }

    if info.is_fixed_size() {
        // Trailing padding up to the fixed size, or the single unit byte.
        return data[offset..].iter().all(|&b| b == 0);
    }
    let n_frames = members.last().map_or(0, |m| m.end_frame());
    offset == table && total_size(offset, n_frames) == size
}

/// Reverses the byte order of every multi-byte number in `data`, in place.
///
/// Framing offsets are always little-endian and are left untouched. Children
/// the framing cannot locate are skipped.
pub(crate) fn byteswap(info: &TypeInfo, data: &mut [u8], depth: usize) {
    if info.alignment() == 1 {
        return;
    }
    if let Layout::Fixed = info.layout() {
        data.reverse();
        return;
    }
    let ranges: Vec<(TypeInfo, Range<usize>)> = (0..n_children(info, data))
        .filter_map(|i| {
            let slot = child_slot(info, data, i, depth);
            slot.range.map(|range| (slot.type_info, range))
        })
        .collect();
    for (child, range) in ranges {
        byteswap(&child, &mut data[range], depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(s: &str) -> TypeInfo {
        type_info::intern(&VariantType::new(s).unwrap()).unwrap()
    }

    #[test]
    fn test_offset_width_boundaries() {
        assert_eq!(offset_size(1), 1);
        assert_eq!(offset_size(0xff), 1);
        assert_eq!(offset_size(0x100), 2);
        assert_eq!(offset_size(0xffff), 2);
        assert_eq!(offset_size(0x1_0000), 4);
        assert_eq!(offset_size(0xffff_ffff), 4);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(offset_size(0x1_0000_0000), 8);
    }

    #[test]
    fn test_total_size() {
        assert_eq!(total_size(10, 0), 10);
        assert_eq!(total_size(250, 5), 255);
        assert_eq!(total_size(251, 5), 261);
        assert_eq!(total_size(65000, 200), 65400);
        assert_eq!(total_size(65500, 100), 65900);
    }

    #[test]
    fn test_string_array_children() {
        // ["ab", "c"]
        let data = [b'a', b'b', 0, b'c', 0, 3, 5];
        let as_ = info("as");
        assert_eq!(n_children(&as_, &data), 2);
        assert_eq!(child_slot(&as_, &data, 0, 0).range, Some(0..3));
        assert_eq!(child_slot(&as_, &data, 1, 0).range, Some(3..5));
        assert!(is_normal(&as_, &data, 0));
    }

    #[test]
    fn test_corrupt_array_offsets() {
        let as_ = info("as");
        // Last offset points past the end.
        assert_eq!(n_children(&as_, &[b'a', 0, 9]), 0);
        // Second element ends before it starts.
        let data = [b'a', 0, b'b', 0, 5, 4];
        assert_eq!(n_children(&as_, &data), 2);
        assert!(child_slot(&as_, &data, 1, 0).range.is_none());
        assert!(!is_normal(&as_, &data, 0));
    }

    #[test]
    fn test_tuple_child_ranges() {
        // ("a", "b", 7u8): offset of first string end stored last.
        let t = info("(ssy)");
        let data = [b'a', 0, b'b', 0, 7, 4, 2];
        assert_eq!(child_slot(&t, &data, 0, 0).range, Some(0..2));
        assert_eq!(child_slot(&t, &data, 1, 0).range, Some(2..4));
        assert_eq!(child_slot(&t, &data, 2, 0).range, Some(4..5));
        assert!(is_normal(&t, &data, 0));
    }

    #[test]
    fn test_truncated_tuple_is_absent() {
        let t = info("(si)");
        let slot = child_slot(&t, &[], 1, 0);
        assert!(slot.range.is_none());
        assert_eq!(slot.fallback_size, 4);
    }

    #[test]
    fn test_variant_child() {
        let v = info("v");
        let data = [5, 0, 0, 0, 0, b'i'];
        let slot = child_slot(&v, &data, 0, 0);
        assert_eq!(slot.type_info.type_string(), "i");
        assert_eq!(slot.range, Some(0..4));
    }

    #[test]
    fn test_malformed_variant_falls_back_to_unit() {
        let v = info("v");
        for data in [&b""[..], &b"abc"[..], &b"\x01\x00*"[..], &b"\x01\x02\x00i"[..]] {
            let slot = child_slot(&v, data, 0, 0);
            assert_eq!(slot.type_info.type_string(), "()");
            assert!(slot.range.is_none());
            assert_eq!(slot.fallback_size, 1);
            assert!(!is_normal(&v, data, 0));
        }
    }

    #[test]
    fn test_boolean_normal_form() {
        let b = info("b");
        assert!(is_normal(&b, &[0], 0));
        assert!(is_normal(&b, &[1], 0));
        assert!(!is_normal(&b, &[2], 0));
        assert!(!is_normal(&b, &[1, 0], 0));
    }

    #[test]
    fn test_string_normal_form() {
        let s = info("s");
        assert!(is_normal(&s, b"hi\0", 0));
        assert!(!is_normal(&s, b"hi", 0));
        assert!(!is_normal(&s, b"h\0i\0", 0));
        assert!(!is_normal(&s, b"\xff\0", 0));
        assert!(!is_normal(&info("o"), b"a/b\0", 0));
        assert!(is_normal(&info("o"), b"/a/b\0", 0));
        assert!(!is_normal(&info("g"), b"{s\0", 0));
    }

    #[test]
    fn test_nonzero_padding_is_not_normal() {
        // (y, i) with garbage in the padding bytes.
        let t = info("(yi)");
        assert!(is_normal(&t, &[1, 0, 0, 0, 2, 0, 0, 0], 0));
        assert!(!is_normal(&t, &[1, 9, 0, 0, 2, 0, 0, 0], 0));
    }

    #[test]
    fn test_byteswap_fixed_tuple() {
        let t = info("(yqu)");
        let mut data = [1, 0, 0x12, 0x34, 0xaa, 0xbb, 0xcc, 0xdd];
        byteswap(&t, &mut data, 0);
        assert_eq!(data, [1, 0, 0x34, 0x12, 0xdd, 0xcc, 0xbb, 0xaa]);
    }
}
