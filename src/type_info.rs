//! Process-wide cache of serialisation layout metadata.
//!
//! A [`TypeInfo`] describes how values of one definite type are laid out on the
//! wire: alignment, fixed size (if any), element type for arrays and maybes,
//! and per-member offset rules for tuples and dictionary entries.
//!
//! ## Lifecycle
//!
//! The [`TypeInfoCache`] is a lazily-initialised global registry. Entries are
//! created on first use of a type string, shared by every handle for that
//! type, and evicted when the last handle is dropped. Equal type strings always
//! resolve to the same entry while it is alive.
//!
//! ```text
//! TypeInfoCache (static global)
//! +-- entries: Mutex<HashMap<type string, Arc<TypeInfoData>>>
//!
//! TypeInfo (handle)   -- Arc<TypeInfoData>; dropping the last one evicts
//! ```
//!
//! ## Member offsets
//!
//! The start of a tuple member is computed from the framing offset of the
//! nearest preceding variable-sized member (or the container start) as
//! `((base + a + b) & !b) | c`, where `b` is an alignment mask. The
//! constants are precomputed once per tuple type so child lookups are O(1).

use crate::{Error, Result, VariantType};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// How the end of a tuple member is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberEnding {
    /// The member has a fixed size.
    Fixed,
    /// The member is the last one; it ends where the framing offsets begin.
    Last,
    /// The member's end is stored in a framing offset.
    Offset,
}

/// Layout of one member of a tuple or dictionary entry.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    type_info: TypeInfo,
    frame: Option<usize>,
    a: usize,
    b: usize,
    c: usize,
    ending: MemberEnding,
}

impl MemberInfo {
    #[inline]
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    #[inline]
    pub fn ending(&self) -> MemberEnding {
        self.ending
    }

    /// Index of the framing offset this member's start is relative to, or
    /// `None` when it is relative to the start of the container.
    #[inline]
    pub fn frame(&self) -> Option<usize> {
        self.frame
    }

    /// Index of the framing offset holding this member's end.
    #[inline]
    pub(crate) fn end_frame(&self) -> usize {
        self.frame.map_or(0, |i| i + 1)
    }

    /// Start of the member given the value of its base framing offset.
    ///
    /// Returns `None` on arithmetic overflow (only possible for corrupt offsets).
    #[inline]
    pub fn start(&self, base: usize) -> Option<usize> {
        let raw = base.checked_add(self.a)?.checked_add(self.b)?;
        Some((raw & !self.b) | self.c)
    }
}

/// Container-specific layout.
#[derive(Debug)]
pub(crate) enum Layout {
    /// Fixed-size numbers and booleans.
    Fixed,
    /// `s`, `o` and `g`.
    Text,
    Variant,
    Maybe(TypeInfo),
    Array(TypeInfo),
    Tuple(Vec<MemberInfo>),
}

#[derive(Debug)]
pub(crate) struct TypeInfoData {
    ty: VariantType,
    alignment: usize,
    fixed_size: Option<usize>,
    depth: usize,
    layout: Layout,
    /// Live handles. Only decremented with the cache lock held.
    uses: AtomicUsize,
}

impl TypeInfoData {
    /// Computes the layout of a definite type.
    fn compute(cache: &TypeInfoCache, ty: &VariantType) -> Self {
        let code = ty.as_str().as_bytes()[0];
        let (alignment, fixed_size, depth, layout) = match code {
            b'b' | b'y' => (1, Some(1), 1, Layout::Fixed),
            b'n' | b'q' => (2, Some(2), 1, Layout::Fixed),
            b'i' | b'u' | b'h' => (4, Some(4), 1, Layout::Fixed),
            b'x' | b't' | b'd' => (8, Some(8), 1, Layout::Fixed),
            b's' | b'o' | b'g' => (1, None, 1, Layout::Text),
            b'v' => (8, None, 1, Layout::Variant),
            b'a' | b'm' => {
                let element = cache.intern_definite(&VariantType::from_validated(&ty.as_str()[1..]));
                let (alignment, depth) = (element.alignment(), element.depth() + 1);
                let layout = if code == b'a' {
                    Layout::Array(element)
                } else {
                    Layout::Maybe(element)
                };
                (alignment, None, depth, layout)
            }
            b'(' | b'{' => {
                let items: Vec<TypeInfo> = ty
                    .items()
                    .iter()
                    .map(|item| cache.intern_definite(item))
                    .collect();
                let depth = items.iter().map(TypeInfo::depth).max().unwrap_or(0) + 1;
                let members = member_table(items);
                let (alignment, fixed_size) = tuple_base_info(&members);
                (alignment, fixed_size, depth, Layout::Tuple(members))
            }
            _ => unreachable!("indefinite type '{}' reached the type cache", ty),
        };

        TypeInfoData {
            ty: ty.clone(),
            alignment,
            fixed_size,
            depth,
            layout,
            uses: AtomicUsize::new(0),
        }
    }
}

#[inline]
fn align_mask(offset: usize, mask: usize) -> usize {
    offset + (offset.wrapping_neg() & mask)
}

/// Builds the member offset table for a tuple or dictionary entry.
fn member_table(items: Vec<TypeInfo>) -> Vec<MemberInfo> {
    let n = items.len();
    let mut members = Vec::with_capacity(n);
    let mut frame: Option<usize> = None;
    let (mut a, mut b, mut c) = (0usize, 0usize, 0usize);

    for (index, item) in items.into_iter().enumerate() {
        let d = item.alignment() - 1;
        let fixed = item.fixed_size();

        if d <= b {
            c = align_mask(c, d);
        } else {
            a += align_mask(c, b);
            b = d;
            c = 0;
        }

        // Fold the aligned part of `c` into `a`; `c` keeps only the remainder.
        let ending = match fixed {
            Some(_) => MemberEnding::Fixed,
            None if index + 1 == n => MemberEnding::Last,
            None => MemberEnding::Offset,
        };
        members.push(MemberInfo {
            type_info: item,
            frame,
            a: a + (!b & c),
            b,
            c: c & b,
            ending,
        });

        match fixed {
            Some(size) => c += size,
            None => {
                frame = Some(frame.map_or(0, |i| i + 1));
                a = 0;
                b = 0;
                c = 0;
            }
        }
    }
    members
}

fn tuple_base_info(members: &[MemberInfo]) -> (usize, Option<usize>) {
    let Some(last) = members.last() else {
        // The unit tuple occupies a single zero byte.
        return (1, Some(1));
    };
    let alignment = members
        .iter()
        .map(|m| m.type_info.alignment())
        .max()
        .unwrap_or(1);
    let fixed_size = match (last.frame, last.type_info.fixed_size()) {
        (None, Some(size)) => {
            let start = last.start(0).unwrap_or(0);
            Some(align_mask(start + size, alignment - 1))
        }
        _ => None,
    };
    (alignment, fixed_size)
}

/// Shared handle to the layout metadata of one definite type.
///
/// Cloning a handle shares the cache entry; dropping the last handle evicts it.
pub struct TypeInfo(Arc<TypeInfoData>);

impl TypeInfo {
    /// Creates a handle for a cached entry. Must be called with the cache
    /// lock held so eviction cannot interleave.
    fn acquire(data: &Arc<TypeInfoData>) -> Self {
        data.uses.fetch_add(1, Ordering::Relaxed);
        TypeInfo(Arc::clone(data))
    }

    /// The type this entry describes.
    #[inline]
    pub fn variant_type(&self) -> &VariantType {
        &self.0.ty
    }

    #[inline]
    pub fn type_string(&self) -> &str {
        self.0.ty.as_str()
    }

    /// Alignment in bytes: 1, 2, 4 or 8.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.0.alignment
    }

    #[inline]
    pub(crate) fn alignment_mask(&self) -> usize {
        self.0.alignment - 1
    }

    /// The serialised size shared by every value of this type, if there is one.
    #[inline]
    pub fn fixed_size(&self) -> Option<usize> {
        self.0.fixed_size
    }

    #[inline]
    pub fn is_fixed_size(&self) -> bool {
        self.0.fixed_size.is_some()
    }

    /// Depth of the type tree.
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Element layout of an array or maybe type.
    pub fn element(&self) -> Option<&TypeInfo> {
        match &self.0.layout {
            Layout::Array(element) | Layout::Maybe(element) => Some(element),
            _ => None,
        }
    }

    /// Member layouts of a tuple or dictionary entry type; empty otherwise.
    pub fn members(&self) -> &[MemberInfo] {
        match &self.0.layout {
            Layout::Tuple(members) => members,
            _ => &[],
        }
    }

    /// Number of items for tuples and dictionary entries.
    pub fn n_members(&self) -> usize {
        self.members().len()
    }

    #[inline]
    pub(crate) fn layout(&self) -> &Layout {
        &self.0.layout
    }

    /// Returns `true` if both handles refer to the same cache entry.
    pub fn ptr_eq(&self, other: &TypeInfo) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for TypeInfo {
    fn clone(&self) -> Self {
        // A live handle keeps the count above zero, so no lock is needed.
        self.0.uses.fetch_add(1, Ordering::Relaxed);
        TypeInfo(Arc::clone(&self.0))
    }
}

impl Drop for TypeInfo {
    fn drop(&mut self) {
        let cache = TypeInfoCache::global();
        let evicted = {
            let mut entries = cache.entries.lock();
            let is_last = self.0.uses.fetch_sub(1, Ordering::AcqRel) == 1
                && entries
                    .get(self.0.ty.as_str())
                    .is_some_and(|entry| Arc::ptr_eq(entry, &self.0));
            if is_last {
                entries.remove(self.0.ty.as_str())
            } else {
                None
            }
        };
        if evicted.is_some() {
            log::debug!("[type_info] evicted '{}'", self.0.ty);
        }
        // Dropped outside the lock: members release their own handles.
        drop(evicted);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type", &self.type_string())
            .field("alignment", &self.alignment())
            .field("fixed_size", &self.fixed_size())
            .finish()
    }
}

/// The process-wide registry of [`TypeInfo`] entries.
pub struct TypeInfoCache {
    entries: Mutex<HashMap<String, Arc<TypeInfoData>>>,
}

impl TypeInfoCache {
    /// The global cache, initialised on first use and never torn down.
    pub fn global() -> &'static TypeInfoCache {
        static CACHE: OnceLock<TypeInfoCache> = OnceLock::new();
        CACHE.get_or_init(|| TypeInfoCache {
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the shared entry for `ty`, computing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousType`] if `ty` is not definite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gvariant::{TypeInfoCache, VariantType};
    ///
    /// let cache = TypeInfoCache::global();
    /// let info = cache.intern(&VariantType::new("(yqu)").unwrap()).unwrap();
    /// assert_eq!(info.alignment(), 4);
    /// assert_eq!(info.fixed_size(), Some(8));
    ///
    /// let again = cache.intern(&VariantType::new("(yqu)").unwrap()).unwrap();
    /// assert!(info.ptr_eq(&again));
    /// ```
    pub fn intern(&self, ty: &VariantType) -> Result<TypeInfo> {
        if !ty.is_definite() {
            return Err(Error::ambiguous(&format!("type '{}' is not definite", ty)));
        }
        Ok(self.intern_definite(ty))
    }

    /// Interns a type already known to be definite.
    pub(crate) fn intern_definite(&self, ty: &VariantType) -> TypeInfo {
        let existing = self.entries.lock().get(ty.as_str()).map(TypeInfo::acquire);
        if let Some(info) = existing {
            return info;
        }

        // Computed without the lock held: member types intern recursively.
        let data = Arc::new(TypeInfoData::compute(self, ty));

        let (info, spare) = {
            let mut entries = self.entries.lock();
            match entries.get(ty.as_str()) {
                Some(entry) => (TypeInfo::acquire(entry), Some(data)),
                None => {
                    let info = TypeInfo::acquire(&data);
                    entries.insert(ty.as_str().to_string(), data);
                    (info, None)
                }
            }
        };
        if spare.is_none() {
            log::debug!(
                "[type_info] interned '{}' (alignment {}, fixed size {:?})",
                ty,
                info.alignment(),
                info.fixed_size()
            );
        }
        drop(spare);
        info
    }

    /// Releases a handle; the entry is evicted once no handle remains.
    pub fn release(&self, info: TypeInfo) {
        drop(info);
    }

    /// Returns `true` if an entry for `type_string` is currently cached.
    pub fn contains(&self, type_string: &str) -> bool {
        self.entries.lock().contains_key(type_string)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shorthand for interning through the global cache.
pub(crate) fn intern(ty: &VariantType) -> Result<TypeInfo> {
    TypeInfoCache::global().intern(ty)
}

/// Interns a type already known to be definite through the global cache.
pub(crate) fn intern_definite(ty: &VariantType) -> TypeInfo {
    TypeInfoCache::global().intern_definite(ty)
}
