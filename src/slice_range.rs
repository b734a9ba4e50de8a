use std::fmt::{Debug, Display, Formatter};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::errors::SliceError;
use crate::selector::{Selector, StepRange};

/// Specifies a subset of a dimension to include when creating a view.
///
/// Can be constructed from an index or range using `index_or_range.into()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SliceItem {
    /// Extract a specific index from a dimension.
    ///
    /// The number of dimensions in the view will be one minus the number
    /// of dimensions sliced with an index. If the index is negative, it counts
    /// back from the end of the dimension.
    Index(isize),

    /// Include a subset of the range of the dimension.
    Range(SliceRange),
}

impl SliceItem {
    /// Return a SliceItem that extracts the full range of a dimension.
    #[inline]
    pub fn full_range() -> Self {
        (..).into()
    }

    /// Return a SliceItem that extracts part of an axis.
    #[inline]
    pub fn range(start: isize, end: Option<isize>, step: isize) -> SliceItem {
        SliceItem::Range(SliceRange::new(start, end, step))
    }

    /// Return true if this item removes its dimension from a view.
    pub fn is_index(&self) -> bool {
        matches!(self, SliceItem::Index(_))
    }

    /// Resolve this item against a dimension of size `dim_size`, producing
    /// the selector a view stores for the dimension.
    pub fn resolve(&self, dim_size: usize) -> Result<Selector, SliceError> {
        match *self {
            SliceItem::Index(idx) => {
                let size = dim_size as isize;
                let pos_idx = if idx >= 0 { idx } else { idx + size };
                if pos_idx < 0 || pos_idx >= size {
                    return Err(SliceError::InvalidIndex);
                }
                Ok(Selector::Index(pos_idx as usize))
            }
            SliceItem::Range(range) => {
                let step: usize = range
                    .step()
                    .try_into()
                    .map_err(|_| SliceError::InvalidStep)?;
                let resolved = range.resolve(dim_size).ok_or(SliceError::InvalidRange)?;
                let size = if step == 1 {
                    resolved.end - resolved.start
                } else {
                    (resolved.end - resolved.start).div_ceil(step)
                };
                Ok(Selector::Range(StepRange::new(resolved.start, size, step)))
            }
        }
    }
}

impl Display for SliceItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceItem::Index(index) => write!(f, "{}", index),
            SliceItem::Range(range) => write!(f, "{}", range),
        }
    }
}

// This conversion exists to avoid ambiguity when slicing with a numeric
// literal of unspecified type (eg. `tensor.view((0, 0))`). In this case it is
// ambiguous which `SliceItem::from` should be used, but the i32 case is used
// if it exists.
impl From<i32> for SliceItem {
    #[inline]
    fn from(value: i32) -> Self {
        SliceItem::Index(value as isize)
    }
}

impl From<isize> for SliceItem {
    #[inline]
    fn from(value: isize) -> Self {
        SliceItem::Index(value)
    }
}

impl From<usize> for SliceItem {
    #[inline]
    fn from(value: usize) -> Self {
        SliceItem::Index(value as isize)
    }
}

impl<R> From<R> for SliceItem
where
    R: Into<SliceRange>,
{
    fn from(value: R) -> Self {
        SliceItem::Range(value.into())
    }
}

/// Used to convert sequences of indices and/or ranges into a uniform
/// `[SliceItem]` array that can be used to create a view.
///
/// This trait is implemented for:
///
///  - Individual indices and ranges (types satisfying `Into<SliceItem>`)
///  - Arrays of indices or ranges
///  - Tuples of indices and/or ranges
///  - `[SliceItem]` slices
///
/// Ranges can be specified using regular Rust ranges (eg. `start..end`,
/// `start..`, `..end`, `..`) or a [`SliceRange`], which extends regular Rust
/// ranges with support for steps and specifying endpoints using negative
/// values.
pub trait IntoSliceItems {
    type Array: AsRef<[SliceItem]>;

    fn into_slice_items(self) -> Self::Array;
}

impl<'a> IntoSliceItems for &'a [SliceItem] {
    type Array = &'a [SliceItem];

    fn into_slice_items(self) -> &'a [SliceItem] {
        self
    }
}

impl<const N: usize, T: Into<SliceItem>> IntoSliceItems for [T; N] {
    type Array = [SliceItem; N];

    fn into_slice_items(self) -> [SliceItem; N] {
        self.map(|x| x.into())
    }
}

impl<T: Into<SliceItem>> IntoSliceItems for T {
    type Array = [SliceItem; 1];

    fn into_slice_items(self) -> [SliceItem; 1] {
        [self.into()]
    }
}

macro_rules! impl_into_slice_items_for_tuple {
    ($n:literal; $($t:ident $idx:tt),+) => {
        impl<$($t: Into<SliceItem>),+> IntoSliceItems for ($($t,)+) {
            type Array = [SliceItem; $n];

            fn into_slice_items(self) -> [SliceItem; $n] {
                [$(self.$idx.into()),+]
            }
        }
    };
}

impl_into_slice_items_for_tuple!(1; T1 0);
impl_into_slice_items_for_tuple!(2; T1 0, T2 1);
impl_into_slice_items_for_tuple!(3; T1 0, T2 1, T3 2);
impl_into_slice_items_for_tuple!(4; T1 0, T2 1, T3 2, T4 3);
impl_into_slice_items_for_tuple!(5; T1 0, T2 1, T3 2, T4 3, T5 4);

/// A range for slicing a dimension of a base object.
///
/// This has two main differences from [`Range`].
///
/// - A non-zero step between indices can be specified. Views require the
///   step to be positive.
/// - The `start` and `end` indexes can also be negative, in which case they
///   count backwards from the end of the array.
///
/// This system for specifying slicing and indexing follows NumPy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceRange {
    /// First index in range.
    pub start: isize,

    /// Last index (exclusive) in range, or None if the range extends to the
    /// end of a dimension.
    pub end: Option<isize>,

    /// The steps between adjacent elements selected by this range. This
    /// is private so this module can enforce the invariant that it is non-zero.
    step: isize,
}

impl SliceRange {
    /// Create a new range from `start` to `end`. The `start` index is inclusive
    /// and the `end` value is exclusive. If `end` is None, the range spans
    /// to the end of the dimension.
    ///
    /// Panics if the `step` size is 0.
    #[inline]
    pub fn new(start: isize, end: Option<isize>, step: isize) -> SliceRange {
        assert!(step != 0, "Slice step cannot be 0");
        SliceRange { start, end, step }
    }

    pub fn step(&self) -> isize {
        self.step
    }

    /// Resolve the range endpoints to a positive range in `[0, dim_size)`.
    ///
    /// Returns the range if resolved or None if out of bounds or if the step
    /// is negative.
    #[inline]
    pub fn resolve(&self, dim_size: usize) -> Option<Range<usize>> {
        if self.step < 0 {
            return None;
        }
        let start = Self::offset_from_start(self.start, dim_size);
        let end = self
            .end
            .map(|end| Self::offset_from_start(end, dim_size))
            .unwrap_or(dim_size as isize);

        if start >= 0 && start <= dim_size as isize && end >= 0 && end <= dim_size as isize {
            // If `end < start` this means the range is empty. Set `end ==
            // start` to have a canonical representation for this case.
            let end = end.max(start);

            Some(start as usize..end as usize)
        } else {
            None
        }
    }

    /// Resolve an index to an offset from the first index of the dimension.
    #[inline]
    fn offset_from_start(index: isize, dim_size: usize) -> isize {
        if index >= 0 {
            index
        } else {
            dim_size as isize + index
        }
    }
}

impl Display for SliceRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start != 0 {
            write!(f, "{}", self.start)?;
        }
        write!(f, "..")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        if self.step != 1 {
            write!(f, ";{}", self.step)?;
        }
        Ok(())
    }
}

impl<T> From<Range<T>> for SliceRange
where
    T: TryInto<isize>,
    <T as TryInto<isize>>::Error: Debug,
{
    fn from(r: Range<T>) -> SliceRange {
        let start = r.start.try_into().unwrap();
        let end = r.end.try_into().unwrap();
        SliceRange::new(start, Some(end), 1)
    }
}

impl<T> From<RangeTo<T>> for SliceRange
where
    T: TryInto<isize>,
    <T as TryInto<isize>>::Error: Debug,
{
    fn from(r: RangeTo<T>) -> SliceRange {
        let end = r.end.try_into().unwrap();
        SliceRange::new(0, Some(end), 1)
    }
}

impl<T> From<RangeFrom<T>> for SliceRange
where
    T: TryInto<isize>,
    <T as TryInto<isize>>::Error: Debug,
{
    fn from(r: RangeFrom<T>) -> SliceRange {
        let start = r.start.try_into().unwrap();
        SliceRange::new(start, None, 1)
    }
}

impl From<RangeFull> for SliceRange {
    #[inline]
    fn from(_: RangeFull) -> SliceRange {
        SliceRange::new(0, None, 1)
    }
}
