//! Resolved per-axis selectors used by views.
//!
//! A [`Selector`] is the resolved form of a [`SliceItem`](crate::SliceItem):
//! all negative indices and open range endpoints have been replaced by
//! absolute positions in the base dimension. Views store a list of these and
//! consult them on every element access and every stepper movement.

/// Interface for selectors which keep their axis in the view.
///
/// A ranged selector yields `size()` elements along its axis. Element `i` of
/// the view axis maps to element `map(i)` of the base axis, and moving one
/// element along the view axis moves `step_size(axis)` elements along the
/// base axis.
pub trait RangedSelector {
    /// Return the number of elements selected along the axis.
    fn size(&self) -> usize;

    /// Return the stride multiplier applied when traversing along `axis`.
    ///
    /// For a one dimensional range this is the same for every axis, and
    /// callers conventionally pass `0`.
    fn step_size(&self, axis: usize) -> usize;

    /// Map an index in the view axis to an index in the base axis.
    fn map(&self, index: usize) -> usize;
}

/// A forward range of indices with a positive step, resolved against the
/// size of a base dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepRange {
    start: usize,
    size: usize,
    step: usize,
}

impl StepRange {
    /// Create a range which selects `size` elements, starting at `start` and
    /// advancing by `step`.
    ///
    /// Panics if `step` is zero.
    #[inline]
    pub fn new(start: usize, size: usize, step: usize) -> StepRange {
        assert!(step != 0, "Range step cannot be 0");
        StepRange { start, size, step }
    }

    /// Return a range which selects every element of an axis of length `len`.
    #[inline]
    pub fn all(len: usize) -> StepRange {
        StepRange::new(0, len, 1)
    }

    /// Return the first selected index of the base axis.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Return the increment between selected indices of the base axis.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Return the selected index which comes after the last selected index.
    ///
    /// This is the exclusive end of the range in the base axis.
    pub fn end(&self) -> usize {
        self.start + self.size * self.step
    }

    /// Return the last base index this range selects, or `None` if it
    /// selects nothing.
    pub(crate) fn last(&self) -> Option<usize> {
        self.size.checked_sub(1).map(|n| self.start + n * self.step)
    }
}

impl RangedSelector for StepRange {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn step_size(&self, _axis: usize) -> usize {
        self.step
    }

    #[inline]
    fn map(&self, index: usize) -> usize {
        self.start + index * self.step
    }
}

/// Whether a selector slot removes its axis from the view or keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// The axis is fixed to a single index and does not appear in the view.
    Integral,

    /// The axis appears in the view, possibly resized and strided.
    Ranged,
}

/// A resolved selector for one axis of a base object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Fix the axis at an index.
    Index(usize),

    /// Keep a strided subset of the axis.
    Range(StepRange),
}

impl Selector {
    /// Return whether this selector squeezes its axis.
    #[inline]
    pub fn kind(&self) -> AxisKind {
        match self {
            Selector::Index(_) => AxisKind::Integral,
            Selector::Range(_) => AxisKind::Ranged,
        }
    }

    /// Return true if this is a [`Selector::Index`].
    pub fn is_index(&self) -> bool {
        matches!(self, Selector::Index(_))
    }

    /// Return the ranged selector, or `None` if this is an index.
    #[inline]
    pub fn as_range(&self) -> Option<&StepRange> {
        match self {
            Selector::Range(range) => Some(range),
            Selector::Index(_) => None,
        }
    }

    /// Return true if every base index this selector refers to is less than
    /// `dim_size`.
    pub(crate) fn fits(&self, dim_size: usize) -> bool {
        match self {
            Selector::Index(idx) => *idx < dim_size,
            Selector::Range(range) => range.last().map(|l| l < dim_size).unwrap_or(true),
        }
    }
}

impl From<usize> for Selector {
    fn from(index: usize) -> Selector {
        Selector::Index(index)
    }
}

impl From<StepRange> for Selector {
    fn from(range: StepRange) -> Selector {
        Selector::Range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisKind, RangedSelector, Selector, StepRange};

    #[test]
    fn test_step_range() {
        let r = StepRange::new(1, 3, 2);
        assert_eq!(r.size(), 3);
        assert_eq!(r.step_size(0), 2);
        assert_eq!(r.step_size(1), 2);
        assert_eq!((0..r.size()).map(|i| r.map(i)).collect::<Vec<_>>(), [1, 3, 5]);
        assert_eq!(r.end(), 7);
        assert_eq!(r.last(), Some(5));

        let all = StepRange::all(4);
        assert_eq!((0..all.size()).map(|i| all.map(i)).collect::<Vec<_>>(), [0, 1, 2, 3]);

        let empty = StepRange::new(2, 0, 1);
        assert_eq!(empty.last(), None);
    }

    #[test]
    #[should_panic(expected = "Range step cannot be 0")]
    fn test_step_range_zero_step() {
        StepRange::new(0, 1, 0);
    }

    #[test]
    fn test_selector_kind() {
        assert_eq!(Selector::from(3).kind(), AxisKind::Integral);
        assert!(Selector::Index(0).is_index());
        let sel = Selector::from(StepRange::all(2));
        assert_eq!(sel.kind(), AxisKind::Ranged);
        assert_eq!(sel.as_range(), Some(&StepRange::all(2)));
        assert_eq!(Selector::Index(1).as_range(), None);
    }

    #[test]
    fn test_selector_fits() {
        assert!(Selector::Index(2).fits(3));
        assert!(!Selector::Index(3).fits(3));
        assert!(Selector::Range(StepRange::new(1, 2, 2)).fits(4));
        assert!(!Selector::Range(StepRange::new(1, 2, 3)).fits(4));
        assert!(Selector::Range(StepRange::new(10, 0, 1)).fits(4));
    }
}
