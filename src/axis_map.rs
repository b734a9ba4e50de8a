//! Mapping between the axes of a view and the axes of its base.
//!
//! A view is described by a list of selectors, one per leading axis of the
//! base. Index selectors remove their axis from the view, so there are three
//! related coordinate spaces:
//!
//! - View space, with one coordinate per axis of the view.
//! - Selector space, with one slot per selector.
//! - Base space, with one coordinate per axis of the base.
//!
//! Selector slot `i` always corresponds to base axis `i`. Base axes beyond
//! the end of the selector list pass through to the view unmodified.
//! [`AxisMap`] answers the positional queries that translate between these
//! spaces. It depends only on which slots are integral, not on the values of
//! the selectors.

use smallvec::SmallVec;

use crate::selector::{AxisKind, Selector};

/// Table of axis kinds for a selector list, with precomputed lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisMap {
    kinds: SmallVec<[AxisKind; 4]>,

    /// Entry `i` is the number of integral slots before slot `i`. This has
    /// one more entry than `kinds`, whose last entry is the total count.
    integral_before: SmallVec<[usize; 5]>,

    /// Positions of the ranged slots, in order.
    ranged: SmallVec<[usize; 4]>,
}

impl AxisMap {
    /// Build the table for a list of axis kinds.
    pub fn new(kinds: &[AxisKind]) -> AxisMap {
        let mut integral_before = SmallVec::with_capacity(kinds.len() + 1);
        let mut ranged = SmallVec::new();
        let mut count = 0;
        for (pos, kind) in kinds.iter().enumerate() {
            integral_before.push(count);
            match kind {
                AxisKind::Integral => count += 1,
                AxisKind::Ranged => ranged.push(pos),
            }
        }
        integral_before.push(count);

        AxisMap {
            kinds: kinds.iter().copied().collect(),
            integral_before,
            ranged,
        }
    }

    /// Build the table for a list of selectors.
    pub fn from_selectors(selectors: &[Selector]) -> AxisMap {
        let kinds: SmallVec<[AxisKind; 4]> = selectors.iter().map(|s| s.kind()).collect();
        AxisMap::new(&kinds)
    }

    /// Return the number of selector slots.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Return true if there are no selector slots.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Return the kind of each selector slot.
    pub fn kinds(&self) -> &[AxisKind] {
        &self.kinds
    }

    /// Return the total number of integral slots.
    #[inline]
    pub fn integral_count(&self) -> usize {
        self.integral_before[self.kinds.len()]
    }

    /// Return the number of integral slots at positions less than `pos`.
    ///
    /// Positions past the end of the selector list count every slot.
    #[inline]
    pub fn integral_count_before(&self, pos: usize) -> usize {
        self.integral_before[pos.min(self.kinds.len())]
    }

    /// Return the base axis of the `axis`-th non-integral axis.
    ///
    /// If the selector list has fewer than `axis + 1` ranged slots, the axis
    /// is one of the pass-through axes that follow the selector list.
    #[inline]
    pub fn integral_skip(&self, axis: usize) -> usize {
        match self.ranged.get(axis) {
            Some(&pos) => pos,
            None => self.kinds.len() + (axis - self.ranged.len()),
        }
    }

    /// Return the number of view dimensions for a base with `base_ndim`
    /// dimensions.
    #[inline]
    pub fn view_ndim(&self, base_ndim: usize) -> usize {
        base_ndim - self.integral_count()
    }
}

#[cfg(test)]
mod tests {
    use ndview_testing::TestCases;

    use super::AxisMap;
    use crate::selector::AxisKind::{self, Integral, Ranged};

    #[test]
    fn test_empty_map() {
        let map = AxisMap::new(&[]);
        assert!(map.is_empty());
        assert_eq!(map.integral_count(), 0);
        assert_eq!(map.integral_count_before(0), 0);
        assert_eq!(map.integral_count_before(3), 0);

        // Every axis passes through.
        assert_eq!(map.integral_skip(0), 0);
        assert_eq!(map.integral_skip(2), 2);
        assert_eq!(map.view_ndim(3), 3);
    }

    #[test]
    fn test_integral_counts() {
        #[derive(Debug)]
        struct Case {
            kinds: Vec<AxisKind>,
            before: Vec<usize>,
        }

        let cases = [
            Case {
                kinds: vec![Ranged],
                before: vec![0, 0],
            },
            Case {
                kinds: vec![Integral],
                before: vec![0, 1],
            },
            Case {
                kinds: vec![Integral, Ranged, Integral, Integral, Ranged],
                before: vec![0, 1, 1, 2, 3, 3],
            },
            Case {
                kinds: vec![Ranged, Ranged, Integral],
                before: vec![0, 0, 0, 1],
            },
        ];

        cases.test_each(|case| {
            let map = AxisMap::new(&case.kinds);
            let n = case.kinds.len();
            for (pos, expected) in case.before.iter().enumerate() {
                assert_eq!(map.integral_count_before(pos), *expected);
            }
            assert_eq!(map.integral_count_before(0), 0);
            assert_eq!(map.integral_count_before(n), map.integral_count());
            assert_eq!(map.integral_count_before(n + 5), map.integral_count());
            assert_eq!(
                map.integral_count(),
                case.kinds.iter().filter(|k| **k == Integral).count()
            );
        })
    }

    #[test]
    fn test_integral_skip() {
        #[derive(Debug)]
        struct Case {
            kinds: Vec<AxisKind>,
            // Expected result of `integral_skip(i)` for each `i`.
            skips: Vec<usize>,
        }

        let cases = [
            Case {
                kinds: vec![Ranged, Ranged],
                skips: vec![0, 1, 2, 3],
            },
            Case {
                kinds: vec![Integral, Ranged],
                skips: vec![1, 2, 3],
            },
            Case {
                kinds: vec![Integral, Integral],
                skips: vec![2, 3],
            },
            Case {
                kinds: vec![Ranged, Integral, Ranged, Integral],
                skips: vec![0, 2, 4, 5],
            },
            Case {
                kinds: vec![Integral, Ranged, Integral, Ranged],
                skips: vec![1, 3, 4],
            },
        ];

        cases.test_each(|case| {
            let map = AxisMap::new(&case.kinds);
            let skips: Vec<_> = (0..case.skips.len())
                .map(|i| map.integral_skip(i))
                .collect();
            assert_eq!(skips, case.skips);
        })
    }

    #[test]
    fn test_skip_lands_on_ranged_axes() {
        let kinds = [Integral, Ranged, Integral, Ranged, Ranged, Integral];
        let map = AxisMap::new(&kinds);
        for axis in 0..3 {
            let k = map.integral_skip(axis);
            assert_eq!(kinds[k], Ranged);

            // Exactly `axis` ranged slots precede `k`.
            assert_eq!(k - map.integral_count_before(k), axis);
        }
        assert_eq!(map.view_ndim(7), 4);
        assert_eq!(map.integral_skip(3), 6);
    }
}
