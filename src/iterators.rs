//! Iterators which drive a [`Stepper`] over an iteration shape.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use smallvec::{smallvec, SmallVec};

use crate::broadcast::Shape;
use crate::expr::Stepper;

/// Iterator over the elements of an expression, in row-major order of an
/// iteration shape.
///
/// The iteration shape is either the expression's own shape or a shape it
/// is broadcast to. The iterator keeps track of the current index and tells
/// the stepper how to move after each element: the innermost axis is stepped
/// and, when an axis has been fully traversed, it is reset and the next outer
/// axis is stepped.
#[derive(Clone)]
pub struct Iter<S: Stepper> {
    stepper: S,
    shape: Shape,

    /// Index of the element the stepper is positioned at.
    index: SmallVec<[usize; 4]>,

    /// Remaining elements to yield.
    remaining: usize,
}

impl<S: Stepper> Iter<S> {
    /// Create an iterator that yields every element of `shape`, starting
    /// from the position of `stepper`.
    pub fn new(stepper: S, shape: &[usize]) -> Iter<S> {
        Iter {
            stepper,
            shape: shape.iter().copied().collect(),
            index: smallvec![0; shape.len()],
            remaining: shape.iter().product(),
        }
    }

    /// Return the iteration shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the underlying stepper.
    ///
    /// Once the iterator is exhausted the stepper is at the end position.
    pub fn into_stepper(self) -> S {
        self.stepper
    }

    fn increment(&mut self) {
        for axis in (0..self.shape.len()).rev() {
            self.index[axis] += 1;
            self.stepper.step(axis, 1);
            if self.index[axis] < self.shape[axis] {
                return;
            }
            self.index[axis] = 0;
            self.stepper.reset(axis);
        }
    }
}

impl<S: Stepper> Iterator for Iter<S> {
    type Item = S::Item;

    #[inline]
    fn next(&mut self) -> Option<S::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.stepper.current();
        self.remaining -= 1;
        if self.remaining == 0 {
            self.stepper.to_end();
        } else {
            self.increment();
        }
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<S: Stepper> ExactSizeIterator for Iter<S> {}

impl<S: Stepper> FusedIterator for Iter<S> {}

/// Iterator over mutable references to the elements of an expression.
///
/// This wraps an [`Iter`] over a stepper that yields element pointers.
pub struct IterMut<'a, T, S: Stepper<Item = *mut T>> {
    inner: Iter<S>,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, S: Stepper<Item = *mut T>> IterMut<'a, T, S> {
    /// Create an iterator that yields every element of `shape`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that traversing `shape` with `stepper` visits
    /// each element at most once, that the pointers are valid for `'a` and
    /// that no other references to the elements exist for `'a`.
    pub(crate) unsafe fn new(stepper: S, shape: &[usize]) -> IterMut<'a, T, S> {
        IterMut {
            inner: Iter::new(stepper, shape),
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, S: Stepper<Item = *mut T>> Iterator for IterMut<'a, T, S> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        // Safety: Each element is visited once, as guaranteed by the
        // constructor's caller.
        self.inner.next().map(|ptr| unsafe { &mut *ptr })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: 'a, S: Stepper<Item = *mut T>> ExactSizeIterator for IterMut<'a, T, S> {}

impl<'a, T: 'a, S: Stepper<Item = *mut T>> FusedIterator for IterMut<'a, T, S> {}

#[cfg(test)]
mod tests {
    use super::Iter;
    use crate::expr::Stepper;

    /// Stepper that records its movements and yields its linear position in
    /// a row-major buffer with the given strides.
    #[derive(Clone, Debug, PartialEq)]
    struct RecordingStepper {
        strides: Vec<usize>,
        pos: usize,
        log: Vec<String>,
    }

    impl Stepper for RecordingStepper {
        type Item = usize;

        fn current(&self) -> usize {
            self.pos
        }

        fn step(&mut self, axis: usize, n: usize) {
            self.pos += self.strides[axis] * n;
        }

        fn step_back(&mut self, axis: usize, n: usize) {
            self.pos -= self.strides[axis] * n;
        }

        fn reset(&mut self, axis: usize) {
            self.log.push(format!("reset {}", axis));
            // Sizes are implied by the test shape [2, 3].
            let size = [2, 3][axis];
            self.pos -= self.strides[axis] * size;
        }

        fn to_end(&mut self) {
            self.log.push("end".into());
            self.pos = usize::MAX;
        }
    }

    #[test]
    fn test_iter_odometer() {
        let stepper = RecordingStepper {
            strides: vec![3, 1],
            pos: 0,
            log: Vec::new(),
        };
        let mut iter = Iter::new(stepper, &[2, 3]);
        assert_eq!(iter.len(), 6);

        let positions: Vec<_> = iter.by_ref().collect();
        assert_eq!(positions, [0, 1, 2, 3, 4, 5]);
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);

        let stepper = iter.into_stepper();
        assert_eq!(stepper.log, ["reset 1", "end"]);
        assert_eq!(stepper.pos, usize::MAX);
    }

    #[test]
    fn test_iter_empty_and_scalar() {
        let stepper = RecordingStepper {
            strides: vec![1],
            pos: 7,
            log: Vec::new(),
        };
        let mut empty = Iter::new(stepper.clone(), &[0]);
        assert_eq!(empty.next(), None);
        assert!(empty.into_stepper().log.is_empty());

        let mut scalar = Iter::new(stepper, &[]);
        assert_eq!(scalar.next(), Some(7));
        assert_eq!(scalar.next(), None);
    }
}
