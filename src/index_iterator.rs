use std::iter::FusedIterator;

use smallvec::{smallvec, SmallVec};

/// The index type used for dynamic-rank expressions.
pub type DynIndex = SmallVec<[usize; 5]>;

/// Iterator over all the N-dimensional indices of a shape, in row-major
/// order.
///
/// The number of dimensions may be zero, in which case the iterator will yield
/// a single empty index. This is consistent with eg. `ndindex` in NumPy.
#[derive(Clone, Debug)]
pub struct Indices {
    shape: DynIndex,

    next: Option<DynIndex>,

    /// Remaining iteration steps.
    steps: usize,
}

impl Indices {
    /// Return an iterator over all the indices where each dimension is between
    /// `0` and `shape[dim]`.
    pub fn from_shape(shape: &[usize]) -> Indices {
        let steps = shape.iter().product();
        Indices {
            shape: shape.iter().copied().collect(),
            next: (steps > 0).then(|| smallvec![0; shape.len()]),
            steps,
        }
    }
}

impl Iterator for Indices {
    type Item = DynIndex;

    /// Return the next index in the sequence, or `None` after all indices
    /// have been returned.
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.steps -= 1;

        let mut next = current.clone();
        let mut has_next = false;
        for (&dim_end, index) in self.shape.iter().zip(next.iter_mut()).rev() {
            *index += 1;
            if *index == dim_end {
                *index = 0;
            } else {
                has_next = true;
                break;
            }
        }
        self.next = has_next.then_some(next);

        Some(current)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.steps, Some(self.steps))
    }
}

impl ExactSizeIterator for Indices {}

impl FusedIterator for Indices {}

#[cfg(test)]
mod tests {
    use super::Indices;

    #[test]
    fn test_indices() {
        let indices: Vec<Vec<usize>> = Indices::from_shape(&[2, 3])
            .map(|ix| ix.to_vec())
            .collect();
        assert_eq!(
            indices,
            [[0, 0], [0, 1], [0, 2], [1, 0], [1, 1], [1, 2]]
                .map(|ix| ix.to_vec())
                .to_vec()
        );
    }

    #[test]
    fn test_indices_scalar_and_empty() {
        let mut scalar = Indices::from_shape(&[]);
        assert_eq!(scalar.len(), 1);
        assert_eq!(scalar.next().map(|ix| ix.len()), Some(0));
        assert!(scalar.next().is_none());

        let mut empty = Indices::from_shape(&[3, 0]);
        assert_eq!(empty.len(), 0);
        assert!(empty.next().is_none());
    }
}
