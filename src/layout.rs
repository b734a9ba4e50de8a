use std::iter::zip;

use smallvec::SmallVec;

use crate::broadcast::Shape;

/// Defines the valid indices for an N-dimensional array and how to map them
/// to offsets in a linear buffer, where N can be varied at runtime.
///
/// Layouts created by this module are always contiguous and in row-major
/// order, so every valid index maps to a unique offset.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Array of dimension sizes followed by the corresponding dimension strides.
    ///
    /// Since we always have the same number of stride and shape dims, these
    /// are combined into one array to avoid redundantly storing separate
    /// lengths for each.
    shape_and_strides: SmallVec<[usize; 8]>,
}

impl Layout {
    /// Construct a layout with dimension sizes given by `shape` and default
    /// (contiguous) strides.
    pub fn from_shape(shape: &[usize]) -> Layout {
        Layout {
            shape_and_strides: Self::contiguous_shape_and_strides(shape),
        }
    }

    /// Return the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape_and_strides.len() / 2
    }

    /// Returns the number of elements in the array.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Returns true if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an array of the sizes of each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape_and_strides[0..self.ndim()]
    }

    /// Returns the size of the dimension `dim`.
    pub fn size(&self, dim: usize) -> usize {
        self.shape_and_strides[dim]
    }

    /// Returns an array of the strides of each dimension.
    pub fn strides(&self) -> &[usize] {
        &self.shape_and_strides[self.ndim()..]
    }

    /// Returns the offset between adjacent indices along dimension `dim`.
    pub fn stride(&self, dim: usize) -> usize {
        self.shape_and_strides[self.ndim() + dim]
    }

    /// Return the stride used when stepping along dimension `dim` during a
    /// broadcast traversal.
    ///
    /// Dimensions of size 1 may be stretched to any size, so they use a
    /// stride of zero to keep stepping on the same element.
    #[inline]
    pub fn broadcast_stride(&self, dim: usize) -> usize {
        if self.size(dim) == 1 {
            0
        } else {
            self.stride(dim)
        }
    }

    /// Map an index to a storage offset.
    ///
    /// Panics if any dimension of the index is out of bounds.
    #[inline]
    pub fn offset(&self, index: &[usize]) -> usize {
        self.try_offset(index).unwrap_or_else(|| {
            panic!(
                "index {:?} out of bounds for shape {:?}",
                index,
                self.shape()
            );
        })
    }

    /// Map an index to a storage offset, or return `None` if the index is out
    /// of bounds along any dimension or has the wrong length.
    pub fn try_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = 0;
        for (idx, (size, stride)) in zip(index, zip(self.shape(), self.strides())) {
            if idx >= size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Return the offset used as the end position of traversals: one past
    /// the offset of the last element.
    pub fn end_offset(&self) -> usize {
        self.len()
    }

    fn contiguous_shape_and_strides(shape: &[usize]) -> SmallVec<[usize; 8]> {
        let mut strides_and_shape: SmallVec<[usize; 8]> = SmallVec::from_slice(shape);
        strides_and_shape.resize(shape.len() * 2, 0);
        let mut stride = 1;
        for i in 0..shape.len() {
            strides_and_shape[shape.len() * 2 - 1 - i] = stride;
            stride *= shape[shape.len() - 1 - i];
        }
        strides_and_shape
    }

    /// Return the shape as an owned value.
    pub fn to_shape(&self) -> Shape {
        self.shape().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Layout;

    #[test]
    fn test_from_shape() {
        let layout = Layout::from_shape(&[2, 3, 4]);
        assert_eq!(layout.ndim(), 3);
        assert_eq!(layout.shape(), &[2, 3, 4]);
        assert_eq!(layout.strides(), &[12, 4, 1]);
        assert_eq!(layout.len(), 24);
        assert_eq!(layout.end_offset(), 24);

        let scalar = Layout::from_shape(&[]);
        assert_eq!(scalar.ndim(), 0);
        assert_eq!(scalar.len(), 1);
        assert_eq!(scalar.try_offset(&[]), Some(0));
    }

    #[test]
    fn test_offset() {
        let layout = Layout::from_shape(&[3, 4]);
        assert_eq!(layout.offset(&[0, 0]), 0);
        assert_eq!(layout.offset(&[1, 2]), 6);
        assert_eq!(layout.offset(&[2, 3]), 11);
        assert_eq!(layout.try_offset(&[3, 0]), None);
        assert_eq!(layout.try_offset(&[0, 4]), None);
        assert_eq!(layout.try_offset(&[0]), None);
    }

    #[test]
    #[should_panic(expected = "index [0, 5] out of bounds for shape [3, 4]")]
    fn test_offset_out_of_bounds() {
        Layout::from_shape(&[3, 4]).offset(&[0, 5]);
    }

    #[test]
    fn test_broadcast_stride() {
        let layout = Layout::from_shape(&[3, 1, 4]);
        assert_eq!(layout.strides(), &[4, 4, 1]);
        assert_eq!(layout.broadcast_stride(0), 4);
        assert_eq!(layout.broadcast_stride(1), 0);
        assert_eq!(layout.broadcast_stride(2), 1);
    }

    #[test]
    fn test_empty_layout() {
        let layout = Layout::from_shape(&[2, 0]);
        assert!(layout.is_empty());
        assert_eq!(layout.end_offset(), 0);
    }
}
