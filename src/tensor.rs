use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::errors::{FromDataError, SliceError};
use crate::expr::{Expression, ExpressionMut, Stepper};
use crate::index_iterator::Indices;
use crate::iterators::{Iter, IterMut};
use crate::layout::Layout;
use crate::slice_range::IntoSliceItems;
use crate::view::{View, ViewMut};

/// An owned N-dimensional array with elements stored contiguously in
/// row-major order.
///
/// Tensors are the usual base objects for [`View`]s. The rank is dynamic.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    layout: Layout,
}

impl<T> Tensor<T> {
    /// Create a tensor from a shape and its elements in row-major order.
    ///
    /// Returns an error if the length of `data` is not the product of
    /// `shape`.
    pub fn from_data(shape: &[usize], data: Vec<T>) -> Result<Tensor<T>, FromDataError> {
        let layout = Layout::from_shape(shape);
        if layout.len() != data.len() {
            return Err(FromDataError::StorageLengthMismatch);
        }
        Ok(Tensor { data, layout })
    }

    /// Create a 1D tensor from a vector.
    pub fn from_vec(data: Vec<T>) -> Tensor<T> {
        let layout = Layout::from_shape(&[data.len()]);
        Tensor { data, layout }
    }

    /// Create a tensor of a given shape, with each element initialized by
    /// calling `f` with its index.
    pub fn from_fn<F: FnMut(&[usize]) -> T>(shape: &[usize], mut f: F) -> Tensor<T> {
        let data = Indices::from_shape(shape).map(|index| f(&index)).collect();
        Tensor {
            data,
            layout: Layout::from_shape(shape),
        }
    }

    /// Create a tensor with all elements set to `value`.
    pub fn full(shape: &[usize], value: T) -> Tensor<T>
    where
        T: Clone,
    {
        let layout = Layout::from_shape(shape);
        Tensor {
            data: vec![value; layout.len()],
            layout,
        }
    }

    /// Create a tensor with all elements set to their default value.
    pub fn zeros(shape: &[usize]) -> Tensor<T>
    where
        T: Clone + Default,
    {
        Self::full(shape, T::default())
    }

    /// Return the layout which maps indices to offsets in the data.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Return the elements in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Return the elements in row-major order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor and return its elements in row-major order.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Return the element at `index`, or `None` if the index is invalid.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.layout.try_offset(index).map(|offset| &self.data[offset])
    }

    /// Return the element at `index`, or `None` if the index is invalid.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.layout
            .try_offset(index)
            .map(move |offset| &mut self.data[offset])
    }

    /// Return an iterator over elements of this tensor in row-major order.
    pub fn iter(&self) -> Iter<TensorStepper<'_, T>> {
        Iter::new(self.stepper_begin(self.shape()), self.shape())
    }

    /// Return an iterator over mutable references to elements of this tensor
    /// in row-major order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, TensorStepperMut<'_, T>> {
        let shape = self.layout.to_shape();
        let stepper = self.stepper_begin_mut(&shape);
        // Safety: The layout is contiguous and the traversal shape is the
        // tensor's own shape, so each element is visited once.
        unsafe { IterMut::new(stepper, &shape) }
    }

    /// Create a view of part of this tensor.
    ///
    /// `items` has one entry per leading dimension. Indices remove their
    /// dimension from the view, ranges keep it. Dimensions without an entry
    /// are included in full.
    ///
    /// Panics if the items are invalid for this tensor's shape.
    pub fn view<R: IntoSliceItems>(&self, items: R) -> View<'_, Tensor<T>> {
        View::new(self, items)
    }

    /// Variant of [`view`](Tensor::view) which returns an error instead of
    /// panicking.
    pub fn try_view<R: IntoSliceItems>(&self, items: R) -> Result<View<'_, Tensor<T>>, SliceError> {
        View::try_new(self, items)
    }

    /// Create a mutable view of part of this tensor.
    ///
    /// See [`view`](Tensor::view).
    pub fn view_mut<R: IntoSliceItems>(&mut self, items: R) -> ViewMut<'_, Tensor<T>> {
        ViewMut::new(self, items)
    }

    /// Variant of [`view_mut`](Tensor::view_mut) which returns an error
    /// instead of panicking.
    pub fn try_view_mut<R: IntoSliceItems>(
        &mut self,
        items: R,
    ) -> Result<ViewMut<'_, Tensor<T>>, SliceError> {
        ViewMut::try_new(self, items)
    }

    /// Return a copy of the elements in row-major order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.clone()
    }
}

impl<T> Expression for Tensor<T> {
    type Elem = T;
    type Stepper<'a>
        = TensorStepper<'a, T>
    where
        Self: 'a;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> &T {
        &self.data[self.layout.offset(index)]
    }

    fn stepper_begin(&self, shape: &[usize]) -> TensorStepper<'_, T> {
        TensorStepper::new(&self.data, &self.layout, broadcast_offset(shape, self.ndim()), 0)
    }

    fn stepper_end(&self, shape: &[usize]) -> TensorStepper<'_, T> {
        let pos = self.layout.end_offset();
        TensorStepper::new(&self.data, &self.layout, broadcast_offset(shape, self.ndim()), pos)
    }

    fn is_trivial_broadcast(&self, strides: &[usize]) -> bool {
        strides == self.layout.strides()
    }
}

unsafe impl<T> ExpressionMut for Tensor<T> {
    type StepperMut<'a>
        = TensorStepperMut<'a, T>
    where
        Self: 'a;

    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut T {
        let offset = self.layout.offset(index);
        &mut self.data[offset]
    }

    fn stepper_begin_mut(&mut self, shape: &[usize]) -> TensorStepperMut<'_, T> {
        let offset = broadcast_offset(shape, self.layout.ndim());
        TensorStepperMut::new(&mut self.data, &self.layout, offset, 0)
    }

    fn stepper_end_mut(&mut self, shape: &[usize]) -> TensorStepperMut<'_, T> {
        let offset = broadcast_offset(shape, self.layout.ndim());
        let pos = self.layout.end_offset();
        TensorStepperMut::new(&mut self.data, &self.layout, offset, pos)
    }
}

impl<T, const N: usize> Index<[usize; N]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        self.at(&index)
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Tensor<T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        self.at_mut(&index)
    }
}

impl<T> From<Vec<T>> for Tensor<T> {
    fn from(data: Vec<T>) -> Tensor<T> {
        Tensor::from_vec(data)
    }
}

/// Return the number of leading broadcast-only dimensions when traversing
/// an expression with `ndim` dimensions using an iteration shape.
#[inline]
pub(crate) fn broadcast_offset(shape: &[usize], ndim: usize) -> usize {
    debug_assert!(
        shape.len() >= ndim,
        "iteration shape {:?} has fewer dims than expression ({})",
        shape,
        ndim
    );
    shape.len().saturating_sub(ndim)
}

/// Stepper over the elements of a [`Tensor`].
///
/// The position is an offset into the tensor's data. Moving along a
/// dimension changes the offset by a multiple of the dimension's stride.
pub struct TensorStepper<'a, T> {
    data: &'a [T],
    layout: &'a Layout,

    /// Number of leading broadcast-only dimensions.
    offset: usize,

    /// Offset of the current element in `data`.
    pos: usize,
}

impl<'a, T> TensorStepper<'a, T> {
    fn new(data: &'a [T], layout: &'a Layout, offset: usize, pos: usize) -> Self {
        TensorStepper {
            data,
            layout,
            offset,
            pos,
        }
    }

    /// Return the offset of the current position in the tensor's data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the number of leading dimensions which are ignored when
    /// stepping.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for TensorStepper<'_, T> {
    fn clone(&self) -> Self {
        TensorStepper { ..*self }
    }
}

impl<T> std::fmt::Debug for TensorStepper<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStepper")
            .field("offset", &self.offset)
            .field("pos", &self.pos)
            .finish()
    }
}

impl<T> PartialEq for TensorStepper<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr())
            && std::ptr::eq(self.layout, other.layout)
            && self.pos == other.pos
            && self.offset == other.offset
    }
}

impl<'a, T> Stepper for TensorStepper<'a, T> {
    type Item = &'a T;

    #[inline]
    fn current(&self) -> &'a T {
        &self.data[self.pos]
    }

    #[inline]
    fn step(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            self.pos += self.layout.broadcast_stride(axis - self.offset) * n;
        }
    }

    #[inline]
    fn step_back(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            self.pos -= self.layout.broadcast_stride(axis - self.offset) * n;
        }
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        if axis >= self.offset {
            let dim = axis - self.offset;
            self.pos -= self.layout.broadcast_stride(dim) * self.layout.size(dim);
        }
    }

    fn to_end(&mut self) {
        self.pos = self.layout.end_offset();
    }
}

/// Stepper over pointers to the elements of a mutably borrowed [`Tensor`].
///
/// This moves in the same way as [`TensorStepper`].
pub struct TensorStepperMut<'a, T> {
    ptr: *mut T,
    len: usize,
    layout: &'a Layout,
    offset: usize,
    pos: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> TensorStepperMut<'a, T> {
    fn new(data: &'a mut [T], layout: &'a Layout, offset: usize, pos: usize) -> Self {
        TensorStepperMut {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            layout,
            offset,
            pos,
            _marker: PhantomData,
        }
    }

    /// Return the offset of the current position in the tensor's data.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<T> PartialEq for TensorStepperMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
            && std::ptr::eq(self.layout, other.layout)
            && self.pos == other.pos
            && self.offset == other.offset
    }
}

impl<T> std::fmt::Debug for TensorStepperMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStepperMut")
            .field("offset", &self.offset)
            .field("pos", &self.pos)
            .finish()
    }
}

impl<T> Stepper for TensorStepperMut<'_, T> {
    type Item = *mut T;

    #[inline]
    fn current(&self) -> *mut T {
        assert!(self.pos < self.len, "stepper is not positioned on an element");
        // Safety: `pos` is in bounds of the borrowed data.
        unsafe { self.ptr.add(self.pos) }
    }

    #[inline]
    fn step(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            self.pos += self.layout.broadcast_stride(axis - self.offset) * n;
        }
    }

    #[inline]
    fn step_back(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            self.pos -= self.layout.broadcast_stride(axis - self.offset) * n;
        }
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        if axis >= self.offset {
            let dim = axis - self.offset;
            self.pos -= self.layout.broadcast_stride(dim) * self.layout.size(dim);
        }
    }

    fn to_end(&mut self) {
        self.pos = self.layout.end_offset();
    }
}

#[cfg(test)]
mod tests {
    use super::Tensor;
    use crate::errors::FromDataError;
    use crate::expr::{Expression, ExpressionMut, Stepper};
    use crate::iterators::Iter;

    #[test]
    fn test_from_data() {
        let t = Tensor::from_data(&[2, 3], (0..6).collect()).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.len(), 6);
        assert_eq!(t[[1, 2]], 5);
        assert_eq!(t.at(&[1, 0]), &3);

        assert_eq!(
            Tensor::from_data(&[2, 3], vec![1, 2]),
            Err(FromDataError::StorageLengthMismatch)
        );
    }

    #[test]
    fn test_constructors() {
        let t = Tensor::from_fn(&[2, 2], |ix| ix[0] * 10 + ix[1]);
        assert_eq!(t.data(), &[0, 1, 10, 11]);

        let z = Tensor::<f32>::zeros(&[3]);
        assert_eq!(z.to_vec(), [0., 0., 0.]);

        let f = Tensor::full(&[1, 2], "x");
        assert_eq!(f.data(), &["x", "x"]);

        let v: Tensor<i32> = vec![1, 2, 3].into();
        assert_eq!(v.shape(), &[3]);

        let scalar = Tensor::from_fn(&[], |_| 7);
        assert_eq!(scalar.ndim(), 0);
        assert_eq!(scalar.iter().copied().collect::<Vec<_>>(), [7]);
    }

    #[test]
    fn test_get_and_index_mut() {
        let mut t = Tensor::<i32>::zeros(&[2, 2]);
        t[[0, 1]] = 5;
        *t.get_mut(&[1, 1]).unwrap() = 7;
        *t.at_mut(&[1, 0]) = 6;
        assert_eq!(t.get(&[0, 1]), Some(&5));
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0]), None);
        assert_eq!(t.into_data(), [0, 5, 6, 7]);
    }

    #[test]
    fn test_iter() {
        let mut t = Tensor::from_fn(&[2, 3], |ix| ix[0] * 3 + ix[1]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3, 4, 5]);

        for x in t.iter_mut() {
            *x *= 2;
        }
        assert_eq!(t.data(), &[0, 2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_stepper_moves_by_stride() {
        let t = Tensor::from_fn(&[3, 4], |ix| ix[0] * 4 + ix[1]);
        let mut stepper = t.stepper_begin(t.shape());
        assert_eq!(stepper.offset(), 0);
        assert_eq!(*stepper.current(), 0);

        stepper.step(1, 2);
        assert_eq!(*stepper.current(), 2);
        stepper.step(0, 1);
        assert_eq!(*stepper.current(), 6);
        stepper.step_back(1, 1);
        assert_eq!(*stepper.current(), 5);
        stepper.step_back(0, 1);
        assert_eq!(stepper.position(), 1);

        // A full sweep along the last axis followed by a reset returns to the
        // start of the row.
        stepper.step_back(1, 1);
        stepper.step(1, 4);
        stepper.reset(1);
        assert_eq!(stepper.position(), 0);

        stepper.to_end();
        assert_eq!(stepper, t.stepper_end(t.shape()));
        assert_eq!(stepper.position(), 12);
    }

    #[test]
    fn test_stepper_broadcast() {
        let t = Tensor::from_vec(vec![1, 2, 3]);

        // Leading broadcast dims are ignored.
        let mut stepper = t.stepper_begin(&[2, 3]);
        assert_eq!(stepper.offset(), 1);
        stepper.step(0, 5);
        assert_eq!(stepper.position(), 0);
        stepper.step(1, 1);
        assert_eq!(stepper.position(), 1);

        let items: Vec<_> = Iter::new(t.stepper_begin(&[2, 3]), &[2, 3])
            .copied()
            .collect();
        assert_eq!(items, [1, 2, 3, 1, 2, 3]);

        // Size-1 dims are stretched.
        let col = Tensor::from_data(&[2, 1], vec![1, 2]).unwrap();
        let items: Vec<_> = Iter::new(col.stepper_begin(&[2, 3]), &[2, 3])
            .copied()
            .collect();
        assert_eq!(items, [1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_stepper_mut() {
        let mut t = Tensor::from_vec(vec![1, 2, 3]);
        let mut stepper = t.stepper_begin_mut(&[3]);
        stepper.step(0, 2);
        assert_eq!(stepper.position(), 2);
        unsafe {
            *stepper.current() = 10;
        }
        let end = t.stepper_end_mut(&[3]);
        assert_eq!(end.position(), 3);
        assert_eq!(t.data(), &[1, 2, 10]);
    }

    #[test]
    fn test_stepper_equality() {
        let a = Tensor::from_vec(vec![1, 2]);
        let b = a.clone();
        assert_eq!(a.stepper_begin(&[2]), a.stepper_begin(&[2]));
        assert_ne!(a.stepper_begin(&[2]), b.stepper_begin(&[2]));

        // Empty tensors share a dangling data pointer.
        let x = Tensor::<i32>::zeros(&[0]);
        let y = Tensor::<i32>::zeros(&[0]);
        assert_eq!(x.stepper_end(&[0]), x.stepper_end(&[0]));
        assert_ne!(x.stepper_end(&[0]), y.stepper_end(&[0]));
    }

    #[test]
    fn test_is_trivial_broadcast() {
        let t = Tensor::<i32>::zeros(&[2, 3]);
        assert!(t.is_trivial_broadcast(&[3, 1]));
        assert!(!t.is_trivial_broadcast(&[1, 3]));
    }
}
