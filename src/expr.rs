//! Traits for array-like expressions and the cursors used to traverse them.

use crate::broadcast::{broadcast_into, Shape};

/// A cursor over the elements of an expression.
///
/// A stepper is positioned at one element of its expression. It moves along
/// the axes of an iteration shape, which may have more dimensions than the
/// expression itself. Leading dimensions of the iteration shape that the
/// expression does not have are broadcast: moving along them does not move
/// the cursor.
///
/// Traversal follows an odometer protocol. After visiting `size` elements
/// along an axis by stepping `size` times, [`reset`](Stepper::reset) returns
/// the cursor to the start of that axis. See [`Iter`](crate::iterators::Iter).
pub trait Stepper {
    /// The value produced when dereferencing the stepper.
    type Item;

    /// Return the element at the current position.
    ///
    /// The stepper must be positioned on an element, ie. not at the end.
    fn current(&self) -> Self::Item;

    /// Move forwards `n` elements along `axis` of the iteration shape.
    fn step(&mut self, axis: usize, n: usize);

    /// Move backwards `n` elements along `axis` of the iteration shape.
    fn step_back(&mut self, axis: usize, n: usize);

    /// Undo a full sweep along `axis`.
    fn reset(&mut self, axis: usize);

    /// Move to the end position of the traversal.
    fn to_end(&mut self);
}

/// An array-like object with a shape, element access by index and
/// broadcast traversal.
pub trait Expression {
    /// The element type.
    type Elem;

    /// Stepper over shared references to elements.
    type Stepper<'a>: Stepper<Item = &'a Self::Elem> + PartialEq
    where
        Self: 'a;

    /// Return the size of each dimension.
    fn shape(&self) -> &[usize];

    /// Return the number of dimensions.
    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Return the number of elements.
    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Return true if the expression has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the element at `index`, which must have one entry per
    /// dimension.
    ///
    /// Invalid indices may panic or return an unspecified element, but never
    /// cause undefined behavior.
    fn at(&self, index: &[usize]) -> &Self::Elem;

    /// Return a stepper positioned at the first element, for traversing
    /// this expression broadcast to `shape`.
    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_>;

    /// Return a stepper positioned at the end, for traversing this
    /// expression broadcast to `shape`.
    fn stepper_end(&self, shape: &[usize]) -> Self::Stepper<'_>;

    /// Broadcast this expression's shape with `shape`, replacing `shape`
    /// with the result.
    ///
    /// Returns false if the shapes are incompatible, in which case `shape`
    /// is unchanged.
    fn broadcast_shape(&self, shape: &mut Shape) -> bool {
        broadcast_into(self.shape(), shape)
    }

    /// Return true if traversing this expression with the given strides is
    /// the same as traversing its storage linearly.
    ///
    /// When this returns true callers may copy elements in bulk instead of
    /// using steppers.
    fn is_trivial_broadcast(&self, strides: &[usize]) -> bool;
}

/// An expression whose elements can be modified.
///
/// Mutable steppers yield raw pointers. They are turned into references by
/// [`IterMut`](crate::iterators::IterMut), which visits each element at most
/// once.
///
/// # Safety
///
/// When a stepper from [`stepper_begin_mut`](ExpressionMut::stepper_begin_mut)
/// traverses the expression's own shape, every pointer it yields must be
/// valid for writes for the stepper's lifetime and no two positions may
/// yield the same pointer.
pub unsafe trait ExpressionMut: Expression {
    /// Stepper over pointers to elements.
    type StepperMut<'a>: Stepper<Item = *mut Self::Elem> + PartialEq
    where
        Self: 'a;

    /// Return a mutable reference to the element at `index`.
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem;

    /// Mutable variant of [`stepper_begin`](Expression::stepper_begin).
    fn stepper_begin_mut(&mut self, shape: &[usize]) -> Self::StepperMut<'_>;

    /// Mutable variant of [`stepper_end`](Expression::stepper_end).
    fn stepper_end_mut(&mut self, shape: &[usize]) -> Self::StepperMut<'_>;
}
