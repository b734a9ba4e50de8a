//! Views which select and reshape part of another expression.
//!
//! A view stores one [`Selector`] per leading axis of its base. Index
//! selectors fix their base axis and remove it from the view. Range
//! selectors keep their axis, possibly resized and strided. Base axes past
//! the end of the selector list are included in full.
//!
//! Views do not copy any elements. Element access maps the view index to a
//! base index, and traversal uses a [`ViewStepper`] which translates each
//! movement along a view axis into a scaled movement of the base's stepper.

use std::fmt::Debug;
use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use crate::axis_map::AxisMap;
use crate::broadcast::{can_broadcast_to, Shape};
use crate::errors::SliceError;
use crate::expr::{Expression, ExpressionMut, Stepper};
use crate::index_iterator::DynIndex;
use crate::iterators::{Iter, IterMut};
use crate::selector::{RangedSelector, Selector};
use crate::slice_range::{IntoSliceItems, SliceItem};
use crate::tensor::{broadcast_offset, Tensor};

/// Selector list for a view, together with the lookups derived from it.
///
/// This is shared by [`View`] and [`ViewMut`]. Steppers hold a reference to
/// it, which also serves as the identity of the view they were created from.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewLayout {
    selectors: SmallVec<[Selector; 4]>,
    axes: AxisMap,
    shape: Shape,
}

impl ViewLayout {
    /// Create the layout for a view of a base with shape `base_shape`.
    ///
    /// The selectors are trusted to be valid for the base. In debug builds
    /// this is checked.
    pub fn new(base_shape: &[usize], selectors: SmallVec<[Selector; 4]>) -> ViewLayout {
        debug_assert!(
            selectors.len() <= base_shape.len(),
            "view has {} selectors but base has {} dims",
            selectors.len(),
            base_shape.len()
        );
        debug_assert!(
            selectors
                .iter()
                .zip(base_shape)
                .all(|(sel, &size)| sel.fits(size)),
            "selectors {:?} are out of bounds for shape {:?}",
            selectors,
            base_shape
        );

        let axes = AxisMap::from_selectors(&selectors);
        let ndim = axes.view_ndim(base_shape.len());
        let shape = (0..ndim)
            .map(|axis| {
                let pos = axes.integral_skip(axis);
                match selectors.get(pos) {
                    Some(Selector::Range(range)) => range.size(),
                    // Past the end of the selector list.
                    _ => base_shape[pos],
                }
            })
            .collect();

        ViewLayout {
            selectors,
            axes,
            shape,
        }
    }

    /// Resolve slice items against a base shape and create the layout for
    /// the resulting view.
    pub fn from_items(base_shape: &[usize], items: &[SliceItem]) -> Result<ViewLayout, SliceError> {
        if items.len() > base_shape.len() {
            log::debug!(
                "cannot slice shape {:?} with {} items",
                base_shape,
                items.len()
            );
            return Err(SliceError::TooManyDims);
        }

        let selectors = items
            .iter()
            .zip(base_shape)
            .map(|(item, &size)| {
                item.resolve(size).inspect_err(|err| {
                    log::debug!("cannot resolve {} for dim of size {}: {}", item, size, err);
                })
            })
            .collect::<Result<SmallVec<[Selector; 4]>, _>>()?;

        log::trace!("resolved view selectors {:?} for shape {:?}", selectors, base_shape);

        Ok(ViewLayout::new(base_shape, selectors))
    }

    /// Return the resolved selectors, one per leading base axis.
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Return the positional lookups for the selector list.
    pub fn axis_map(&self) -> &AxisMap {
        &self.axes
    }

    /// Return the shape of the view.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the number of dimensions of the view.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Map an index in the view to the corresponding index in the base.
    ///
    /// `index` must have one entry per view dimension. Entries are not
    /// bounds-checked.
    pub fn base_index(&self, index: &[usize]) -> DynIndex {
        let base_ndim = index.len() + self.axes.integral_count();
        (0..base_ndim)
            .map(|pos| match self.selectors.get(pos) {
                Some(Selector::Index(idx)) => *idx,
                Some(Selector::Range(range)) => {
                    range.map(index[pos - self.axes.integral_count_before(pos)])
                }
                None => index[pos - self.axes.integral_count()],
            })
            .collect()
    }

    /// Variant of [`base_index`](ViewLayout::base_index) which returns
    /// `None` if the index is not valid for the view's shape.
    pub fn try_base_index(&self, index: &[usize]) -> Option<DynIndex> {
        let valid = index.len() == self.shape.len()
            && index.iter().zip(self.shape.iter()).all(|(i, size)| i < size);
        valid.then(|| self.base_index(index))
    }

    /// Return the base axis that view axis `axis` moves along, and the
    /// number of base elements to move per view element.
    ///
    /// Axes of size 1 use a multiplier of zero so they can be broadcast.
    #[inline]
    fn stepping(&self, axis: usize) -> (usize, usize) {
        let pos = self.axes.integral_skip(axis);
        // Selector steps only scale axes that can't be stretched.
        if self.shape[axis] == 1 {
            return (pos, 0);
        }
        match self.selectors.get(pos) {
            Some(Selector::Range(range)) => (pos, range.step_size(0)),
            _ => (pos, 1),
        }
    }
}

/// Shared view of part of an [`Expression`].
///
/// Views can be created from any expression, including other views.
pub struct View<'a, E: Expression> {
    base: &'a E,
    layout: ViewLayout,
}

impl<'a, E: Expression> View<'a, E> {
    /// Create a view of `base` using slice items.
    ///
    /// See [`Tensor::view`] for how items are interpreted. Panics if the
    /// items are not valid for the base's shape.
    pub fn new<R: IntoSliceItems>(base: &'a E, items: R) -> View<'a, E> {
        Self::try_new(base, items).unwrap_or_else(|err| {
            panic!("failed to create view of shape {:?}: {}", base.shape(), err)
        })
    }

    /// Variant of [`new`](View::new) that returns an error instead of
    /// panicking.
    pub fn try_new<R: IntoSliceItems>(base: &'a E, items: R) -> Result<View<'a, E>, SliceError> {
        let layout = ViewLayout::from_items(base.shape(), items.into_slice_items().as_ref())?;
        Ok(View { base, layout })
    }

    /// Create a view of `base` from resolved selectors.
    ///
    /// The selectors are trusted to be in bounds for the base.
    pub fn from_selectors<I: IntoIterator<Item = Selector>>(base: &'a E, selectors: I) -> View<'a, E> {
        let layout = ViewLayout::new(base.shape(), selectors.into_iter().collect());
        View { base, layout }
    }

    /// Return the expression this view was created from.
    pub fn base(&self) -> &'a E {
        self.base
    }

    /// Return the selector list and derived lookups.
    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }

    /// Return the resolved selectors, one per leading base axis.
    pub fn selectors(&self) -> &[Selector] {
        self.layout.selectors()
    }

    /// Return the element at `index`, or `None` if the index is invalid.
    pub fn get(&self, index: &[usize]) -> Option<&'a E::Elem> {
        self.layout
            .try_base_index(index)
            .map(|base_index| self.base.at(&base_index))
    }

    /// Return an iterator over elements of the view in row-major order.
    pub fn iter(&self) -> Iter<ViewStepper<'_, E::Stepper<'_>>> {
        Iter::new(self.stepper_begin(self.layout.shape()), self.layout.shape())
    }

    /// Return an iterator over the elements of this view broadcast to
    /// `shape`.
    ///
    /// Panics if the view cannot be broadcast to `shape`.
    pub fn broadcast_iter(&self, shape: &[usize]) -> Iter<ViewStepper<'_, E::Stepper<'_>>> {
        assert!(
            can_broadcast_to(self.layout.shape(), shape),
            "cannot broadcast view with shape {:?} to {:?}",
            self.layout.shape(),
            shape
        );
        Iter::new(self.stepper_begin(shape), shape)
    }

    /// Copy the elements of this view into a new tensor.
    pub fn to_tensor(&self) -> Tensor<E::Elem>
    where
        E::Elem: Clone,
    {
        let data = self.iter().cloned().collect();
        // The element count always equals the product of the view's shape.
        Tensor::from_data(self.layout.shape(), data).unwrap_or_else(|_| unreachable!())
    }

    /// Copy the elements of this view into a vector, in row-major order.
    pub fn to_vec(&self) -> Vec<E::Elem>
    where
        E::Elem: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Create a view of part of this view.
    ///
    /// See [`Tensor::view`]. Panics if the items are invalid.
    pub fn view<R: IntoSliceItems>(&self, items: R) -> View<'_, Self> {
        View::new(self, items)
    }
}

impl<E: Expression> Clone for View<'_, E> {
    fn clone(&self) -> Self {
        View {
            base: self.base,
            layout: self.layout.clone(),
        }
    }
}

impl<E: Expression> Debug for View<'_, E>
where
    E::Elem: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("shape", &self.layout.shape())
            .field("selectors", &self.layout.selectors())
            .finish()
    }
}

impl<'a, E: Expression> Expression for View<'a, E> {
    type Elem = E::Elem;
    type Stepper<'b>
        = ViewStepper<'b, E::Stepper<'b>>
    where
        Self: 'b;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> &E::Elem {
        self.base.at(&self.layout.base_index(index))
    }

    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_> {
        let base: &E = self.base;
        let offset = broadcast_offset(shape, self.layout.ndim());
        ViewStepper::begin(&self.layout, base.stepper_begin(base.shape()), offset)
    }

    fn stepper_end(&self, shape: &[usize]) -> Self::Stepper<'_> {
        let base: &E = self.base;
        let offset = broadcast_offset(shape, self.layout.ndim());
        ViewStepper::new(&self.layout, base.stepper_end(base.shape()), offset)
    }

    fn is_trivial_broadcast(&self, _strides: &[usize]) -> bool {
        false
    }
}

impl<E: Expression, const N: usize> Index<[usize; N]> for View<'_, E> {
    type Output = E::Elem;

    fn index(&self, index: [usize; N]) -> &E::Elem {
        self.at(&index)
    }
}

/// Mutable view of part of an [`ExpressionMut`].
///
/// This mutably borrows its base for its lifetime.
pub struct ViewMut<'a, E: ExpressionMut> {
    base: &'a mut E,
    layout: ViewLayout,
}

impl<'a, E: ExpressionMut> ViewMut<'a, E> {
    /// Create a mutable view of `base` using slice items.
    ///
    /// Panics if the items are not valid for the base's shape.
    pub fn new<R: IntoSliceItems>(base: &'a mut E, items: R) -> ViewMut<'a, E> {
        let layout = ViewLayout::from_items(base.shape(), items.into_slice_items().as_ref())
            .unwrap_or_else(|err| {
                panic!("failed to create view of shape {:?}: {}", base.shape(), err)
            });
        ViewMut { base, layout }
    }

    /// Variant of [`new`](ViewMut::new) that returns an error instead of
    /// panicking.
    pub fn try_new<R: IntoSliceItems>(base: &'a mut E, items: R) -> Result<ViewMut<'a, E>, SliceError> {
        let layout = ViewLayout::from_items(base.shape(), items.into_slice_items().as_ref())?;
        Ok(ViewMut { base, layout })
    }

    /// Create a mutable view of `base` from resolved selectors.
    ///
    /// Panics if any selector is out of bounds for the base.
    pub fn from_selectors<I: IntoIterator<Item = Selector>>(
        base: &'a mut E,
        selectors: I,
    ) -> ViewMut<'a, E> {
        let selectors: SmallVec<[Selector; 4]> = selectors.into_iter().collect();

        // Mutable iteration relies on each view element mapping to a distinct
        // base element.
        let base_shape = base.shape();
        assert!(
            selectors.len() <= base_shape.len()
                && selectors
                    .iter()
                    .zip(base_shape)
                    .all(|(sel, &size)| sel.fits(size)),
            "selectors {:?} are out of bounds for shape {:?}",
            selectors,
            base_shape
        );

        let layout = ViewLayout::new(base_shape, selectors);
        ViewMut { base, layout }
    }

    /// Return the selector list and derived lookups.
    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }

    /// Return the resolved selectors, one per leading base axis.
    pub fn selectors(&self) -> &[Selector] {
        self.layout.selectors()
    }

    /// Return a shared view with the same selectors.
    pub fn as_view(&self) -> View<'_, E> {
        View {
            base: &*self.base,
            layout: self.layout.clone(),
        }
    }

    /// Return the element at `index`, or `None` if the index is invalid.
    pub fn get(&self, index: &[usize]) -> Option<&E::Elem> {
        self.layout
            .try_base_index(index)
            .map(|base_index| self.base.at(&base_index))
    }

    /// Return the element at `index`, or `None` if the index is invalid.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut E::Elem> {
        self.layout
            .try_base_index(index)
            .map(|base_index| self.base.at_mut(&base_index))
    }

    /// Return an iterator over elements of the view in row-major order.
    pub fn iter(&self) -> Iter<ViewStepper<'_, E::Stepper<'_>>> {
        Iter::new(self.stepper_begin(self.layout.shape()), self.layout.shape())
    }

    /// Return an iterator over mutable references to elements of the view in
    /// row-major order.
    pub fn iter_mut(&mut self) -> IterMut<'_, E::Elem, ViewStepper<'_, E::StepperMut<'_>>> {
        let shape = self.layout.shape.clone();
        let stepper = self.stepper_begin_mut(&shape);
        // Safety: The selectors are in bounds and step forwards, so each
        // element of the view's own shape maps to a distinct base element.
        unsafe { IterMut::new(stepper, &shape) }
    }

    /// Set every element of the view to `value`.
    pub fn fill(&mut self, value: E::Elem)
    where
        E::Elem: Clone,
    {
        for x in self.iter_mut() {
            *x = value.clone();
        }
    }

    /// Copy elements from `src`, broadcasting it to this view's shape.
    ///
    /// Panics if `src` cannot be broadcast to the view's shape.
    pub fn copy_from<S: Expression<Elem = E::Elem>>(&mut self, src: &S)
    where
        E::Elem: Clone,
    {
        let shape = self.layout.shape.clone();
        assert!(
            can_broadcast_to(src.shape(), &shape),
            "cannot broadcast source with shape {:?} to {:?}",
            src.shape(),
            shape
        );
        let src_iter = Iter::new(src.stepper_begin(&shape), &shape);
        for (dst, x) in self.iter_mut().zip(src_iter) {
            *dst = x.clone();
        }
    }

    /// Create a mutable view of part of this view.
    ///
    /// See [`Tensor::view`]. Panics if the items are invalid.
    pub fn view_mut<R: IntoSliceItems>(&mut self, items: R) -> ViewMut<'_, Self> {
        ViewMut::new(self, items)
    }
}

impl<E: ExpressionMut> Debug for ViewMut<'_, E>
where
    E::Elem: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewMut")
            .field("shape", &self.layout.shape())
            .field("selectors", &self.layout.selectors())
            .finish()
    }
}

impl<'a, E: ExpressionMut> Expression for ViewMut<'a, E> {
    type Elem = E::Elem;
    type Stepper<'b>
        = ViewStepper<'b, E::Stepper<'b>>
    where
        Self: 'b;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> &E::Elem {
        self.base.at(&self.layout.base_index(index))
    }

    fn stepper_begin(&self, shape: &[usize]) -> Self::Stepper<'_> {
        let base: &E = &*self.base;
        let offset = broadcast_offset(shape, self.layout.ndim());
        ViewStepper::begin(&self.layout, base.stepper_begin(base.shape()), offset)
    }

    fn stepper_end(&self, shape: &[usize]) -> Self::Stepper<'_> {
        let base: &E = &*self.base;
        let offset = broadcast_offset(shape, self.layout.ndim());
        ViewStepper::new(&self.layout, base.stepper_end(base.shape()), offset)
    }

    fn is_trivial_broadcast(&self, _strides: &[usize]) -> bool {
        false
    }
}

unsafe impl<'a, E: ExpressionMut> ExpressionMut for ViewMut<'a, E> {
    type StepperMut<'b>
        = ViewStepper<'b, E::StepperMut<'b>>
    where
        Self: 'b;

    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut E::Elem {
        let base_index = self.layout.base_index(index);
        self.base.at_mut(&base_index)
    }

    fn stepper_begin_mut(&mut self, shape: &[usize]) -> Self::StepperMut<'_> {
        let offset = broadcast_offset(shape, self.layout.ndim());
        let base_shape: Shape = self.base.shape().iter().copied().collect();
        let inner = self.base.stepper_begin_mut(&base_shape);
        ViewStepper::begin(&self.layout, inner, offset)
    }

    fn stepper_end_mut(&mut self, shape: &[usize]) -> Self::StepperMut<'_> {
        let offset = broadcast_offset(shape, self.layout.ndim());
        let base_shape: Shape = self.base.shape().iter().copied().collect();
        let inner = self.base.stepper_end_mut(&base_shape);
        ViewStepper::new(&self.layout, inner, offset)
    }
}

impl<E: ExpressionMut, const N: usize> Index<[usize; N]> for ViewMut<'_, E> {
    type Output = E::Elem;

    fn index(&self, index: [usize; N]) -> &E::Elem {
        self.at(&index)
    }
}

impl<E: ExpressionMut, const N: usize> IndexMut<[usize; N]> for ViewMut<'_, E> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut E::Elem {
        self.at_mut(&index)
    }
}

/// Stepper over the elements of a [`View`] or [`ViewMut`].
///
/// This wraps a stepper over the whole base. Moving `n` elements along view
/// axis `a` moves the base stepper `n * m` elements along base axis
/// `integral_skip(a)`, where `m` is the step of that axis's selector.
#[derive(Clone, Debug)]
pub struct ViewStepper<'a, S> {
    layout: &'a ViewLayout,
    inner: S,

    /// Number of leading broadcast-only dimensions in the iteration shape.
    offset: usize,
}

impl<'a, S> ViewStepper<'a, S> {
    fn new(layout: &'a ViewLayout, inner: S, offset: usize) -> Self {
        ViewStepper {
            layout,
            inner,
            offset,
        }
    }

    /// Return the stepper over the base.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Return the number of leading iteration dimensions the view does not
    /// have.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, S: Stepper> ViewStepper<'a, S> {
    /// Create a stepper at the first element of a view, given a stepper at
    /// the first element of its base.
    fn begin(layout: &'a ViewLayout, mut inner: S, offset: usize) -> Self {
        for (axis, selector) in layout.selectors.iter().enumerate() {
            let start = match selector {
                Selector::Index(idx) => *idx,
                Selector::Range(range) => range.start(),
            };
            if start > 0 {
                inner.step(axis, start);
            }
        }
        ViewStepper::new(layout, inner, offset)
    }
}

impl<'a, S: Stepper> Stepper for ViewStepper<'a, S> {
    type Item = S::Item;

    #[inline]
    fn current(&self) -> S::Item {
        self.inner.current()
    }

    #[inline]
    fn step(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            let (base_axis, mult) = self.layout.stepping(axis - self.offset);
            self.inner.step(base_axis, mult * n);
        }
    }

    #[inline]
    fn step_back(&mut self, axis: usize, n: usize) {
        if axis >= self.offset {
            let (base_axis, mult) = self.layout.stepping(axis - self.offset);
            self.inner.step_back(base_axis, mult * n);
        }
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        if axis >= self.offset {
            let axis = axis - self.offset;
            let (base_axis, mult) = self.layout.stepping(axis);
            self.inner.step_back(base_axis, mult * self.layout.shape[axis]);
        }
    }

    fn to_end(&mut self) {
        self.inner.to_end();
    }
}

impl<S: PartialEq> PartialEq for ViewStepper<'_, S> {
    /// Steppers are equal if they were created from the same view instance
    /// and are at the same position.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.layout, other.layout)
            && self.inner == other.inner
            && self.offset == other.offset
    }
}
