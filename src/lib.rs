//! ndview provides lazy, non-owning views of N-dimensional arrays.
//!
//! A view is defined by a list of per-axis selectors applied to a base
//! expression. Each selector either fixes its axis at an index, which removes
//! the axis from the view, or keeps a strided range of the axis. Axes of the
//! base after the last selector are included in full.
//!
//! Views behave like any other array expression. They have a shape, support
//! element access by index, can be broadcast to larger shapes and can be
//! traversed with a [`Stepper`](expr::Stepper). Since views implement the
//! same [`Expression`] trait as the arrays they are created from, views of
//! views work the same way.
//!
//! ```
//! use ndview::prelude::*;
//! use ndview::{SliceRange, Tensor};
//!
//! let tensor = Tensor::from_fn(&[3, 4], |ix| ix[0] * 10 + ix[1]);
//!
//! // Select row 1, every other column.
//! let view = tensor.view((1, SliceRange::new(0, None, 2)));
//! assert_eq!(view.shape(), &[2]);
//! assert_eq!(view.to_vec(), [10, 12]);
//!
//! // Broadcast the view to more rows.
//! let rows: Vec<_> = view.broadcast_iter(&[2, 2]).copied().collect();
//! assert_eq!(rows, [10, 12, 10, 12]);
//! ```
//!
//! # Selectors and slice items
//!
//! Views are usually created from [`SliceItem`]s, which allow negative
//! indices and open-ended ranges as in NumPy. These are resolved against the
//! base's shape into [`Selector`]s when the view is created. Views can also
//! be created directly from selectors using
//! [`View::from_selectors`].
//!
//! # Logging
//!
//! View construction failures are logged at `debug` level and resolved
//! selectors at `trace` level using the [log](https://docs.rs/log) crate.

pub mod axis_map;
pub mod broadcast;
pub mod errors;
pub mod expr;
mod index_iterator;
pub mod iterators;
pub mod layout;
pub mod selector;
pub mod slice_range;
mod tensor;
mod view;

// Re-exports for convenience.
pub use axis_map::AxisMap;
pub use broadcast::Shape;
pub use expr::{Expression, ExpressionMut, Stepper};
pub use index_iterator::{DynIndex, Indices};
pub use selector::{AxisKind, RangedSelector, Selector, StepRange};
pub use slice_range::{SliceItem, SliceRange};
pub use tensor::{Tensor, TensorStepper, TensorStepperMut};
pub use view::{View, ViewLayout, ViewMut, ViewStepper};

/// This module provides a convenient way to import the most common traits
/// from this library via a glob import.
pub mod prelude {
    pub use super::{Expression, ExpressionMut, RangedSelector, Stepper};
}
