//! Error types that are reported when constructing tensors and views.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors that can occur when constructing a tensor from existing data.
#[derive(Clone, Debug, PartialEq)]
pub enum FromDataError {
    /// The storage length was expected to exactly match the product of the
    /// shape, and it did not.
    StorageLengthMismatch,
}

impl Display for FromDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FromDataError::StorageLengthMismatch => write!(f, "data length mismatch"),
        }
    }
}

impl Error for FromDataError {}

/// Errors that can occur when resolving slice items into the selectors of a
/// view.
#[derive(Clone, Debug, PartialEq)]
pub enum SliceError {
    /// The slice spec has more items than the base has dimensions.
    TooManyDims,

    /// An index in the slice spec is out of bounds for the corresponding
    /// base dimension.
    InvalidIndex,

    /// A range in the slice spec does not resolve to a valid range of the
    /// corresponding base dimension.
    InvalidRange,

    /// The step in a slice range is negative. Views only step forwards.
    InvalidStep,
}

impl Display for SliceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceError::TooManyDims => write!(f, "slice spec has too many dims"),
            SliceError::InvalidIndex => write!(f, "slice index is invalid"),
            SliceError::InvalidRange => write!(f, "slice range is invalid"),
            SliceError::InvalidStep => write!(f, "slice step is invalid"),
        }
    }
}

impl Error for SliceError {}
