//! Shape broadcasting following NumPy rules.

use std::iter::{repeat, zip};

use smallvec::SmallVec;

/// Shape type used for view and tensor shapes.
pub type Shape = SmallVec<[usize; 4]>;

/// Given the shapes of two expressions, return the shape that will result
/// from broadcasting them following NumPy rules or `None` if the shapes are
/// not compatible.
///
/// Broadcasting works by left-padding the input shapes with 1s so they are
/// the same length, then matching dimensions starting from the right. For
/// each dimension, the values are compatible if they are the same or one of
/// them is 1. The larger of the two values is the size of that dimension in
/// the output shape.
///
/// See https://numpy.org/doc/stable/user/basics.broadcasting.html#general-broadcasting-rules
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Option<Shape> {
    let a_pad = b.len().saturating_sub(a.len());
    let b_pad = a.len().saturating_sub(b.len());

    let a_iter = a.iter().copied().rev().chain(repeat(1).take(a_pad));
    let b_iter = b.iter().copied().rev().chain(repeat(1).take(b_pad));

    let mut result = SmallVec::with_capacity(a.len().max(b.len()));
    for (a, b) in a_iter.zip(b_iter) {
        if a == b {
            result.push(a);
        } else if a == 1 {
            result.push(b);
        } else if b == 1 {
            result.push(a);
        } else {
            return None;
        }
    }
    result.reverse();

    Some(result)
}

/// Broadcast `shape` with `target`, replacing `target` with the combined
/// shape.
///
/// Returns false and leaves `target` unchanged if the shapes are not
/// compatible.
pub fn broadcast_into(shape: &[usize], target: &mut Shape) -> bool {
    match broadcast_shapes(shape, target) {
        Some(combined) => {
            *target = combined;
            true
        }
        None => false,
    }
}

/// Return true if an expression with shape `from` can be broadcast to
/// `to` without changing `to`.
pub fn can_broadcast_to(from: &[usize], to: &[usize]) -> bool {
    if from == to {
        return true;
    } else if from.len() > to.len() {
        return false;
    }

    // If `from` has fewer dimensions, pretend that it was prefixed with
    // 1-length dimensions to make the dimension counts equal.
    let to_dims = to[to.len() - from.len()..].iter().copied();
    zip(from.iter().copied(), to_dims).all(|(a, b)| a == b || a == 1)
}
