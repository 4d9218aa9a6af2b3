//! Miscellaneous numerical helpers.

use nalgebra::{Dim, Matrix, RawStorage};
use num_traits::Float;

#[cfg(test)]
#[path = "misc_tests.rs"]
mod misc_tests;

/// Checks if two floats are close in the element-wise sense of
/// $`|a - b| \le \mathrm{atol} + \mathrm{rtol} \cdot |b|`$.
///
/// Note that this relation is not symmetric in $`a`$ and $`b`$.
#[must_use]
pub(crate) fn is_close<T: Float>(a: T, b: T, rtol: T, atol: T) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// Checks if two matrices of identical shape are element-wise close according to
/// [`is_close`].
///
/// # Arguments
///
/// * `a` - The first matrix.
/// * `b` - The second matrix, whose elements set the relative scale.
/// * `rtol` - The relative tolerance.
/// * `atol` - The absolute tolerance.
///
/// # Returns
///
/// A flag indicating if every pair of corresponding elements is close.
#[must_use]
pub(crate) fn all_close<T, R, C, S1, S2>(
    a: &Matrix<T, R, C, S1>,
    b: &Matrix<T, R, C, S2>,
    rtol: T,
    atol: T,
) -> bool
where
    T: Float,
    R: Dim,
    C: Dim,
    S1: RawStorage<T, R, C>,
    S2: RawStorage<T, R, C>,
{
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(&x, &y)| is_close(x, y, rtol, atol))
}

/// Replaces values within `thresh` of zero by an exact positive zero, so that they are not
/// displayed as `-0`.
#[must_use]
pub(crate) fn clean_zero<T: Float>(x: T, thresh: T) -> T {
    if x.abs() <= thresh {
        T::zero()
    } else {
        x
    }
}
