//! Periodic boundary conditions of a unit cell.
//!
//! Fractional coordinates are plain elements of $`\mathbb{R}^3`$. Folding into the canonical
//! cell happens only here, and only along axes flagged as periodic.

use std::fmt;

use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

pub mod distance;


// ======================================
// Struct definitions and implementations
// ======================================

/// Per-axis periodicity flags of a unit cell.
///
/// In YAML inputs, the flags can be given either as booleans (`[true, true, false]`) or as
/// integers (`[1, 1, 0]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FlagsRepr", into = "[bool; 3]")]
pub struct PeriodicFlags([bool; 3]);

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagsRepr {
    Bools([bool; 3]),
    Ints([u8; 3]),
}

impl From<FlagsRepr> for PeriodicFlags {
    fn from(repr: FlagsRepr) -> Self {
        match repr {
            FlagsRepr::Bools(flags) => Self(flags),
            FlagsRepr::Ints(flags) => Self(flags.map(|flag| flag != 0)),
        }
    }
}

impl From<PeriodicFlags> for [bool; 3] {
    fn from(flags: PeriodicFlags) -> Self {
        flags.0
    }
}

impl From<[bool; 3]> for PeriodicFlags {
    fn from(flags: [bool; 3]) -> Self {
        Self(flags)
    }
}

impl Default for PeriodicFlags {
    fn default() -> Self {
        Self::full()
    }
}

impl PeriodicFlags {
    /// Creates periodicity flags for the three lattice axes.
    #[must_use]
    pub fn new(a: bool, b: bool, c: bool) -> Self {
        Self([a, b, c])
    }

    /// Full three-dimensional periodicity.
    #[must_use]
    pub fn full() -> Self {
        Self([true; 3])
    }

    /// No periodicity at all.
    #[must_use]
    pub fn none() -> Self {
        Self([false; 3])
    }

    /// Checks if the given axis wraps.
    #[must_use]
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.0[axis]
    }

    /// Checks if no axis wraps, in which case no periodic images exist.
    #[must_use]
    pub fn is_aperiodic(&self) -> bool {
        self.0.iter().all(|flag| !flag)
    }

    /// Enumerates the integer lattice translations needed to reach all neighbouring cell images.
    ///
    /// The candidate offsets along an axis are $`\{-1, 0, 1\}`$ if the axis is periodic and
    /// $`\{0\}`$ otherwise. The full Cartesian product is returned, so there are at most $`27`$
    /// translations, always including the zero vector.
    #[must_use]
    pub fn translations(&self) -> Vec<Vector3<f64>> {
        let offsets = |axis: usize| -> Vec<f64> {
            if self.0[axis] {
                vec![-1.0, 0.0, 1.0]
            } else {
                vec![0.0]
            }
        };
        iproduct!(offsets(0), offsets(1), offsets(2))
            .map(|(i, j, k)| Vector3::new(i, j, k))
            .collect()
    }

    /// Folds a single component along the given axis into $`[0, 1)`$ if that axis is periodic.
    #[must_use]
    pub fn fold_component(&self, axis: usize, value: f64) -> f64 {
        if self.0[axis] {
            value - value.floor()
        } else {
            value
        }
    }

    /// Folds a single component as in [`Self::fold_component`], then reflects values above
    /// $`1/2`$ to $`1 - x`$.
    #[must_use]
    pub fn fold_centred_component(&self, axis: usize, value: f64) -> f64 {
        if self.0[axis] {
            let folded = value - value.floor();
            if folded > 0.5 {
                1.0 - folded
            } else {
                folded
            }
        } else {
            value
        }
    }
}

impl fmt::Display for PeriodicFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.0
                .iter()
                .map(|flag| if *flag { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Enumerates the integer lattice translations for the given periodicity flags.
///
/// See [`PeriodicFlags::translations`].
#[must_use]
pub fn enumerate_translations(flags: &PeriodicFlags) -> Vec<Vector3<f64>> {
    flags.translations()
}

// =================
// Trait definitions
// =================

/// Folding of fractional coordinates into the canonical cell.
///
/// Implemented for single points and vectors as well as for collections of them, so that the
/// same operation applies regardless of the number of leading dimensions. The input is never
/// modified.
pub trait PeriodicFold: Sized {
    /// Returns a copy in which every component along a periodic axis is replaced by
    /// $`x - \lfloor x \rfloor`$. Components along non-periodic axes pass through unchanged.
    #[must_use]
    fn fold_into_cell(&self, flags: &PeriodicFlags) -> Self;

    /// Returns a copy folded as in [`Self::fold_into_cell`], in which periodic components
    /// greater than $`1/2`$ are additionally reflected to $`1 - x`$.
    #[must_use]
    fn fold_into_cell_centred(&self, flags: &PeriodicFlags) -> Self;
}

impl PeriodicFold for Vector3<f64> {
    fn fold_into_cell(&self, flags: &PeriodicFlags) -> Self {
        Vector3::from_fn(|i, _| flags.fold_component(i, self[i]))
    }

    fn fold_into_cell_centred(&self, flags: &PeriodicFlags) -> Self {
        Vector3::from_fn(|i, _| flags.fold_centred_component(i, self[i]))
    }
}

impl PeriodicFold for Point3<f64> {
    fn fold_into_cell(&self, flags: &PeriodicFlags) -> Self {
        Point3::from(self.coords.fold_into_cell(flags))
    }

    fn fold_into_cell_centred(&self, flags: &PeriodicFlags) -> Self {
        Point3::from(self.coords.fold_into_cell_centred(flags))
    }
}

impl<T: PeriodicFold> PeriodicFold for Vec<T> {
    fn fold_into_cell(&self, flags: &PeriodicFlags) -> Self {
        self.iter().map(|item| item.fold_into_cell(flags)).collect()
    }

    fn fold_into_cell_centred(&self, flags: &PeriodicFlags) -> Self {
        self.iter().map(|item| item.fold_into_cell_centred(flags)).collect()
    }
}

/// Rows of an $`N \times 3`$ array are treated as individual vectors. Arrays with more than three
/// columns cause a panic.
impl PeriodicFold for Array2<f64> {
    fn fold_into_cell(&self, flags: &PeriodicFlags) -> Self {
        let mut folded = self.clone();
        folded.axis_iter_mut(Axis(0)).for_each(|mut row| {
            row.iter_mut()
                .enumerate()
                .for_each(|(i, x)| *x = flags.fold_component(i, *x));
        });
        folded
    }

    fn fold_into_cell_centred(&self, flags: &PeriodicFlags) -> Self {
        let mut folded = self.clone();
        folded.axis_iter_mut(Axis(0)).for_each(|mut row| {
            row.iter_mut()
                .enumerate()
                .for_each(|(i, x)| *x = flags.fold_centred_component(i, *x));
        });
        folded
    }
}
