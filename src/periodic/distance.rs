//! Minimum-image distances under partial or full periodicity.
//!
//! All searches enumerate the neighbouring cell images given by
//! [`PeriodicFlags::translations`] rather than using a closed-form minimum-image formula, so
//! skewed lattices are handled uniformly. The search is exact unless the cell is pathologically
//! thin relative to the $`\{-1, 0, 1\}`$ offsets considered.
//!
//! All inputs are assumed to be finite.

use std::fmt;

use nalgebra::{Matrix3, Point3, Vector3};
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::periodic::{PeriodicFlags, PeriodicFold};

#[cfg(test)]
#[path = "distance_tests.rs"]
mod distance_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the metric used to compare two Cartesian positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// The Euclidean distance.
    #[default]
    Euclidean,

    /// The squared Euclidean distance.
    SquaredEuclidean,

    /// The sum of absolute coordinate differences.
    Cityblock,

    /// The largest absolute coordinate difference.
    Chebyshev,

    /// The Minkowski distance of the associated order $`p \ge 1`$.
    Minkowski(f64),
}

impl DistanceMetric {
    /// Computes the distance between two Cartesian positions.
    #[must_use]
    pub fn distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let diff = a - b;
        match self {
            Self::Euclidean => diff.norm(),
            Self::SquaredEuclidean => diff.norm_squared(),
            Self::Cityblock => diff.abs().sum(),
            Self::Chebyshev => diff.amax(),
            Self::Minkowski(p) => diff
                .iter()
                .map(|x| x.abs().powf(*p))
                .sum::<f64>()
                .powf(1.0 / p),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::SquaredEuclidean => write!(f, "squared euclidean"),
            Self::Cityblock => write!(f, "cityblock"),
            Self::Chebyshev => write!(f, "chebyshev"),
            Self::Minkowski(p) => write!(f, "minkowski (p = {p})"),
        }
    }
}

// ======================================
// Struct definitions and implementations
// ======================================

/// A unit cell lattice mapping fractional coordinates to Cartesian coordinates.
///
/// The rows of [`Self::matrix`] are the cell edge vectors $`\mathbf{a}`$, $`\mathbf{b}`$,
/// $`\mathbf{c}`$, so that a fractional row vector $`\mathbf{f}`$ maps to
/// $`\mathbf{f}\mathbf{L}`$. The lattice must not be singular for periodic searches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct Lattice {
    matrix: Matrix3<f64>,
}

impl From<[[f64; 3]; 3]> for Lattice {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self::from_vectors(
            &Vector3::from(rows[0]),
            &Vector3::from(rows[1]),
            &Vector3::from(rows[2]),
        )
    }
}

impl From<Lattice> for [[f64; 3]; 3] {
    fn from(lattice: Lattice) -> Self {
        let m = lattice.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self::identity()
    }
}

impl Lattice {
    /// Creates a lattice from a matrix whose rows are the cell edge vectors.
    #[must_use]
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Creates a lattice from its three cell edge vectors.
    #[must_use]
    pub fn from_vectors(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Self {
        Self::new(Matrix3::from_rows(&[a.transpose(), b.transpose(), c.transpose()]))
    }

    /// Creates a lattice from cell lengths and inter-axial angles in degrees.
    ///
    /// $`\mathbf{a}`$ lies along $`x`$ and $`\mathbf{b}`$ in the $`xy`$-plane.
    #[must_use]
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let (alpha, beta, gamma) = (alpha.to_radians(), beta.to_radians(), gamma.to_radians());
        let cx = c * beta.cos();
        let cy = c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
        let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();
        Self::from_vectors(
            &Vector3::new(a, 0.0, 0.0),
            &Vector3::new(b * gamma.cos(), b * gamma.sin(), 0.0),
            &Vector3::new(cx, cy, cz),
        )
    }

    /// Creates a cubic lattice with the given edge length.
    #[must_use]
    pub fn cubic(edge: f64) -> Self {
        Self::new(Matrix3::identity() * edge)
    }

    /// The identity lattice, for which fractional and Cartesian coordinates coincide.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Returns the lattice matrix whose rows are the cell edge vectors.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Checks if this is exactly the identity lattice.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity()
    }

    /// Returns the cell volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    /// Maps a fractional vector to Cartesian coordinates.
    #[must_use]
    pub fn to_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        if self.is_identity() {
            *frac
        } else {
            self.matrix.tr_mul(frac)
        }
    }

    /// Maps a set of fractional positions to Cartesian coordinates, skipping the matrix
    /// multiplication altogether for the identity lattice.
    #[must_use]
    pub fn to_cartesian_all(&self, points: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        if self.is_identity() {
            points.iter().map(|p| p.coords).collect()
        } else {
            points.iter().map(|p| self.matrix.tr_mul(&p.coords)).collect()
        }
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, row) in ["a", "b", "c"].iter().zip(self.matrix.row_iter()) {
            writeln!(
                f,
                "{label}: ({:+.6}, {:+.6}, {:+.6})",
                row[0], row[1], row[2]
            )?;
        }
        Ok(())
    }
}

// =========
// Functions
// =========

/// Computes the pairwise metric distances between two sets of Cartesian positions.
fn pairwise_distances(
    cart1: &[Vector3<f64>],
    cart2: &[Vector3<f64>],
    metric: DistanceMetric,
) -> Array2<f64> {
    Array2::from_shape_fn((cart1.len(), cart2.len()), |(i, j)| {
        metric.distance(&cart1[i], &cart2[j])
    })
}

/// Computes, for every lattice translation, the distance matrix between the translated first
/// set and the second set, after folding both sets into the canonical cell.
fn translated_distance_matrices(
    points1: &[Point3<f64>],
    points2: &[Point3<f64>],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    metric: DistanceMetric,
) -> Vec<Array2<f64>> {
    let folded1 = points1.to_vec().fold_into_cell(flags);
    let cart2 = lattice.to_cartesian_all(&points2.to_vec().fold_into_cell(flags));
    flags
        .translations()
        .par_iter()
        .map(|v| {
            let translated = folded1.iter().map(|p| p + v).collect::<Vec<_>>();
            pairwise_distances(&lattice.to_cartesian_all(&translated), &cart2, metric)
        })
        .collect()
}

/// Returns the minimum-image distance from the origin of a fractional displacement.
///
/// The displacement is folded into the canonical cell, each neighbouring lattice translation is
/// added, the candidates are mapped to Cartesian coordinates, and the smallest Euclidean norm
/// is returned.
///
/// # Arguments
///
/// * `displacement` - A fractional displacement vector, typically the difference of two
/// fractional positions.
/// * `lattice` - The unit cell lattice.
/// * `flags` - The periodicity flags.
///
/// # Returns
///
/// The minimum-image distance.
#[must_use]
pub fn min_image_norm(displacement: &Vector3<f64>, lattice: &Lattice, flags: &PeriodicFlags) -> f64 {
    let folded = displacement.fold_into_cell(flags);
    flags
        .translations()
        .iter()
        .map(|v| lattice.to_cartesian(&(folded + v)).norm())
        .fold(f64::INFINITY, f64::min)
}

/// Returns the minimum-image distance matrix between two sets of fractional positions.
///
/// Element $`(i, j)`$ is the smallest metric distance between any periodic image of
/// `points1[i]` and `points2[j]`. When no axis is periodic, a single direct pairwise distance
/// matrix is computed without any translation search. The per-translation matrices are
/// computed in parallel and reduced by element-wise minimum, which does not depend on the
/// order of the translations.
///
/// # Arguments
///
/// * `points1` - The first set of fractional positions.
/// * `points2` - The second set of fractional positions.
/// * `lattice` - The unit cell lattice. The identity lattice skips the Cartesian mapping.
/// * `flags` - The periodicity flags.
/// * `metric` - The metric used to compare Cartesian positions.
///
/// # Returns
///
/// The $`|\mathrm{points1}| \times |\mathrm{points2}|`$ distance matrix.
#[must_use]
pub fn distance_matrix(
    points1: &[Point3<f64>],
    points2: &[Point3<f64>],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    metric: DistanceMetric,
) -> Array2<f64> {
    if flags.is_aperiodic() {
        return pairwise_distances(
            &lattice.to_cartesian_all(points1),
            &lattice.to_cartesian_all(points2),
            metric,
        );
    }
    let shape = (points1.len(), points2.len());
    translated_distance_matrices(points1, points2, lattice, flags, metric)
        .into_par_iter()
        .reduce(
            || Array2::from_elem(shape, f64::INFINITY),
            |mut acc, d| {
                Zip::from(&mut acc).and(&d).for_each(|a, &b| *a = (*a).min(b));
                acc
            },
        )
}

/// Returns the single smallest minimum-image distance between two sets of fractional
/// positions.
///
/// The full distance matrices over all lattice translations are materialised and then reduced,
/// so the result is exactly the global minimum of [`distance_matrix`].
///
/// # Returns
///
/// The smallest distance, or `None` if either set is empty.
#[must_use]
pub fn min_pairwise_distance(
    points1: &[Point3<f64>],
    points2: &[Point3<f64>],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    metric: DistanceMetric,
) -> Option<f64> {
    if points1.is_empty() || points2.is_empty() {
        return None;
    }
    let matrices = if flags.is_aperiodic() {
        vec![pairwise_distances(
            &lattice.to_cartesian_all(points1),
            &lattice.to_cartesian_all(points2),
            metric,
        )]
    } else {
        translated_distance_matrices(points1, points2, lattice, flags, metric)
    };
    matrices
        .iter()
        .flat_map(|d| d.iter().copied())
        .reduce(f64::min)
}
