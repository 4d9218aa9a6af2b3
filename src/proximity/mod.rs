//! Proximity checks and connectivity of labelled point sets under periodicity.

use std::fmt;

use anyhow::{self, ensure, format_err};
use nalgebra::Point3;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::auxiliary::tolerance::{covalent_radius, ToleranceLookup};
use crate::periodic::distance::{distance_matrix, min_image_norm, DistanceMetric, Lattice};
use crate::periodic::PeriodicFlags;


/// The slack above the tightest contact within which pairs are retained by [`find_short_dist`].
pub const SHORT_DISTANCE_SLACK: f64 = 1e-3;

// ================
// Enum definitions
// ================

/// An enumerated type for the source of pairwise tolerances used by [`check_images`].
#[derive(Clone, Copy)]
pub enum ImageTolerance<'a> {
    /// Tolerances looked up per species pair.
    Lookup(&'a dyn ToleranceLookup),

    /// A single tolerance overriding all species pairs.
    Uniform(f64),
}

impl fmt::Debug for ImageTolerance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup(_) => write!(f, "ImageTolerance::Lookup(..)"),
            Self::Uniform(tol) => write!(f, "ImageTolerance::Uniform({tol})"),
        }
    }
}

// ======================================
// Struct definitions and implementations
// ======================================

/// The graph of the tightest contacts within a point set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityGraph {
    /// The retained pairs $`(i, j, d_{ij})`$ with $`i < j`$, in row-major order.
    pub pairs: Vec<(usize, usize, f64)>,

    /// For each point, the indices of the points it is connected to.
    pub adjacency: Vec<Vec<usize>>,
}

impl ConnectivityGraph {
    /// Creates a graph on `n` points with no edges.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            pairs: vec![],
            adjacency: vec![vec![]; n],
        }
    }

    /// Checks if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the number of points in the graph.
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.adjacency.len()
    }
}

impl fmt::Display for ConnectivityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pairs.is_empty() {
            return writeln!(f, "No short contacts.");
        }
        for (i, j, d) in self.pairs.iter() {
            writeln!(f, "{i:>5} ── {j:<5} {d:>12.6}")?;
        }
        Ok(())
    }
}

// =========
// Functions
// =========

/// Builds the matrix of species-pair tolerances for two label lists.
fn tolerance_matrix<S1, S2, T>(labels1: &[S1], labels2: &[S2], tolerances: &T) -> Array2<f64>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    T: ToleranceLookup + ?Sized,
{
    Array2::from_shape_fn((labels1.len(), labels2.len()), |(i, j)| {
        tolerances.get_tolerance(labels1[i].as_ref(), labels2[j].as_ref())
    })
}

/// Checks that no point of one set lies too close to any point of another set.
///
/// Only cross-set pairs are checked. Distances within either set are ignored.
///
/// # Arguments
///
/// * `coords1` - The fractional positions of the first set.
/// * `labels1` - The species labels of the first set.
/// * `coords2` - The fractional positions of the second set.
/// * `labels2` - The species labels of the second set.
/// * `lattice` - The unit cell lattice.
/// * `flags` - The periodicity flags.
/// * `tolerances` - The species-pair tolerance lookup.
/// * `scale` - A factor multiplying every tolerance. Larger values require points to be
/// farther apart.
///
/// # Returns
///
/// `true` if no cross-set distance falls below its scaled tolerance, which includes the case of
/// an empty set.
///
/// # Errors
///
/// Errors if the numbers of labels and positions differ in either set.
#[allow(clippy::too_many_arguments)]
pub fn check_distance<S1, S2, T>(
    coords1: &[Point3<f64>],
    labels1: &[S1],
    coords2: &[Point3<f64>],
    labels2: &[S2],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    tolerances: &T,
    scale: f64,
) -> Result<bool, anyhow::Error>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    T: ToleranceLookup + ?Sized,
{
    ensure!(
        coords1.len() == labels1.len(),
        "Mismatched numbers of positions ({}) and labels ({}) in the first set.",
        coords1.len(),
        labels1.len()
    );
    ensure!(
        coords2.len() == labels2.len(),
        "Mismatched numbers of positions ({}) and labels ({}) in the second set.",
        coords2.len(),
        labels2.len()
    );
    if coords1.is_empty() || coords2.is_empty() {
        return Ok(true);
    }

    let tols = tolerance_matrix(labels1, labels2, tolerances);
    let dm = distance_matrix(coords1, coords2, lattice, flags, DistanceMetric::Euclidean);
    Ok(Zip::from(&dm)
        .and(&tols)
        .all(|&d, &tol| d >= tol * scale))
}

/// Checks every pair of points in a set against a covalent-radius-based tolerance.
///
/// Each unordered pair $`(i, j)`$ with $`i < j`$ is checked once using the minimum-image
/// distance of $`\mathbf{r}_j - \mathbf{r}_i`$, against the tolerance
/// $`\mathrm{factor} \cdot \tfrac{1}{2}(r_i + r_j)`$ where $`r`$ are covalent radii. The search
/// stops at the first violation.
///
/// # Returns
///
/// `true` if no pair is too close.
///
/// # Errors
///
/// Errors if the numbers of labels and positions differ, or if a label does not identify an
/// element with a known covalent radius.
pub fn verify_distances<S: AsRef<str>>(
    points: &[Point3<f64>],
    labels: &[S],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    factor: f64,
) -> Result<bool, anyhow::Error> {
    ensure!(
        points.len() == labels.len(),
        "Mismatched numbers of positions ({}) and labels ({}).",
        points.len(),
        labels.len()
    );
    let radii = labels
        .iter()
        .map(|label| {
            covalent_radius(label.as_ref())
                .ok_or_else(|| format_err!("No covalent radius known for `{}`.", label.as_ref()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (i, (p1, r1)) in points.iter().zip(radii.iter()).enumerate() {
        for (p2, r2) in points.iter().zip(radii.iter()).skip(i + 1) {
            let d = min_image_norm(&(p2 - p1), lattice, flags);
            if d < factor * 0.5 * (r1 + r2) {
                log::debug!("Distance {d:.6} between sites too short.");
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Checks that a point set is not too close to its own periodic images.
///
/// All copies of the set translated by the non-zero lattice translations are built, ordered by
/// translation and then by point. A single direct distance matrix between the originals and all
/// copies is computed, and each column is compared against the tolerance of the original point
/// it was copied from.
///
/// # Arguments
///
/// * `points` - The fractional positions.
/// * `labels` - The species labels.
/// * `lattice` - The unit cell lattice.
/// * `flags` - The periodicity flags. If no axis is periodic, no images exist and the check
/// passes trivially.
/// * `tolerance` - Either a species-pair lookup or a single uniform tolerance.
/// * `scale` - A factor multiplying every tolerance.
///
/// # Returns
///
/// `true` if no image is too close.
///
/// # Errors
///
/// Errors if the numbers of labels and positions differ.
pub fn check_images<S: AsRef<str>>(
    points: &[Point3<f64>],
    labels: &[S],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    tolerance: ImageTolerance,
    scale: f64,
) -> Result<bool, anyhow::Error> {
    ensure!(
        points.len() == labels.len(),
        "Mismatched numbers of positions ({}) and labels ({}).",
        points.len(),
        labels.len()
    );
    if flags.is_aperiodic() || points.is_empty() {
        return Ok(true);
    }

    let images = flags
        .translations()
        .into_iter()
        .filter(|v| v.iter().any(|x| *x != 0.0))
        .flat_map(|v| points.iter().map(move |p| p + v))
        .collect::<Vec<_>>();
    let dm = distance_matrix(
        points,
        &images,
        lattice,
        &PeriodicFlags::none(),
        DistanceMetric::Euclidean,
    );

    let n = points.len();
    let ok = match tolerance {
        ImageTolerance::Uniform(tol) => dm.iter().all(|&d| d >= tol * scale),
        ImageTolerance::Lookup(lookup) => {
            let tols = tolerance_matrix(labels, labels, lookup);
            dm.indexed_iter()
                .all(|((r, c), &d)| d >= tols[(r, c % n)] * scale)
        }
    };
    Ok(ok)
}

/// Finds the tightest contacts within a point set and builds their connectivity graph.
///
/// All pairs $`i < j`$ whose minimum-image distance does not exceed `tol` are collected, and
/// then only those within [`SHORT_DISTANCE_SLACK`] of the smallest such distance are kept. The
/// remaining pairs are therefore the closest cluster of contacts, not every contact below `tol`.
///
/// # Returns
///
/// The retained pairs and the adjacency lists. If no pair qualifies, the graph has no edges.
#[must_use]
pub fn find_short_dist(
    points: &[Point3<f64>],
    lattice: &Lattice,
    flags: &PeriodicFlags,
    tol: f64,
) -> ConnectivityGraph {
    let n = points.len();
    let dm = distance_matrix(points, points, lattice, flags, DistanceMetric::Euclidean);
    let candidates = dm
        .indexed_iter()
        .filter(|((i, j), &d)| i < j && d <= tol)
        .map(|((i, j), &d)| (i, j, d))
        .collect::<Vec<_>>();

    let Some(d_min) = candidates.iter().map(|(_, _, d)| *d).reduce(f64::min) else {
        return ConnectivityGraph::empty(n);
    };
    let pairs = candidates
        .into_iter()
        .filter(|(_, _, d)| *d <= d_min + SHORT_DISTANCE_SLACK)
        .collect::<Vec<_>>();

    let mut adjacency = vec![vec![]; n];
    pairs.iter().for_each(|(i, j, _)| {
        adjacency[*i].push(*j);
        adjacency[*j].push(*i);
    });
    ConnectivityGraph { pairs, adjacency }
}
