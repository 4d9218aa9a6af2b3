//! Application of rigid motions to points and projection of points onto the invariant
//! subspaces of motions.

use anyhow::{self, ensure};
use nalgebra::{Point3, Vector3};

use crate::periodic::distance::Lattice;
use crate::periodic::{PeriodicFlags, PeriodicFold};
use crate::symmetry::rigid_motion::RigidMotion;

#[cfg(test)]
#[path = "projection_tests.rs"]
mod projection_tests;

/// Squared norms of linear-part columns below this threshold are treated as collapsed
/// directions.
const COLLAPSED_COLUMN_THRESHOLD: f64 = 1e-8;

/// Applies every motion in a list to a single point.
///
/// # Returns
///
/// The images of the point, one per motion, in the order of the motions.
#[must_use]
pub fn apply(point: &Point3<f64>, motions: &[RigidMotion]) -> Vec<Point3<f64>> {
    motions.iter().map(|motion| motion.operate(point)).collect()
}

/// Applies the $`i`$-th motion to the $`i`$-th point.
///
/// # Errors
///
/// Errors if the numbers of points and motions differ.
pub fn apply_paired(
    points: &[Point3<f64>],
    motions: &[RigidMotion],
) -> Result<Vec<Point3<f64>>, anyhow::Error> {
    ensure!(
        points.len() == motions.len(),
        "Mismatched numbers of points ({}) and motions ({}).",
        points.len(),
        motions.len()
    );
    Ok(points
        .iter()
        .zip(motions.iter())
        .map(|(point, motion)| motion.operate(point))
        .collect())
}

/// Projects a point onto the invariant subspace of a motion without any periodicity.
///
/// The point is shifted by minus the translation, projected onto each column of the linear
/// part scaled by that column's squared norm, the contributions are summed, and the translation
/// is added back. Columns with vanishing norms correspond to collapsed directions and are
/// skipped.
fn project_direct(point: &Point3<f64>, motion: &RigidMotion) -> Point3<f64> {
    let translation = motion.translation();
    let shifted = point.coords - translation;
    let projected = motion
        .linear_part()
        .column_iter()
        .filter_map(|b| {
            let b_sq = b.norm_squared();
            (b_sq > COLLAPSED_COLUMN_THRESHOLD).then(|| b * (shifted.dot(&b) / b_sq))
        })
        .fold(Vector3::zeros(), |acc, v| acc + v);
    Point3::from(projected + translation)
}

/// Projects a point onto the invariant subspace of a motion, such as the axis, plane or point
/// of a special position.
///
/// Without periodicity, this is a direct projection. With periodicity, the point is folded into
/// the canonical cell and projected onto every copy of the motion whose translation is shifted
/// by a neighbouring lattice translation. The projection closest to the folded point, measured
/// in Cartesian space without further periodic images, is kept and folded back into the
/// canonical cell. Ties are resolved in favour of the translation enumerated first.
///
/// # Arguments
///
/// * `point` - The fractional position to project.
/// * `motion` - The motion whose invariant subspace is targeted.
/// * `lattice` - The unit cell lattice used to measure distances.
/// * `flags` - The periodicity flags.
///
/// # Returns
///
/// The projected fractional position.
#[must_use]
pub fn project(
    point: &Point3<f64>,
    motion: &RigidMotion,
    lattice: &Lattice,
    flags: &PeriodicFlags,
) -> Point3<f64> {
    if flags.is_aperiodic() {
        return project_direct(point, motion);
    }
    let folded = point.fold_into_cell(flags);
    let (nearest, _) = flags
        .translations()
        .iter()
        .map(|v| {
            let candidate = project_direct(&folded, &motion.shifted(v));
            let d = lattice.to_cartesian(&(candidate - folded)).norm();
            (candidate, d)
        })
        .fold(
            (folded, f64::INFINITY),
            |(best, best_d), (candidate, d)| {
                if d < best_d {
                    (candidate, d)
                } else {
                    (best, best_d)
                }
            },
        );
    nearest.fold_into_cell(flags)
}
