//! Geometrical objects and manipulations.

use std::f64::consts::PI;

use approx;
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, UnitVector3, Vector3};
use rand::Rng;

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;

/// Threshold below which the squared norm of a rotation vector is taken to vanish.
pub const ROTATION_VECTOR_SQNORM_THRESHOLD: f64 = 1e-6;

/// Returns a $`3 \times 3`$ rotation matrix in $`\mathbb{R}^3`$ corresponding to a rotation
/// through `angle` about `axis`.
///
/// The axis does not need to be normalised.
///
/// # Arguments
///
/// * `axis` - The axis of rotation.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The rotation matrix.
#[must_use]
pub fn axis_angle_matrix(axis: &Vector3<f64>, angle: f64) -> Matrix3<f64> {
    let normalised_axis = UnitVector3::new_normalize(*axis);
    Rotation3::from_axis_angle(&normalised_axis, angle).into_inner()
}

/// Returns a random rotation matrix.
///
/// The axis is drawn uniformly from the unit cube $`[0, 1)^3`$ and the angle uniformly from
/// $`[0, 2\pi)`$.
///
/// # Arguments
///
/// * `rng` - A random number generator.
///
/// # Returns
///
/// The rotation matrix.
pub fn random_rotation_matrix<R: Rng + ?Sized>(rng: &mut R) -> Matrix3<f64> {
    let axis = loop {
        let trial = Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
        if trial.norm() > f64::EPSILON {
            break trial;
        }
    };
    let angle = rng.gen::<f64>() * 2.0 * PI;
    axis_angle_matrix(&axis, angle)
}

/// Returns the angle between two vectors in the range $`[0, \pi]`$, or `None` if either vector
/// has zero length.
///
/// Cosines within $`10^{-8}`$ of $`\pm 1`$ give exactly $`0`$ or $`\pi`$.
#[must_use]
pub fn angle_between(vec1: &Vector3<f64>, vec2: &Vector3<f64>) -> Option<f64> {
    let norms = vec1.norm() * vec2.norm();
    if norms <= 0.0 {
        return None;
    }
    let cos = vec1.dot(vec2) / norms;
    let angle = if approx::abs_diff_eq!(cos, 1.0, epsilon = 1e-8) {
        0.0
    } else if approx::abs_diff_eq!(cos, -1.0, epsilon = 1e-8) {
        PI
    } else {
        cos.clamp(-1.0, 1.0).acos()
    };
    Some(angle)
}

/// Returns a rotation matrix that takes the direction of `vec1` onto the direction of `vec2`.
///
/// The rotation axis is perpendicular to both vectors. For anti-parallel vectors, the rotation
/// is a half turn about an axis perpendicular to `vec1`.
///
/// # Arguments
///
/// * `vec1` - The starting direction.
/// * `vec2` - The target direction.
///
/// # Returns
///
/// The rotation matrix.
#[must_use]
pub fn rotation_between(vec1: &Vector3<f64>, vec2: &Vector3<f64>) -> Matrix3<f64> {
    let u1 = vec1.normalize();
    let u2 = vec2.normalize();
    let dot = u1.dot(&u2);
    if approx::relative_eq!(dot, 1.0, max_relative = 1e-4) {
        Matrix3::identity()
    } else if approx::relative_eq!(dot, -1.0, max_relative = 1e-4) {
        // Cross with the Cartesian axis least aligned with u1 for a stable perpendicular.
        let least_aligned = [Vector3::x(), Vector3::y(), Vector3::z()]
            .into_iter()
            .min_by(|a, b| u1.dot(a).abs().total_cmp(&u1.dot(b).abs()))
            .unwrap_or_else(Vector3::x);
        axis_angle_matrix(&u1.cross(&least_aligned), PI)
    } else {
        Rotation3::rotation_between(&u1, &u2)
            .map(|rot| rot.into_inner())
            .unwrap_or_else(|| {
                let angle = angle_between(&u1, &u2).unwrap_or(0.0);
                axis_angle_matrix(&u1.cross(&u2), angle)
            })
    }
}

/// Checks if a $`3 \times 3`$ matrix is orthogonal.
///
/// Both $`\mathbf{M}\mathbf{M}^{\mathsf{T}}`$ and $`\mathbf{M}^{\mathsf{T}}\mathbf{M}`$ must
/// deviate from the identity by at most `tol` in every element.
#[must_use]
pub fn is_orthogonal(mat: &Matrix3<f64>, tol: f64) -> bool {
    let identity = Matrix3::<f64>::identity();
    let m1 = mat * mat.transpose();
    let m2 = mat.transpose() * mat;
    (m1 - identity).iter().all(|x| x.abs() <= tol)
        && (m2 - identity).iter().all(|x| x.abs() <= tol)
}

/// Extracts the rotation vector (axis scaled by angle) of a proper rotation matrix.
///
/// The matrix is first replaced by its closest orthogonal matrix $`\mathbf{U}\mathbf{V}^{\mathsf{T}}`$
/// from its singular value decomposition, so small deviations from orthogonality are tolerated.
/// The angle lies in $`[0, \pi]`$ and is recovered through a unit quaternion, which remains
/// well-conditioned for half turns.
///
/// # Arguments
///
/// * `mat` - A matrix with positive determinant.
///
/// # Returns
///
/// The rotation vector. This is the zero vector for the identity.
#[must_use]
pub fn rotation_vector(mat: &Matrix3<f64>) -> Vector3<f64> {
    let svd = mat.svd(true, true);
    let closest = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => u * v_t,
        _ => *mat,
    };
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(closest)).scaled_axis()
}
