use std::f64::consts::PI;

use approx::assert_relative_eq;
use nalgebra::{Matrix3, Vector3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::auxiliary::geometry::{
    angle_between, axis_angle_matrix, is_orthogonal, random_rotation_matrix, rotation_between,
    rotation_vector,
};

#[test]
fn test_geometry_axis_angle_matrix() {
    let c4z = axis_angle_matrix(&Vector3::new(0.0, 0.0, 2.0), PI / 2.0);
    let expected = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(c4z, expected, epsilon = 1e-14);
    assert_relative_eq!(c4z * Vector3::x(), Vector3::y(), epsilon = 1e-14);
}

#[test]
fn test_geometry_angle_between() {
    assert_relative_eq!(
        angle_between(&Vector3::x(), &Vector3::y()).unwrap(),
        PI / 2.0
    );
    assert_eq!(angle_between(&Vector3::x(), &(Vector3::x() * 3.0)), Some(0.0));
    assert_eq!(angle_between(&Vector3::x(), &-Vector3::x()), Some(PI));
    assert_relative_eq!(
        angle_between(&Vector3::new(1.0, 1.0, 0.0), &Vector3::x()).unwrap(),
        PI / 4.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_geometry_angle_between_null_vector() {
    assert!(angle_between(&Vector3::zeros(), &Vector3::x()).is_none());
    assert!(angle_between(&Vector3::y(), &Vector3::zeros()).is_none());
}

#[test]
fn test_geometry_rotation_between() {
    let v1 = Vector3::new(1.0, 2.0, 3.0);
    let v2 = Vector3::new(-2.0, 0.5, 1.0);
    let rot = rotation_between(&v1, &v2);
    assert!(is_orthogonal(&rot, 1e-10));
    assert_relative_eq!(rot * v1.normalize(), v2.normalize(), epsilon = 1e-10);

    assert_eq!(rotation_between(&v1, &(v1 * 2.0)), Matrix3::identity());

    let anti = rotation_between(&v1, &-v1);
    assert!(is_orthogonal(&anti, 1e-10));
    assert_relative_eq!(anti * v1.normalize(), -v1.normalize(), epsilon = 1e-10);
}

#[test]
fn test_geometry_is_orthogonal() {
    assert!(is_orthogonal(&Matrix3::identity(), 1e-3));
    assert!(is_orthogonal(&-Matrix3::<f64>::identity(), 1e-3));
    assert!(!is_orthogonal(&(Matrix3::<f64>::identity() * 2.0), 1e-3));
    let shear = Matrix3::new(1.0, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
    assert!(!is_orthogonal(&shear, 1e-3));
}

#[test]
fn test_geometry_rotation_vector() {
    assert!(rotation_vector(&Matrix3::identity()).norm() < 1e-6);

    let axis = Vector3::new(1.0, -1.0, 2.0).normalize();
    let rotvec = rotation_vector(&axis_angle_matrix(&axis, PI / 3.0));
    assert_relative_eq!(rotvec.norm(), PI / 3.0, epsilon = 1e-10);
    assert_relative_eq!(rotvec.normalize(), axis, epsilon = 1e-10);

    // Half turns must not collapse to the identity.
    let rotvec = rotation_vector(&axis_angle_matrix(&Vector3::z(), PI));
    assert_relative_eq!(rotvec.norm(), PI, epsilon = 1e-10);
    assert_relative_eq!(rotvec.normalize().z.abs(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_geometry_random_rotation_matrix() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let rot = random_rotation_matrix(&mut rng);
        assert!(is_orthogonal(&rot, 1e-10));
        assert_relative_eq!(rot.determinant(), 1.0, epsilon = 1e-10);
    }
}

proptest! {
    #[test]
    fn test_geometry_axis_angle_matrix_is_orthogonal(
        x in -1.0f64..1.0,
        y in -1.0f64..1.0,
        z in -1.0f64..1.0,
        angle in -10.0f64..10.0,
    ) {
        let axis = Vector3::new(x, y, z);
        prop_assume!(axis.norm() > 1e-6);
        prop_assert!(is_orthogonal(&axis_angle_matrix(&axis, angle), 1e-3));
    }
}
