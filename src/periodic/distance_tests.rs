use approx::assert_relative_eq;
use itertools::iproduct;
use nalgebra::{Matrix3, Point3, Vector3};
use proptest::prelude::*;

use crate::periodic::distance::{
    distance_matrix, min_image_norm, min_pairwise_distance, DistanceMetric, Lattice,
};
use crate::periodic::{PeriodicFlags, PeriodicFold};

fn skewed_lattice() -> Lattice {
    Lattice::from_vectors(
        &Vector3::new(4.0, 0.0, 0.0),
        &Vector3::new(1.0, 5.0, 0.0),
        &Vector3::new(0.5, 0.8, 6.0),
    )
}

fn brute_force_min_image(d: &Vector3<f64>, lattice: &Lattice, flags: &PeriodicFlags) -> f64 {
    let range = |axis: usize| -> Vec<f64> {
        if flags.is_periodic(axis) {
            (-4..=4).map(f64::from).collect()
        } else {
            vec![0.0]
        }
    };
    iproduct!(range(0), range(1), range(2))
        .map(|(i, j, k)| lattice.to_cartesian(&(d + Vector3::new(i, j, k))).norm())
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_distance_min_image_across_boundary() {
    let lattice = Lattice::cubic(10.0);
    let flags = PeriodicFlags::full();
    let d = min_image_norm(&Vector3::new(0.99, 0.0, 0.0), &lattice, &flags);
    assert_relative_eq!(d, 0.1, epsilon = 1e-10);

    let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.99, 0.0, 0.0)];
    let dm = distance_matrix(&points, &points, &lattice, &flags, DistanceMetric::Euclidean);
    assert_relative_eq!(dm[[0, 1]], 0.1, epsilon = 1e-10);
    assert_relative_eq!(dm[[1, 0]], 0.1, epsilon = 1e-10);
    assert_eq!(dm[[0, 0]], 0.0);

    let aperiodic = distance_matrix(
        &points,
        &points,
        &lattice,
        &PeriodicFlags::none(),
        DistanceMetric::Euclidean,
    );
    assert_relative_eq!(aperiodic[[0, 1]], 9.9, epsilon = 1e-10);
}

#[test]
fn test_distance_min_image_partial_periodicity() {
    let lattice = Lattice::cubic(10.0);
    let flags = PeriodicFlags::new(false, true, true);
    let d = Vector3::new(0.99, 0.95, 0.0);
    assert_relative_eq!(
        min_image_norm(&d, &lattice, &flags),
        (9.9f64.powi(2) + 0.5f64.powi(2)).sqrt(),
        epsilon = 1e-10
    );
}

#[test]
fn test_distance_min_image_skewed_lattice() {
    let lattice = skewed_lattice();
    let flags = PeriodicFlags::full();
    for d in [
        Vector3::new(0.45, -0.3, 0.8),
        Vector3::new(1.7, 0.2, -2.4),
        Vector3::new(0.0, 0.5, 0.5),
    ] {
        assert_relative_eq!(
            min_image_norm(&d, &lattice, &flags),
            brute_force_min_image(&d, &lattice, &flags),
            epsilon = 1e-10
        );
    }
}

#[test]
fn test_distance_matrix_aperiodic_is_direct() {
    let lattice = skewed_lattice();
    let points1 = vec![Point3::new(0.1, 0.2, 0.3), Point3::new(1.5, -0.4, 0.0)];
    let points2 = vec![
        Point3::new(0.9, 0.9, 0.9),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(-0.2, 0.3, 2.0),
    ];
    let dm = distance_matrix(
        &points1,
        &points2,
        &lattice,
        &PeriodicFlags::none(),
        DistanceMetric::Euclidean,
    );
    assert_eq!(dm.shape(), &[2, 3]);
    for (i, p1) in points1.iter().enumerate() {
        for (j, p2) in points2.iter().enumerate() {
            let expected = (lattice.to_cartesian(&p1.coords) - lattice.to_cartesian(&p2.coords)).norm();
            assert_relative_eq!(dm[[i, j]], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_distance_matrix_identity_lattice() {
    let points1 = vec![Point3::new(0.05, 0.5, 0.5)];
    let points2 = vec![Point3::new(0.95, 0.5, 0.5), Point3::new(0.5, 0.5, 0.5)];
    let dm = distance_matrix(
        &points1,
        &points2,
        &Lattice::identity(),
        &PeriodicFlags::full(),
        DistanceMetric::Euclidean,
    );
    assert_relative_eq!(dm[[0, 0]], 0.1, epsilon = 1e-12);
    assert_relative_eq!(dm[[0, 1]], 0.45, epsilon = 1e-12);

    let explicit = Lattice::new(Matrix3::identity() * 2.0);
    let dm2 = distance_matrix(
        &points1,
        &points2,
        &explicit,
        &PeriodicFlags::full(),
        DistanceMetric::Euclidean,
    );
    assert_relative_eq!(dm2[[0, 0]], 0.2, epsilon = 1e-12);
}

#[test]
fn test_distance_matrix_metrics() {
    let points1 = vec![Point3::new(0.0, 0.0, 0.0)];
    let points2 = vec![Point3::new(0.3, 0.4, 0.0)];
    let lattice = Lattice::identity();
    let flags = PeriodicFlags::none();
    let d = |metric| distance_matrix(&points1, &points2, &lattice, &flags, metric)[[0, 0]];
    assert_relative_eq!(d(DistanceMetric::Euclidean), 0.5, epsilon = 1e-12);
    assert_relative_eq!(d(DistanceMetric::SquaredEuclidean), 0.25, epsilon = 1e-12);
    assert_relative_eq!(d(DistanceMetric::Cityblock), 0.7, epsilon = 1e-12);
    assert_relative_eq!(d(DistanceMetric::Chebyshev), 0.4, epsilon = 1e-12);
    assert_relative_eq!(d(DistanceMetric::Minkowski(2.0)), 0.5, epsilon = 1e-12);
    assert_relative_eq!(d(DistanceMetric::Minkowski(1.0)), 0.7, epsilon = 1e-12);
}

#[test]
fn test_distance_min_pairwise() {
    let lattice = skewed_lattice();
    let flags = PeriodicFlags::new(true, true, false);
    let points1 = vec![Point3::new(0.1, 0.2, 0.3), Point3::new(0.8, 0.9, 0.1)];
    let points2 = vec![Point3::new(0.95, 0.15, 0.25), Point3::new(0.5, 0.5, 0.9)];
    let dm = distance_matrix(&points1, &points2, &lattice, &flags, DistanceMetric::Euclidean);
    let expected = dm.iter().copied().fold(f64::INFINITY, f64::min);
    let dmin = min_pairwise_distance(&points1, &points2, &lattice, &flags, DistanceMetric::Euclidean);
    assert_eq!(dmin, Some(expected));

    assert_eq!(
        min_pairwise_distance(&[], &points2, &lattice, &flags, DistanceMetric::Euclidean),
        None
    );
    let empty = distance_matrix(&[], &points2, &lattice, &flags, DistanceMetric::Euclidean);
    assert_eq!(empty.shape(), &[0, 2]);
}

#[test]
fn test_lattice_from_parameters() {
    let cubic = Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0);
    assert_relative_eq!(*cubic.matrix(), Matrix3::identity() * 3.0, epsilon = 1e-12);
    assert_relative_eq!(cubic.volume(), 27.0, epsilon = 1e-10);

    let hexagonal = Lattice::from_parameters(2.0, 2.0, 5.0, 90.0, 90.0, 120.0);
    let b = hexagonal.matrix().row(1).transpose();
    assert_relative_eq!(b.norm(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(hexagonal.volume(), 2.0 * 2.0 * 5.0 * (3.0f64).sqrt() / 2.0, epsilon = 1e-10);
}

#[test]
fn test_lattice_serde_rows() {
    let lattice: Lattice = serde_yaml::from_str("[[1.0, 0.0, 0.0], [0.5, 2.0, 0.0], [0.0, 0.0, 3.0]]")
        .unwrap();
    assert_relative_eq!(
        lattice.to_cartesian(&Vector3::new(0.0, 1.0, 0.0)),
        Vector3::new(0.5, 2.0, 0.0)
    );
}

#[test]
fn test_distance_min_image_nearest_shell_only() {
    // Only offsets in {-1, 0, 1} are searched. A large non-periodic component on a skewed
    // lattice can put the true minimum image two cells away along b.
    let lattice = skewed_lattice();
    let flags = PeriodicFlags::new(false, true, false);
    let d = Vector3::new(1.163, 0.964, 2.485);
    let nearest_shell = min_image_norm(&d, &lattice, &flags);
    let wide = brute_force_min_image(&d, &lattice, &flags);
    assert!(wide < nearest_shell - 0.1);

    let next_cell = lattice
        .to_cartesian(&(d + Vector3::new(0.0, -2.0, 0.0)))
        .norm();
    assert_relative_eq!(wide, next_cell, epsilon = 1e-12);
}

proptest! {
    #[test]
    fn test_distance_min_image_not_above_folded(
        x in -3.0f64..3.0,
        y in -3.0f64..3.0,
        z in -3.0f64..3.0,
        pa in any::<bool>(),
        pb in any::<bool>(),
        pc in any::<bool>(),
    ) {
        let lattice = skewed_lattice();
        let flags = PeriodicFlags::new(pa, pb, pc);
        let d = Vector3::new(x, y, z);
        let direct = min_image_norm(&d, &lattice, &flags);
        let folded = min_image_norm(&d.fold_into_cell(&flags), &lattice, &flags);
        prop_assert!(direct <= folded + 1e-12);
        prop_assert!((direct - folded).abs() < 1e-10);
    }

    #[test]
    fn test_distance_min_image_matches_wide_search_inside_cell(
        x in 0.0f64..1.0,
        y in 0.0f64..1.0,
        z in 0.0f64..1.0,
        pa in any::<bool>(),
        pb in any::<bool>(),
        pc in any::<bool>(),
    ) {
        let lattice = skewed_lattice();
        let flags = PeriodicFlags::new(pa, pb, pc);
        let d = Vector3::new(x, y, z);
        prop_assert!(
            (min_image_norm(&d, &lattice, &flags) - brute_force_min_image(&d, &lattice, &flags))
                .abs()
                < 1e-10
        );
    }

    #[test]
    fn test_distance_matrix_swap_symmetry(
        coords in proptest::collection::vec(-1.5f64..1.5, 12),
        pa in any::<bool>(),
        pb in any::<bool>(),
    ) {
        let lattice = skewed_lattice();
        let flags = PeriodicFlags::new(pa, pb, true);
        let a = vec![
            Point3::new(coords[0], coords[1], coords[2]),
            Point3::new(coords[3], coords[4], coords[5]),
        ];
        let b = vec![
            Point3::new(coords[6], coords[7], coords[8]),
            Point3::new(coords[9], coords[10], coords[11]),
        ];
        let dab = distance_matrix(&a, &b, &lattice, &flags, DistanceMetric::Euclidean);
        let dba = distance_matrix(&b, &a, &lattice, &flags, DistanceMetric::Euclidean);
        for i in 0..2 {
            for j in 0..2 {
                prop_assert!((dab[[i, j]] - dba[[j, i]]).abs() < 1e-10);
            }
        }
    }
}
