use approx::assert_relative_eq;
use nalgebra::Point3;

use crate::drivers::operation_analysis::{
    MotionSpec, OperationAnalysisDriver, OperationAnalysisParams,
};
use crate::drivers::LatsymDriver;
use crate::periodic::distance::Lattice;
use crate::periodic::PeriodicFlags;
use crate::symmetry::operation_analysis::{OperationOrder, OperationType};
use crate::symmetry::rigid_motion::RigidMotion;

fn motions(xyzs: &[&str]) -> Vec<RigidMotion> {
    xyzs.iter()
        .map(|xyz| RigidMotion::from_xyz_string(xyz).unwrap())
        .collect()
}

#[test]
fn test_drivers_operation_analysis_hexagonal_set() {
    let ops = motions(&[
        "x, y, z",
        "-y, x-y, z",
        "-x+y, -x, z",
        "-x, -y, -z",
        "x, y, z+1",
        "y, -x+y, -z",
    ]);
    let params = OperationAnalysisParams::builder()
        .write_inverses(true)
        .build()
        .unwrap();
    let mut oa_driver = OperationAnalysisDriver::builder()
        .parameters(&params)
        .motions(&ops)
        .build()
        .unwrap();
    oa_driver.run().unwrap();
    let oa_res = oa_driver.result().unwrap();

    // The fractional linear parts of a hexagonal cell are not orthogonal.
    assert_eq!(oa_res.analyses[0].operation_type(), OperationType::Identity);
    assert_eq!(oa_res.analyses[1].operation_type(), OperationType::General);
    assert_eq!(oa_res.analyses[3].operation_type(), OperationType::Inversion);
    assert_eq!(oa_res.indices_of_type(OperationType::General), vec![1, 2, 5]);

    assert_eq!(oa_res.duplicates, vec![(0, 4)]);
    assert_eq!(
        oa_res.conjugacy_classes,
        vec![vec![0, 4], vec![1], vec![2], vec![3], vec![5]]
    );

    let inverses = oa_res.inverses.as_ref().unwrap();
    assert_eq!(inverses.len(), 6);
    assert_eq!(inverses[1].as_xyz_string(), "-x+y, -x, z");
    assert!(oa_res.projections.is_none());
}

#[test]
fn test_drivers_operation_analysis_cubic_set() {
    let ops = motions(&[
        "-y, x, z",
        "y, -x, z",
        "-x, -y, z",
        "z, x, y",
        "-z, -x, -y",
        "x, y, -z",
        "-x, y, z",
        "-x, -y, z+1/2",
    ]);
    let params = OperationAnalysisParams::default();
    let mut oa_driver = OperationAnalysisDriver::builder()
        .parameters(&params)
        .motions(&ops)
        .build()
        .unwrap();
    oa_driver.run().unwrap();
    let oa_res = oa_driver.result().unwrap();

    assert_eq!(oa_res.analyses[0].order(), Some(OperationOrder::Finite(4)));
    assert_eq!(oa_res.analyses[3].order(), Some(OperationOrder::Finite(3)));
    assert_eq!(oa_res.analyses[4].order(), Some(OperationOrder::Finite(6)));
    assert_eq!(oa_res.analyses[5].order(), Some(OperationOrder::Finite(2)));
    assert_eq!(
        oa_res.conjugacy_classes,
        vec![vec![0, 1], vec![2, 7], vec![3], vec![4], vec![5, 6]]
    );
    assert!(oa_res.duplicates.is_empty());
    assert!(oa_res.inverses.is_none());

    let text = oa_res.to_string();
    assert!(text.contains("Conjugacy classes"));
    assert!(text.contains("rotoinversion"));
    assert!(!text.contains("Inverse operations"));
}

#[test]
fn test_drivers_operation_analysis_periodicity_and_projection() {
    let ops = motions(&["x, x, 1/4", "x, y, z+1/2", "x, y, z-1/2"]);
    let params = OperationAnalysisParams::builder()
        .projection_point(Some(Point3::new(0.3, 0.1, 0.7)))
        .build()
        .unwrap();

    let mut oa_driver = OperationAnalysisDriver::builder()
        .parameters(&params)
        .motions(&ops)
        .periodicity(PeriodicFlags::none())
        .build()
        .unwrap();
    oa_driver.run().unwrap();
    let oa_res = oa_driver.result().unwrap();
    assert!(oa_res.duplicates.is_empty());
    let projections = oa_res.projections.as_ref().unwrap();
    assert_relative_eq!(projections[0], Point3::new(0.2, 0.2, 0.25), epsilon = 1e-12);

    let mut oa_driver = OperationAnalysisDriver::builder()
        .parameters(&params)
        .motions(&ops)
        .lattice(Lattice::cubic(5.0))
        .build()
        .unwrap();
    oa_driver.run().unwrap();
    let oa_res = oa_driver.result().unwrap();
    assert_eq!(oa_res.duplicates, vec![(1, 2)]);
    assert_eq!(oa_res.projections.as_ref().unwrap().len(), 3);
    assert!(oa_res.to_string().contains("Projections onto invariant subspaces"));
}

#[test]
fn test_drivers_operation_analysis_errors() {
    let params = OperationAnalysisParams::builder()
        .write_inverses(true)
        .build()
        .unwrap();
    let ops = motions(&["x, y, 0"]);
    let mut oa_driver = OperationAnalysisDriver::builder()
        .parameters(&params)
        .motions(&ops)
        .build()
        .unwrap();
    assert!(oa_driver.result().is_err());
    assert!(oa_driver.run().is_err());
}

#[test]
fn test_drivers_operation_analysis_motion_spec() {
    let specs: Vec<MotionSpec> = serde_yaml::from_str(
        "\
- \"-y, x, z+1/4\"
- [[0, -1, 0], [1, 0, 0], [0, 0, 1]]
- [[0, -1, 0, 0], [1, 0, 0, 0], [0, 0, 1, 0.25], [0, 0, 0, 1]]
- rotation: [[0, -1, 0], [1, 0, 0], [0, 0, 1]]
  translation: [0, 0, 0.25]
",
    )
    .unwrap();
    assert!(matches!(specs[0], MotionSpec::Xyz(_)));
    assert!(matches!(specs[1], MotionSpec::Rows(_)));
    assert!(matches!(specs[3], MotionSpec::RotationTranslation { .. }));

    let motions = specs
        .iter()
        .map(|spec| spec.to_motion().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(motions[0], motions[2]);
    assert_eq!(motions[0], motions[3]);
    assert_eq!(motions[1].as_xyz_string(), "-y, x, z");

    assert!(MotionSpec::Xyz("x, y".to_string()).to_motion().is_err());
    assert!(MotionSpec::Rows(vec![vec![1.0, 0.0]]).to_motion().is_err());

    let params: OperationAnalysisParams =
        serde_yaml::from_str("projection_point: [0.1, 0.2, 0.3]").unwrap();
    assert_relative_eq!(params.equality_threshold, 1e-3);
    assert!(!params.write_inverses);
    assert_relative_eq!(params.projection_point.unwrap(), Point3::new(0.1, 0.2, 0.3));
}
