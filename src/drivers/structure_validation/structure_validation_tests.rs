use approx::assert_relative_eq;
use nalgebra::Point3;

use crate::drivers::structure_validation::{
    Site, Structure, StructureValidationDriver, StructureValidationParams,
};
use crate::drivers::LatsymDriver;
use crate::periodic::distance::Lattice;
use crate::periodic::PeriodicFlags;

fn rock_salt_pair() -> Structure {
    Structure {
        lattice: Lattice::cubic(5.64),
        periodicity: PeriodicFlags::full(),
        sites: vec![
            Site::new("Na", Point3::new(0.0, 0.0, 0.0)),
            Site::new("Cl", Point3::new(0.5, 0.0, 0.0)),
        ],
    }
}

#[test]
fn test_drivers_structure_validation_valid() {
    let structure = rock_salt_pair();
    let params = StructureValidationParams::builder()
        .short_distance_tolerance(3.0)
        .write_distance_matrix(true)
        .build()
        .unwrap();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    let sv_res = sv_driver.result().unwrap();
    assert!(sv_res.distances_valid);
    assert!(sv_res.images_valid);
    assert!(sv_res.is_valid());
    assert_relative_eq!(sv_res.min_distance.unwrap(), 2.82, epsilon = 1e-10);
    assert_eq!(sv_res.distance_matrix.dim(), (2, 2));
    assert_relative_eq!(sv_res.distance_matrix[(0, 0)], 0.0, epsilon = 1e-12);
    assert_eq!(sv_res.short_contacts.pairs.len(), 1);
    assert_eq!(
        (sv_res.short_contacts.pairs[0].0, sv_res.short_contacts.pairs[0].1),
        (0, 1)
    );
    assert_eq!(sv_res.short_contacts.adjacency, vec![vec![1], vec![0]]);

    let text = sv_res.to_string();
    assert!(text.contains("Structure valid: yes"));
    assert!(text.contains("Minimum-image distance matrix"));
}

#[test]
fn test_drivers_structure_validation_close_pair() {
    let structure = Structure {
        lattice: Lattice::cubic(5.0),
        periodicity: PeriodicFlags::full(),
        sites: vec![
            Site::new("C", Point3::new(0.0, 0.0, 0.0)),
            Site::new("6", Point3::new(0.1, 0.0, 0.0)),
        ],
    };
    let params = StructureValidationParams::builder()
        .short_distance_tolerance(0.6)
        .build()
        .unwrap();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    let sv_res = sv_driver.result().unwrap();
    assert!(!sv_res.distances_valid);
    assert!(sv_res.images_valid);
    assert!(!sv_res.is_valid());
    assert_relative_eq!(sv_res.min_distance.unwrap(), 0.5, epsilon = 1e-10);
    assert!(!sv_res.short_contacts.is_empty());
    assert!(!sv_res.to_string().contains("Minimum-image distance matrix"));

    // A looser factor lets the same pair through.
    let params = StructureValidationParams::builder()
        .covalent_radius_factor(0.5)
        .build()
        .unwrap();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    assert!(sv_driver.result().unwrap().distances_valid);
}

#[test]
fn test_drivers_structure_validation_images() {
    let mut structure = Structure {
        lattice: Lattice::cubic(1.0),
        periodicity: PeriodicFlags::full(),
        sites: vec![Site::new("H", Point3::new(0.5, 0.5, 0.5))],
    };
    let params = StructureValidationParams::default();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    let sv_res = sv_driver.result().unwrap();
    assert!(sv_res.images_valid);
    assert!(sv_res.min_distance.is_none());

    let params = StructureValidationParams::builder()
        .image_tolerance(Some(1.5))
        .build()
        .unwrap();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    assert!(!sv_driver.result().unwrap().images_valid);

    structure.periodicity = PeriodicFlags::none();
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    assert!(sv_driver.result().unwrap().images_valid);
}

#[test]
fn test_drivers_structure_validation_errors() {
    let params = StructureValidationParams::default();
    let empty = Structure {
        lattice: Lattice::cubic(3.0),
        periodicity: PeriodicFlags::full(),
        sites: vec![],
    };
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&empty)
        .build()
        .unwrap();
    assert!(sv_driver.result().is_err());
    assert!(sv_driver.run().is_err());

    let unknown = Structure {
        lattice: Lattice::cubic(3.0),
        periodicity: PeriodicFlags::full(),
        sites: vec![
            Site::new("Xx", Point3::new(0.0, 0.0, 0.0)),
            Site::new("C", Point3::new(0.5, 0.5, 0.5)),
        ],
    };
    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&unknown)
        .build()
        .unwrap();
    assert!(sv_driver.run().is_err());
}

#[test]
fn test_drivers_structure_validation_yaml() {
    let yaml = "\
lattice:
  - [4.0, 0.0, 0.0]
  - [0.0, 4.0, 0.0]
  - [0.0, 0.0, 20.0]
periodicity: [1, 1, 0]
sites:
  - species: Si
    position: [0.0, 0.0, 0.5]
  - species: O
    position: [0.5, 0.5, 0.5]
";
    let structure: Structure = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(structure.periodicity, PeriodicFlags::new(true, true, false));
    assert_eq!(structure.labels(), vec!["Si", "O"]);
    assert_relative_eq!(structure.positions()[1], Point3::new(0.5, 0.5, 0.5));

    let params: StructureValidationParams = serde_yaml::from_str("tolerance_scale: 0.5").unwrap();
    assert_relative_eq!(params.tolerance_scale, 0.5);
    assert_relative_eq!(params.covalent_radius_factor, 1.0);
    assert_relative_eq!(params.short_distance_tolerance, 0.5);
    assert_eq!(params.verbosity, 1);
    assert!(params.image_tolerance.is_none());

    let mut sv_driver = StructureValidationDriver::builder()
        .parameters(&params)
        .structure(&structure)
        .build()
        .unwrap();
    sv_driver.run().unwrap();
    let sv_res = sv_driver.result().unwrap();
    assert!(sv_res.is_valid());
    assert_relative_eq!(sv_res.min_distance.unwrap(), 8.0f64.sqrt(), epsilon = 1e-10);
}
