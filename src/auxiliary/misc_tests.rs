use nalgebra::{Matrix3, Vector3};

use crate::auxiliary::misc::{all_close, clean_zero, is_close};

#[test]
fn test_misc_is_close() {
    assert!(is_close(1.0, 1.0 + 1e-9, 1e-8, 0.0));
    assert!(!is_close(1.0, 1.1, 1e-3, 1e-3));
    assert!(is_close(0.0f32, 1e-4, 0.0, 1e-3));

    // The relative scale comes from the second argument.
    assert!(is_close(0.0, 1.0, 1.0, 0.0));
    assert!(!is_close(1.0, 0.0, 1.0, 0.0));
}

#[test]
fn test_misc_all_close() {
    let a = Matrix3::<f64>::identity();
    let b = a + Matrix3::from_element(1e-6);
    assert!(all_close(&a, &b, 1e-3, 1e-3));
    assert!(!all_close(&a, &(a * 2.0), 1e-3, 1e-3));
    assert!(all_close(
        &Vector3::new(1.0, 2.0, 3.0),
        &Vector3::new(1.0, 2.0, 3.0001),
        1e-3,
        0.0
    ));
}

#[test]
fn test_misc_clean_zero() {
    assert_eq!(clean_zero(-1e-12, 1e-8).to_string(), "0");
    assert_eq!(clean_zero(-0.5, 1e-8), -0.5);
    assert_eq!(format!("{:.3}", clean_zero(-1e-9f64, 1e-8)), "0.000");
}
