/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use approx::assert_relative_eq;
use ndarray::{Array2, Array3};
use num_complex::Complex64;
use polarixs_rs::rixs::{
    isotropic_rank2, isotropic_rank3, Filters, Geometry, Interference, PolarizationSetup,
    Projector, ResonanceSummator, RixsError, ScatteringAngles, ScatteringTensor, TensorAssembler,
};
use polarixs_rs::transitions::{Moment, TransitionRecord, TransitionTable};
use polarixs_rs::utils::matrix_from_rows;
use rstest::rstest;

/// Deterministic complex tensor without special symmetry
fn generic_rank2() -> Array2<Complex64> {
    Array2::from_shape_fn((3, 3), |(i, j)| {
        Complex64::new(
            1.0 + i as f64 - 0.5 * j as f64,
            0.3 * (i * j) as f64 - 0.2 * j as f64,
        )
    })
}

#[rstest]
#[case(45.0, 0.0, None, 0.0)]
#[case(0.0, 0.0, None, 1.0)]
#[case(45.0, 90.0, None, 1.0)]
#[case(0.0, 0.0, Some(0.0), 1.0)]
#[case(45.0, 0.0, Some(0.0), 0.0)]
#[case(45.0, 90.0, Some(90.0), 1.0)]
#[case(30.0, 0.0, None, 0.25)]
fn test_dipole_dependence(
    #[case] theta: f64,
    #[case] phi_in: f64,
    #[case] phi_out: Option<f64>,
    #[case] expected: f64,
) {
    let angles = ScatteringAngles::new(theta, phi_in, phi_out);
    assert_relative_eq!(angles.dipole_dependence(), expected, epsilon = 1e-12);
}

#[rstest]
#[case(45.0, 0.0, None, 1.0)]
#[case(45.0, 90.0, None, 2.0)]
#[case(0.0, 90.0, None, 1.0)]
#[case(45.0, 0.0, Some(0.0), 2.0)]
#[case(0.0, 0.0, Some(0.0), 2.0)]
#[case(45.0, 90.0, Some(90.0), 2.0)]
fn test_quadrupole_dependence(
    #[case] theta: f64,
    #[case] phi_in: f64,
    #[case] phi_out: Option<f64>,
    #[case] expected: f64,
) {
    let angles = ScatteringAngles::new(theta, phi_in, phi_out);
    assert_relative_eq!(angles.quadrupole_dependence(), expected, epsilon = 1e-12);
}

#[test]
fn test_reciprocity_of_isotropic_average() {
    let s = generic_rank2();
    let adjoint = s.t().mapv(|z| z.conj());
    let transpose = s.t().to_owned();

    for dependence in [0.0, 0.3, 1.0] {
        let direct = isotropic_rank2(&s, dependence);
        assert_relative_eq!(isotropic_rank2(&adjoint, dependence), direct, epsilon = 1e-12);
        assert_relative_eq!(isotropic_rank2(&transpose, dependence), direct, epsilon = 1e-12);
    }
}

#[test]
fn test_isotropic_dipole_intensity_is_non_negative() {
    let s = generic_rank2();
    for theta in [0.0, 15.0, 30.0, 45.0, 60.0, 90.0] {
        for phi_in in [0.0, 30.0, 90.0] {
            let angles = ScatteringAngles::new(theta, phi_in, None);
            assert!(isotropic_rank2(&s, angles.dipole_dependence()) >= -1e-12);
        }
    }
}

#[test]
fn test_unpolarized_sum_matches_average_over_phi_out() {
    // Summing both analyzer polarizations reproduces the unresolved average
    let s = generic_rank2();
    for theta in [10.0, 35.0, 70.0] {
        let unresolved = ScatteringAngles::new(theta, 20.0, None);
        let parallel = ScatteringAngles::new(theta, 20.0, Some(0.0));
        let perpendicular = ScatteringAngles::new(theta, 20.0, Some(90.0));
        assert_relative_eq!(
            parallel.dipole_dependence() + perpendicular.dipole_dependence(),
            unresolved.dipole_dependence(),
            epsilon = 1e-12
        );
        let a = isotropic_rank2(&s, 0.0);
        assert_relative_eq!(
            isotropic_rank2(&s, parallel.dipole_dependence())
                + isotropic_rank2(&s, perpendicular.dipole_dependence())
                - a,
            isotropic_rank2(&s, unresolved.dipole_dependence()),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_lab_vectors_are_transverse() {
    for theta in [0.0_f64, 22.5, 45.0, 67.5, 90.0] {
        for phi in [0.0_f64, 45.0, 90.0] {
            let setup = ScatteringAngles::new(theta, phi, Some(phi))
                .polarization_setup()
                .unwrap();
            setup.validate().unwrap();
        }
    }
}

#[test]
fn test_malformed_geometries() {
    // Oriented projection needs the analyzer angle
    assert!(matches!(
        ScatteringAngles::new(45.0, 0.0, None).polarization_setup(),
        Err(RixsError::MalformedGeometry(_))
    ));

    let not_transverse = PolarizationSetup {
        e_in: [0.0, 1.0, 0.0],
        e_out: [1.0, 0.0, 0.0],
        k_in: [0.0, 1.0, 0.0],
        k_out: [0.0, 0.0, 1.0],
    };
    assert!(matches!(
        Projector::new(&Geometry::Oriented(not_transverse)),
        Err(RixsError::MalformedGeometry(_))
    ));

    let not_unit = PolarizationSetup {
        e_in: [2.0, 0.0, 0.0],
        e_out: [1.0, 0.0, 0.0],
        k_in: [0.0, 1.0, 0.0],
        k_out: [0.0, 0.0, 1.0],
    };
    assert!(Projector::new(&Geometry::Oriented(not_unit)).is_err());

    assert!(Projector::new(&Geometry::Isotropic(ScatteringAngles::new(f64::NAN, 0.0, None)))
        .is_err());

    let projector = Projector::new(&Geometry::default()).unwrap();
    assert!(matches!(
        projector.project_tensor(&ScatteringTensor::Scalar(1.0)),
        Err(RixsError::MalformedGeometry(_))
    ));
}

#[test]
fn test_geometry_json() {
    let geometry: Geometry =
        serde_json::from_str(r#"{"kind": "isotropic", "theta": 30.0, "phi_in": 0.0}"#).unwrap();
    assert_eq!(
        geometry,
        Geometry::Isotropic(ScatteringAngles::new(30.0, 0.0, None))
    );
    assert!(!geometry.is_oriented());

    let oriented = Geometry::oriented_from_angles(&ScatteringAngles::new(45.0, 0.0, Some(0.0)))
        .unwrap();
    let text = serde_json::to_string(&oriented).unwrap();
    let parsed: Geometry = serde_json::from_str(&text).unwrap();
    assert!(parsed.is_oriented());
}

#[test]
fn test_rank3_single_component() {
    let mut s = Array3::<Complex64>::zeros((3, 3, 3));
    s[(0, 0, 0)] = Complex64::new(0.0, -1.0);

    assert_relative_eq!(isotropic_rank3(&s, 1.0), 16.0 / 210.0, epsilon = 1e-14);
    assert_relative_eq!(isotropic_rank3(&s, 2.0), 36.0 / 210.0, epsilon = 1e-14);
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn conj(v: [Complex64; 3]) -> [Complex64; 3] {
    v.map(|z| z.conj())
}

/// Isotropic intensity of the `(1, 4)` channel at every incident energy
fn filtered_intensities(
    absorption: &[[Complex64; 3]; 2],
    emission: &[[Complex64; 3]; 2],
    filters: Filters,
    angles: ScatteringAngles,
) -> Vec<f64> {
    let absorption = TransitionTable::new(vec![
        TransitionRecord::new(10.0, Moment::Dipole(absorption[0]), 1, 2),
        TransitionRecord::new(11.5, Moment::Dipole(absorption[1]), 1, 3),
    ])
    .unwrap();
    let emission = TransitionTable::new(vec![
        TransitionRecord::new(2.0, Moment::Dipole(emission[0]), 2, 4),
        TransitionRecord::new(3.5, Moment::Dipole(emission[1]), 3, 4),
    ])
    .unwrap();

    let mut assembler = TensorAssembler::new();
    assembler.set_filters(filters);
    let map = assembler.assemble(&absorption, &emission).unwrap();
    let summator = ResonanceSummator::new(&map, 0.4, Interference::Coherent).unwrap();
    let projector = Projector::new(&Geometry::Isotropic(angles)).unwrap();

    [9.0, 10.0, 10.7, 11.5, 12.0]
        .iter()
        .map(|&wi| {
            let sums = summator.sum_at(wi).unwrap();
            projector.project(&sums[0].amplitude).unwrap()
        })
        .collect()
}

#[test]
fn test_swapping_filters_and_legs_keeps_intensity() {
    let a = [
        [c(1.0, 0.2), c(-0.3, 0.0), c(0.5, -0.4)],
        [c(0.0, 0.7), c(0.9, 0.1), c(-0.2, 0.3)],
    ];
    let b = [
        [c(0.4, -0.1), c(0.8, 0.5), c(0.0, 0.2)],
        [c(-0.6, 0.0), c(0.1, -0.9), c(0.3, 0.3)],
    ];
    let f1 = matrix_from_rows([[1.0, 0.2, 0.0], [0.0, 0.5, -0.3], [0.4, 0.0, 0.8]]);
    let f2 = matrix_from_rows([[0.3, 0.0, 0.0], [0.6, 1.0, 0.0], [0.0, -0.2, 0.7]]);

    // Swapped process: conjugated emission legs absorb, conjugated absorption legs emit
    let swapped_in = [conj(b[0]), conj(b[1])];
    let swapped_out = [conj(a[0]), conj(a[1])];

    for angles in [
        ScatteringAngles::new(45.0, 0.0, None),
        ScatteringAngles::new(20.0, 35.0, None),
        ScatteringAngles::new(60.0, 10.0, Some(70.0)),
    ] {
        let direct =
            filtered_intensities(&a, &b, Filters::dipole(f1.clone(), f2.clone()), angles);
        let swapped = filtered_intensities(
            &swapped_in,
            &swapped_out,
            Filters::dipole(f2.clone(), f1.clone()),
            angles,
        );
        for (d, s) in direct.iter().zip(&swapped) {
            assert!(*d > 0.0);
            assert_relative_eq!(*d, *s, max_relative = 1e-12);
        }
    }
}

