/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use approx::assert_relative_eq;
use polarixs_rs::rixs::{calculate_absorption, RixsError};
use polarixs_rs::transitions::{Moment, TransitionRecord, TransitionTable};
use polarixs_rs::utils::{lorentzian, trapezoid};
use rstest::rstest;
use std::f64::consts::PI;

fn strengths(lines: &[(f64, f64)]) -> TransitionTable {
    TransitionTable::new(
        lines
            .iter()
            .enumerate()
            .map(|(i, &(energy, strength))| {
                TransitionRecord::new(energy, Moment::Scalar(strength), 1, i + 2)
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_single_line_peak() {
    let spectrum = calculate_absorption(&[5.0], &strengths(&[(5.0, 1.0)]), 1.0).unwrap();
    assert_relative_eq!(spectrum.intensity[0], 1.0 / PI, epsilon = 1e-12);
}

#[test]
fn test_lines_add_linearly() {
    let table = strengths(&[(5.0, 1.0), (7.0, 0.5)]);
    let energies: Vec<f64> = (0..121).map(|i| 3.0 + 0.05 * i as f64).collect();
    let spectrum = calculate_absorption(&energies, &table, 0.3).unwrap();

    for (e, value) in energies.iter().zip(&spectrum.intensity) {
        let expected = lorentzian(*e, 5.0, 0.3) + 0.5 * lorentzian(*e, 7.0, 0.3);
        assert_relative_eq!(*value, expected, epsilon = 1e-12);
    }
    let (peak_energy, _) = spectrum.peak().unwrap();
    assert_relative_eq!(peak_energy, 5.0, epsilon = 1e-9);
}

#[rstest]
#[case(0.5)]
#[case(1.0)]
#[case(2.0)]
fn test_lorentzian_normalization(#[case] gamma: f64) {
    let step = gamma / 20.0;
    let n = (4000.0 * gamma / step) as usize + 1;
    let x: Vec<f64> = (0..n).map(|i| -2000.0 * gamma + i as f64 * step).collect();
    let y: Vec<f64> = x.iter().map(|&xi| lorentzian(xi, 0.0, gamma)).collect();

    let area = trapezoid(&x, &y).unwrap();
    assert_relative_eq!(area, 1.0, epsilon = 1e-3);
}

#[test]
fn test_integrated_intensity_recovers_strengths() {
    let table = TransitionTable::new(vec![
        TransitionRecord::new(0.0, Moment::Scalar(1.0), 1, 2),
        TransitionRecord::new(4.0, Moment::Scalar(0.5), 1, 3),
    ])
    .unwrap();
    let energies: Vec<f64> = (0..400_001).map(|i| -2000.0 + 0.01 * i as f64).collect();
    let spectrum = calculate_absorption(&energies, &table, 0.5).unwrap();

    // Unit-area lines: the area is the summed oscillator strength minus the clipped tails
    assert_relative_eq!(spectrum.integrated_intensity().unwrap(), 1.5, epsilon = 1e-3);

    let single = calculate_absorption(&[0.0], &table, 0.5).unwrap();
    assert_eq!(single.integrated_intensity(), None);
}

#[test]
fn test_absorption_failures() {
    let empty = TransitionTable::new(Vec::new()).unwrap();
    assert!(matches!(
        calculate_absorption(&[5.0], &empty, 1.0),
        Err(RixsError::MissingData(_))
    ));

    let dipoles = TransitionTable::new(vec![TransitionRecord::new(
        5.0,
        Moment::real_dipole(1.0, 0.0, 0.0),
        1,
        2,
    )])
    .unwrap();
    assert!(matches!(
        calculate_absorption(&[5.0], &dipoles, 1.0),
        Err(RixsError::IncompatibleMoments(_))
    ));

    assert!(matches!(
        calculate_absorption(&[5.0], &strengths(&[(5.0, 1.0)]), 0.0),
        Err(RixsError::InvalidParameter(_))
    ));
}
