/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Line shapes and small statistics helpers

use super::errors::{Result, UtilsError};
use std::f64::consts::PI;

/// Calculate Lorentzian function for broadening spectral features
///
/// The line shape is normalized to unit area.
///
/// # Arguments
///
/// * `x` - The x-coordinate at which to evaluate the Lorentzian
/// * `x0` - The center of the Lorentzian peak
/// * `gamma` - The half-width at half-maximum (HWHM) of the peak
///
/// # Returns
///
/// The value of the Lorentzian function at x
pub fn lorentzian(x: f64, x0: f64, gamma: f64) -> f64 {
    let numerator = gamma;
    let denominator = PI * (gamma * gamma + (x - x0) * (x - x0));
    numerator / denominator
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by N), `None` for an empty slice
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Trapezoidal integration of sampled data
pub fn trapezoid(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(UtilsError::Generic(
            "Number of abscissae must match number of ordinates".to_string(),
        ));
    }
    if x.len() < 2 {
        return Err(UtilsError::Generic(
            "At least two points are required for integration".to_string(),
        ));
    }

    let area = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum();

    Ok(area)
}
