/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Utility functions for spectrum calculations
//!
//! This module provides common numerics shared by the transition tables and the
//! RIXS engine: line shapes, simple statistics and small 3x3 helpers.

pub mod errors;
pub mod math;

pub use errors::{Result, UtilsError};
pub use math::{lorentzian, mean, population_variance, trapezoid};

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Numerical constants used throughout the crate
pub mod constants {
    /// Default intermediate- and final-state broadening in eV
    pub const DEFAULT_GAMMA: f64 = 2.0;

    /// Largest accepted variance (eV²) of the per-path Raman losses of one channel
    pub const ENERGY_VARIANCE_TOLERANCE: f64 = 1e-8;

    /// Tolerance for unit-length and transversality checks on polarization vectors
    pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

    /// Default scattering half-angle θ in degrees
    pub const DEFAULT_THETA: f64 = 45.0;
}

/// 3x3 identity, the default polarization filter
pub fn identity3() -> Array2<f64> {
    Array2::eye(3)
}

/// Promote a real matrix to a complex one
pub fn complexify(matrix: &Array2<f64>) -> Array2<Complex64> {
    matrix.mapv(|x| Complex64::new(x, 0.0))
}

/// Apply a real 3x3 matrix to a complex 3-vector
pub fn real_matvec(matrix: &Array2<f64>, vector: &Array1<Complex64>) -> Array1<Complex64> {
    complexify(matrix).dot(vector)
}

/// Check that a matrix is 3x3 with finite entries
pub fn check_matrix3(matrix: &Array2<f64>, name: &str) -> Result<()> {
    if matrix.dim() != (3, 3) {
        return Err(UtilsError::Shape(format!(
            "{} must be 3x3, got {}x{}",
            name,
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    if matrix.iter().any(|x| !x.is_finite()) {
        return Err(UtilsError::Math(format!("{} has non-finite entries", name)));
    }
    Ok(())
}

/// Convert a row-major nested array into an ndarray matrix
pub fn matrix_from_rows(rows: [[f64; 3]; 3]) -> Array2<f64> {
    Array2::from_shape_fn((3, 3), |(i, j)| rows[i][j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_real_matvec() {
        let m = matrix_from_rows([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 2.0]]);
        let v = array![
            Complex64::new(1.0, 1.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(0.0, -1.0)
        ];
        let out = real_matvec(&m, &v);

        assert_relative_eq!(out[0].re, 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[1].im, 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[2].im, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_check_matrix3() {
        assert!(check_matrix3(&identity3(), "filter").is_ok());
        assert!(check_matrix3(&Array2::zeros((2, 3)), "filter").is_err());

        let mut bad = identity3();
        bad[(1, 1)] = f64::NAN;
        assert!(check_matrix3(&bad, "filter").is_err());
    }
}
