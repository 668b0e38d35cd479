/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Scattering tensors
//!
//! A scattering tensor is the product of the absorption and emission moments
//! of one `(g, n, f)` path: rank 2 for dipole-dipole coupling, rank 3 for
//! quadrupole-dipole coupling. Scalar tensors carry the product of two
//! oscillator strengths and have no polarization structure.

use super::errors::{Result, RixsError};
use ndarray::{Array1, Array2, Array3, Zip};
use num_complex::Complex64;

/// Scattering tensor of one path, or a coherent sum of such tensors
#[derive(Debug, Clone, PartialEq)]
pub enum ScatteringTensor {
    /// Product of two oscillator strengths
    Scalar(f64),
    /// Dipole-dipole tensor `T_ij`
    Rank2(Array2<Complex64>),
    /// Quadrupole-dipole tensor `T_ijk`; `ij` are the quadrupole indices
    Rank3(Array3<Complex64>),
}

impl ScatteringTensor {
    /// Outer product of two 3-vectors
    pub fn dipole_dipole(incoming: &Array1<Complex64>, outgoing: &Array1<Complex64>) -> Self {
        ScatteringTensor::Rank2(Array2::from_shape_fn((3, 3), |(i, j)| {
            incoming[i] * outgoing[j]
        }))
    }

    /// Tensor product of a 3x3 matrix and a 3-vector
    pub fn quadrupole_dipole(
        incoming: &Array2<Complex64>,
        outgoing: &Array1<Complex64>,
    ) -> Self {
        ScatteringTensor::Rank3(Array3::from_shape_fn((3, 3, 3), |(i, j, k)| {
            incoming[(i, j)] * outgoing[k]
        }))
    }

    pub fn rank(&self) -> usize {
        match self {
            ScatteringTensor::Scalar(_) => 0,
            ScatteringTensor::Rank2(_) => 2,
            ScatteringTensor::Rank3(_) => 3,
        }
    }

    /// Zero tensor of the same rank
    pub fn zeros_like(&self) -> Self {
        match self {
            ScatteringTensor::Scalar(_) => ScatteringTensor::Scalar(0.0),
            ScatteringTensor::Rank2(t) => ScatteringTensor::Rank2(Array2::zeros(t.raw_dim())),
            ScatteringTensor::Rank3(t) => ScatteringTensor::Rank3(Array3::zeros(t.raw_dim())),
        }
    }

    /// `self += factor * other`
    pub fn add_scaled(&mut self, other: &ScatteringTensor, factor: Complex64) -> Result<()> {
        match (self, other) {
            (ScatteringTensor::Rank2(acc), ScatteringTensor::Rank2(t)) => {
                acc.scaled_add(factor, t);
                Ok(())
            }
            (ScatteringTensor::Rank3(acc), ScatteringTensor::Rank3(t)) => {
                acc.scaled_add(factor, t);
                Ok(())
            }
            (acc, t) => Err(RixsError::IncompatibleMoments(format!(
                "cannot accumulate a rank-{} tensor into a rank-{} amplitude",
                t.rank(),
                acc.rank()
            ))),
        }
    }

    /// Sum of squared component magnitudes
    pub fn squared_norm(&self) -> f64 {
        match self {
            ScatteringTensor::Scalar(s) => s * s,
            ScatteringTensor::Rank2(t) => t.iter().map(|z| z.norm_sqr()).sum(),
            ScatteringTensor::Rank3(t) => t.iter().map(|z| z.norm_sqr()).sum(),
        }
    }

    /// Weight of this path when intermediate states do not interfere
    ///
    /// Tensors contribute their mean squared component magnitude. A scalar
    /// tensor is already a product of intensities and contributes itself.
    pub fn incoherent_weight(&self) -> f64 {
        match self {
            ScatteringTensor::Scalar(s) => s.abs(),
            ScatteringTensor::Rank2(t) => self.squared_norm() / t.len() as f64,
            ScatteringTensor::Rank3(t) => self.squared_norm() / t.len() as f64,
        }
    }

    /// Element-wise product with a real weight tensor of the same shape,
    /// summed as squared magnitudes
    pub fn weighted_squared_norm(&self, weights: &WeightTensor) -> Option<f64> {
        match (self, weights) {
            (ScatteringTensor::Rank2(t), WeightTensor::Rank2(v)) => {
                let mut sum = 0.0;
                Zip::from(t).and(v).for_each(|z, &w| sum += (*z * w).norm_sqr());
                Some(sum)
            }
            (ScatteringTensor::Rank3(t), WeightTensor::Rank3(v)) => {
                let mut sum = 0.0;
                Zip::from(t).and(v).for_each(|z, &w| sum += (*z * w).norm_sqr());
                Some(sum)
            }
            _ => None,
        }
    }
}

/// Real polarization tensor used by fixed-orientation projections
#[derive(Debug, Clone, PartialEq)]
pub enum WeightTensor {
    Rank2(Array2<f64>),
    Rank3(Array3<f64>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_outer_products() {
        let a = array![c(1.0, 0.0), c(0.0, 2.0), c(0.0, 0.0)];
        let b = array![c(0.0, 0.0), c(3.0, 0.0), c(1.0, -1.0)];

        let ScatteringTensor::Rank2(t) = ScatteringTensor::dipole_dipole(&a, &b) else {
            panic!("expected rank 2");
        };
        assert_eq!(t[(0, 1)], c(3.0, 0.0));
        assert_eq!(t[(1, 2)], c(2.0, 2.0));

        let q = Array2::from_elem((3, 3), c(1.0, 0.0));
        let ScatteringTensor::Rank3(t3) = ScatteringTensor::quadrupole_dipole(&q, &b) else {
            panic!("expected rank 3");
        };
        assert_eq!(t3[(2, 0, 1)], c(3.0, 0.0));
        assert_eq!(t3[(0, 0, 0)], c(0.0, 0.0));
    }

    #[test]
    fn test_accumulation() {
        let a = array![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)];
        let t = ScatteringTensor::dipole_dipole(&a, &a);
        let mut acc = t.zeros_like();
        acc.add_scaled(&t, c(0.0, -1.0)).unwrap();
        acc.add_scaled(&t, c(2.0, 0.0)).unwrap();

        let ScatteringTensor::Rank2(sum) = &acc else {
            panic!("expected rank 2");
        };
        assert_eq!(sum[(0, 0)], c(2.0, -1.0));
        assert_relative_eq!(acc.squared_norm(), 5.0, epsilon = 1e-12);

        let mut scalar = ScatteringTensor::Scalar(0.0);
        assert!(scalar.add_scaled(&t, c(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_incoherent_weight() {
        let a = array![c(1.0, 0.0), c(1.0, 0.0), c(1.0, 0.0)];
        let t = ScatteringTensor::dipole_dipole(&a, &a);
        assert_relative_eq!(t.incoherent_weight(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            ScatteringTensor::Scalar(-0.5).incoherent_weight(),
            0.5,
            epsilon = 1e-12
        );
    }
}
