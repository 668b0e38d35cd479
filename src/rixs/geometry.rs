/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Geometry projection
//!
//! Reduces the net scattering tensor of a channel to a real intensity. Two
//! conventions are supported:
//!
//! * isotropic orientational average (plane-wave treatment), a closed-form
//!   combination of the independent self-contractions of the tensor weighted
//!   by an angular factor of the scattering geometry;
//! * fixed molecular orientation (semiclassical treatment), where the tensor
//!   is already expressed in the lab frame and is weighted element-wise by a
//!   polarization tensor built from the photon polarization and wavevector
//!   directions.
//!
//! Angles are in degrees. `theta` is half of the scattering angle: the incident
//! and scattered wavevectors enclose `2θ`.

use super::errors::{Result, RixsError};
use super::resonance::NetAmplitude;
use super::tensor::{ScatteringTensor, WeightTensor};
use crate::utils::constants::{DEFAULT_THETA, GEOMETRY_TOLERANCE};
use ndarray::{Array2, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Scattering and polarization angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatteringAngles {
    /// Half scattering angle θ
    pub theta: f64,
    /// Incident polarization angle
    #[serde(default)]
    pub phi_in: f64,
    /// Scattered polarization angle; `None` leaves the scattered beam unanalysed
    #[serde(default)]
    pub phi_out: Option<f64>,
}

impl Default for ScatteringAngles {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            phi_in: 0.0,
            phi_out: None,
        }
    }
}

impl ScatteringAngles {
    pub fn new(theta: f64, phi_in: f64, phi_out: Option<f64>) -> Self {
        Self {
            theta,
            phi_in,
            phi_out,
        }
    }

    fn validate(&self) -> Result<()> {
        let finite = self.theta.is_finite()
            && self.phi_in.is_finite()
            && self.phi_out.map_or(true, f64::is_finite);
        if !finite {
            return Err(RixsError::MalformedGeometry(format!(
                "angles must be finite: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Angular factor of the isotropic dipole-dipole average
    pub fn dipole_dependence(&self) -> f64 {
        let two_theta = (2.0 * self.theta).to_radians();
        let phi_in = self.phi_in.to_radians();
        match self.phi_out {
            None => two_theta.cos().powi(2) * phi_in.cos().powi(2) + phi_in.sin().powi(2),
            Some(phi_out) => {
                let phi_out = phi_out.to_radians();
                (two_theta.cos() * phi_in.cos() * phi_out.cos() + phi_in.sin() * phi_out.sin())
                    .powi(2)
            }
        }
    }

    /// Angular factor of the isotropic quadrupole-dipole average
    pub fn quadrupole_dependence(&self) -> f64 {
        let two_theta = (2.0 * self.theta).to_radians();
        let phi_in = self.phi_in.to_radians();
        match self.phi_out {
            None => two_theta.sin().powi(2) * phi_in.sin().powi(2) + 1.0,
            Some(phi_out) => {
                let phi_out = phi_out.to_radians();
                2.0 * (two_theta.cos() * phi_in.cos() * phi_out.cos()
                    + phi_in.sin() * phi_out.sin())
                .powi(2)
                    + 2.0 * two_theta.sin().powi(2) * phi_out.cos().powi(2)
            }
        }
    }

    /// Lab-frame polarization and wavevector directions for these angles
    ///
    /// The incident beam travels along −y and is polarized in the xz plane;
    /// the scattered beam leaves at `2θ` from it in the yz plane.
    pub fn polarization_setup(&self) -> Result<PolarizationSetup> {
        self.validate()?;
        let phi_out = self.phi_out.ok_or_else(|| {
            RixsError::MalformedGeometry(
                "a fixed orientation needs the scattered polarization angle phi_out".to_string(),
            )
        })?;

        let two_theta = (2.0 * self.theta).to_radians();
        let phi_in = self.phi_in.to_radians();
        let phi_out = phi_out.to_radians();

        Ok(PolarizationSetup {
            e_in: [phi_in.sin(), 0.0, phi_in.cos()],
            e_out: [
                phi_out.sin(),
                -two_theta.sin() * phi_out.cos(),
                -two_theta.cos() * phi_out.cos(),
            ],
            k_in: [0.0, -1.0, 0.0],
            k_out: [0.0, -two_theta.cos(), two_theta.sin()],
        })
    }
}

/// Unit polarization and propagation directions of both photons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarizationSetup {
    pub e_in: [f64; 3],
    pub e_out: [f64; 3],
    pub k_in: [f64; 3],
    pub k_out: [f64; 3],
}

impl PolarizationSetup {
    /// Check unit length and transversality of both photons
    pub fn validate(&self) -> Result<()> {
        let vectors = [
            ("e_in", self.e_in),
            ("e_out", self.e_out),
            ("k_in", self.k_in),
            ("k_out", self.k_out),
        ];
        for (name, v) in vectors {
            if v.iter().any(|x| !x.is_finite()) {
                return Err(RixsError::MalformedGeometry(format!(
                    "{} has non-finite components",
                    name
                )));
            }
            let norm = dot(&v, &v).sqrt();
            if (norm - 1.0).abs() > GEOMETRY_TOLERANCE {
                return Err(RixsError::MalformedGeometry(format!(
                    "{} must be a unit vector, |{}| = {:.6}",
                    name, name, norm
                )));
            }
        }
        if dot(&self.e_in, &self.k_in).abs() > GEOMETRY_TOLERANCE {
            return Err(RixsError::MalformedGeometry(
                "incident polarization is not transverse to k_in".to_string(),
            ));
        }
        if dot(&self.e_out, &self.k_out).abs() > GEOMETRY_TOLERANCE {
            return Err(RixsError::MalformedGeometry(
                "scattered polarization is not transverse to k_out".to_string(),
            ));
        }
        Ok(())
    }

    /// `V_ij = e_in_i e_out_j`
    pub fn dipole_weights(&self) -> Array2<f64> {
        Array2::from_shape_fn((3, 3), |(i, j)| self.e_in[i] * self.e_out[j])
    }

    /// `V_ijk = e_in_i k_in_j e_out_k`; the quadrupole couples to the incident
    /// polarization and propagation direction, the dipole to the scattered
    /// polarization
    pub fn quadrupole_weights(&self) -> Array3<f64> {
        Array3::from_shape_fn((3, 3, 3), |(i, j, k)| {
            self.e_in[i] * self.k_in[j] * self.e_out[k]
        })
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Projection convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Orientational average over randomly oriented molecules
    Isotropic(ScatteringAngles),
    /// Fixed molecular orientation with explicit photon directions
    Oriented(PolarizationSetup),
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::Isotropic(ScatteringAngles::default())
    }
}

impl Geometry {
    /// Fixed orientation with directions derived from scattering angles
    pub fn oriented_from_angles(angles: &ScatteringAngles) -> Result<Self> {
        Ok(Geometry::Oriented(angles.polarization_setup()?))
    }

    pub fn is_oriented(&self) -> bool {
        matches!(self, Geometry::Oriented(_))
    }
}

/// Independent self-contractions `(T1, T2, T3)` of a rank-2 tensor
///
/// `T1 = Σ S*_ij S_ij`, `T2 = Σ S*_ii S_jj`, `T3 = Σ S*_ij S_ji`
pub fn rank2_invariants(s: &Array2<Complex64>) -> [f64; 3] {
    let mut t1 = 0.0;
    let mut t3 = Complex64::new(0.0, 0.0);
    for i in 0..3 {
        for j in 0..3 {
            t1 += s[(i, j)].norm_sqr();
            t3 += s[(i, j)].conj() * s[(j, i)];
        }
    }
    let trace: Complex64 = (0..3).map(|i| s[(i, i)]).sum();
    [t1, trace.norm_sqr(), t3.re]
}

/// Independent self-contractions `(T1, T2, T3)` of a rank-3 tensor
///
/// `T1 = Σ S*_ijk S_ijk`, `T2 = Σ S*_ijk S_ikj`, `T3 = Σ S*_ijj S_ikk`
pub fn rank3_invariants(s: &Array3<Complex64>) -> [f64; 3] {
    let mut t1 = 0.0;
    let mut t2 = Complex64::new(0.0, 0.0);
    let mut t3 = 0.0;
    for i in 0..3 {
        let mut partial_trace = Complex64::new(0.0, 0.0);
        for j in 0..3 {
            partial_trace += s[(i, j, j)];
            for k in 0..3 {
                t1 += s[(i, j, k)].norm_sqr();
                t2 += s[(i, j, k)].conj() * s[(i, k, j)];
            }
        }
        t3 += partial_trace.norm_sqr();
    }
    [t1, t2.re, t3]
}

/// Isotropic dipole-dipole intensity `A + B·dep/2`
pub fn isotropic_rank2(s: &Array2<Complex64>, dependence: f64) -> f64 {
    let [t1, t2, t3] = rank2_invariants(s);
    let a = (4.0 * t1 - t2 - t3) / 30.0;
    let b = (-2.0 * t1 + 3.0 * t2 + 3.0 * t3) / 30.0;
    a + 0.5 * b * dependence
}

/// Isotropic quadrupole-dipole intensity `A + B·dep`
pub fn isotropic_rank3(s: &Array3<Complex64>, dependence: f64) -> f64 {
    let [t1, t2, t3] = rank3_invariants(s);
    let a = (16.0 * t1 - 10.0 * t2 - 10.0 * t3) / 210.0;
    let b = (-10.0 * t1 + 15.0 * t2 + 15.0 * t3) / 210.0;
    a + b * dependence
}

/// Reduces net amplitudes to intensities for one fixed geometry
#[derive(Debug, Clone)]
pub struct Projector {
    geometry: Geometry,
    dipole_dependence: f64,
    quadrupole_dependence: f64,
    dipole_weights: Option<WeightTensor>,
    quadrupole_weights: Option<WeightTensor>,
}

impl Projector {
    /// Validate the geometry and precompute its angular factors
    pub fn new(geometry: &Geometry) -> Result<Self> {
        match geometry {
            Geometry::Isotropic(angles) => {
                angles.validate()?;
                Ok(Self {
                    geometry: *geometry,
                    dipole_dependence: angles.dipole_dependence(),
                    quadrupole_dependence: angles.quadrupole_dependence(),
                    dipole_weights: None,
                    quadrupole_weights: None,
                })
            }
            Geometry::Oriented(setup) => {
                setup.validate()?;
                Ok(Self {
                    geometry: *geometry,
                    dipole_dependence: 0.0,
                    quadrupole_dependence: 0.0,
                    dipole_weights: Some(WeightTensor::Rank2(setup.dipole_weights())),
                    quadrupole_weights: Some(WeightTensor::Rank3(setup.quadrupole_weights())),
                })
            }
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Intensity of one net amplitude
    pub fn project(&self, amplitude: &NetAmplitude) -> Result<f64> {
        match amplitude {
            NetAmplitude::Intensity(intensity) => Ok(*intensity),
            NetAmplitude::Tensor(tensor) => self.project_tensor(tensor),
        }
    }

    /// Intensity of a coherent tensor sum
    pub fn project_tensor(&self, tensor: &ScatteringTensor) -> Result<f64> {
        match (&self.geometry, tensor) {
            (_, ScatteringTensor::Scalar(_)) => Err(RixsError::MalformedGeometry(
                "scalar tensors carry no polarization information".to_string(),
            )),
            (Geometry::Isotropic(_), ScatteringTensor::Rank2(s)) => {
                Ok(isotropic_rank2(s, self.dipole_dependence))
            }
            (Geometry::Isotropic(_), ScatteringTensor::Rank3(s)) => {
                Ok(isotropic_rank3(s, self.quadrupole_dependence))
            }
            (Geometry::Oriented(_), ScatteringTensor::Rank2(_)) => self
                .dipole_weights
                .as_ref()
                .and_then(|v| tensor.weighted_squared_norm(v))
                .ok_or_else(|| {
                    RixsError::MalformedGeometry("missing dipole polarization tensor".to_string())
                }),
            (Geometry::Oriented(_), ScatteringTensor::Rank3(_)) => self
                .quadrupole_weights
                .as_ref()
                .and_then(|v| tensor.weighted_squared_norm(v))
                .ok_or_else(|| {
                    RixsError::MalformedGeometry(
                        "missing quadrupole polarization tensor".to_string(),
                    )
                }),
        }
    }
}
