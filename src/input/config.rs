/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Job description
//!
//! A job file is JSON holding the transition tables, the energy grids and the
//! calculation parameters. Everything except the incident grid and the
//! absorption table has a default.

use super::errors::{InputError, Result};
use crate::rixs::{
    Filters, Frame, Geometry, Interference, PolarizationSetup, RixsError, RixsParameters,
    ScatteringAngles,
};
use crate::transitions::TransitionTable;
use crate::utils::constants::{DEFAULT_GAMMA, ENERGY_VARIANCE_TOLERANCE};
use crate::utils::matrix_from_rows;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of points a generated energy grid may hold
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Energy grid, either a closed range or explicit points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnergyGrid {
    /// `start, start + step, ...` up to and including `stop`
    Range { start: f64, stop: f64, step: f64 },
    /// Explicit energies
    Points(Vec<f64>),
}

impl EnergyGrid {
    /// Generate the grid points
    pub fn points(&self) -> Result<Vec<f64>> {
        match self {
            EnergyGrid::Range { start, stop, step } => {
                if !(*step > 0.0) {
                    return Err(InputError::InvalidGrid(
                        "Energy step must be positive".to_string(),
                    ));
                }
                if !start.is_finite() || !stop.is_finite() || stop < start {
                    return Err(InputError::InvalidGrid(format!(
                        "Invalid energy range {} .. {}",
                        start, stop
                    )));
                }
                // Tolerate rounding so that `stop` itself is included
                let intervals = ((stop - start) / step + 1e-9).floor();
                if !(intervals < MAX_GRID_POINTS as f64) {
                    return Err(InputError::InvalidGrid(format!(
                        "Energy range {} .. {} with step {} exceeds {} points",
                        start, stop, step, MAX_GRID_POINTS
                    )));
                }
                let count = intervals as usize + 1;
                Ok((0..count).map(|i| start + i as f64 * step).collect())
            }
            EnergyGrid::Points(points) => {
                if points.is_empty() {
                    return Err(InputError::InvalidGrid(
                        "Generated energy grid is empty".to_string(),
                    ));
                }
                Ok(points.clone())
            }
        }
    }
}

/// How the emission table lists its transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegOrientation {
    /// Records already run from the intermediate to the final state
    #[default]
    IntermediateToFinal,
    /// Records run from the lower to the upper state, as printed by the reader
    LowerToUpper,
}

fn identity_rows() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

fn default_gamma() -> f64 {
    DEFAULT_GAMMA
}

/// Polarization filters as row-major 3x3 arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default = "identity_rows")]
    pub incoming_left: [[f64; 3]; 3],
    #[serde(default = "identity_rows")]
    pub incoming_right: [[f64; 3]; 3],
    #[serde(default = "identity_rows")]
    pub outgoing: [[f64; 3]; 3],
}

impl From<&FilterSpec> for Filters {
    fn from(spec: &FilterSpec) -> Self {
        Filters {
            incoming_left: matrix_from_rows(spec.incoming_left),
            incoming_right: matrix_from_rows(spec.incoming_right),
            outgoing: matrix_from_rows(spec.outgoing),
        }
    }
}

/// Projection requested by a job
///
/// `oriented_angles` derives the photon vectors from the scattering angles
/// and needs `phi_out`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometrySpec {
    Isotropic(ScatteringAngles),
    Oriented(PolarizationSetup),
    OrientedAngles(ScatteringAngles),
}

impl Default for GeometrySpec {
    fn default() -> Self {
        GeometrySpec::Isotropic(ScatteringAngles::default())
    }
}

impl GeometrySpec {
    pub fn geometry(&self) -> std::result::Result<Geometry, RixsError> {
        match self {
            GeometrySpec::Isotropic(angles) => Ok(Geometry::Isotropic(*angles)),
            GeometrySpec::Oriented(setup) => Ok(Geometry::Oriented(*setup)),
            GeometrySpec::OrientedAngles(angles) => Geometry::oriented_from_angles(angles),
        }
    }
}

/// Complete RIXS or XAS job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RixsJob {
    /// Incident photon energies in eV
    pub incident: EnergyGrid,
    /// Energy losses in eV; required for RIXS maps
    #[serde(default)]
    pub loss: Option<EnergyGrid>,
    /// Ground→intermediate transitions
    pub absorption: TransitionTable,
    /// Intermediate→final transitions; required for RIXS maps
    #[serde(default)]
    pub emission: Option<TransitionTable>,
    #[serde(default)]
    pub emission_orientation: LegOrientation,
    /// Ground states allowed to contribute; empty keeps all
    #[serde(default)]
    pub ground_states: Vec<usize>,
    #[serde(default = "default_gamma")]
    pub gamma_n: f64,
    #[serde(default = "default_gamma")]
    pub gamma_f: f64,
    #[serde(default)]
    pub interference: Interference,
    #[serde(default)]
    pub geometry: GeometrySpec,
    #[serde(default)]
    pub filters: Option<FilterSpec>,
    /// Lab-frame rotation (row-major); requires an oriented geometry
    #[serde(default)]
    pub rotation: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pub energy_tolerance: Option<f64>,
}

impl RixsJob {
    /// Read a job from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a job from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn incident_energies(&self) -> Result<Vec<f64>> {
        self.incident.points()
    }

    pub fn loss_energies(&self) -> Result<Vec<f64>> {
        self.loss
            .as_ref()
            .ok_or_else(|| InputError::MissingSection("loss".to_string()))?
            .points()
    }

    /// Absorption legs restricted to the requested ground states
    pub fn absorption_table(&self) -> TransitionTable {
        self.absorption.restrict_origins(&self.ground_states)
    }

    /// Emission legs oriented from intermediate to final state
    pub fn emission_table(&self) -> Result<TransitionTable> {
        let table = self
            .emission
            .as_ref()
            .ok_or_else(|| InputError::MissingSection("emission".to_string()))?;
        Ok(match self.emission_orientation {
            LegOrientation::IntermediateToFinal => table.clone(),
            LegOrientation::LowerToUpper => table.emission_legs(),
        })
    }

    /// Calculation parameters described by this job
    ///
    /// A rotation fixes the molecular orientation, so it is only accepted
    /// together with an oriented geometry.
    pub fn rixs_parameters(&self) -> Result<RixsParameters> {
        let geometry = self.geometry.geometry()?;
        if self.rotation.is_some() && !geometry.is_oriented() {
            return Err(RixsError::MalformedGeometry(
                "a rotation needs an `oriented` or `oriented_angles` geometry".to_string(),
            )
            .into());
        }

        Ok(RixsParameters {
            gamma_n: self.gamma_n,
            gamma_f: self.gamma_f,
            interference: self.interference,
            geometry,
            filters: self.filters.as_ref().map(Filters::from).unwrap_or_default(),
            frame: self
                .rotation
                .map(|rows| Frame::Lab(matrix_from_rows(rows)))
                .unwrap_or_default(),
            energy_tolerance: self.energy_tolerance.unwrap_or(ENERGY_VARIANCE_TOLERANCE),
        })
    }
}
