/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! RIXS map calculation
//!
//! Sweeps the incident-energy grid. Each column runs the resonance summation
//! and the projection once, then broadens every `(loss, intensity)` line with
//! a unit-area Lorentzian of width `Γf` onto the loss grid and multiplies the
//! column by the kinematic factor `(wi - loss) / wi`. Columns are independent
//! and are computed in parallel over a read-only tensor map.

use super::assembler::{Filters, Frame, TensorAssembler};
use super::errors::{Result, RixsError};
use super::geometry::{Geometry, Projector, ScatteringAngles};
use super::resonance::{Interference, RamanLoss, ResonanceSummator};
use crate::transitions::TransitionTable;
use crate::utils::constants::{DEFAULT_GAMMA, ENERGY_VARIANCE_TOLERANCE};
use crate::utils::lorentzian;
use log::info;
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// RIXS calculation parameters
#[derive(Debug, Clone)]
pub struct RixsParameters {
    /// Intermediate-state (core-hole) width Γn in eV
    pub gamma_n: f64,
    /// Final-state width Γf in eV
    pub gamma_f: f64,
    /// Coherent or incoherent summation over intermediate states
    pub interference: Interference,
    /// Projection convention
    pub geometry: Geometry,
    /// Polarization filters on the two legs
    pub filters: Filters,
    /// Molecular frame or rotated lab frame
    pub frame: Frame,
    /// Largest accepted variance of per-path Raman losses in eV²
    pub energy_tolerance: f64,
}

impl Default for RixsParameters {
    fn default() -> Self {
        Self {
            gamma_n: DEFAULT_GAMMA,
            gamma_f: DEFAULT_GAMMA,
            interference: Interference::Coherent,
            geometry: Geometry::default(),
            filters: Filters::default(),
            frame: Frame::Molecular,
            energy_tolerance: ENERGY_VARIANCE_TOLERANCE,
        }
    }
}

impl RixsParameters {
    /// Plane-wave parameters: molecular frame, orientational average
    pub fn plane_wave(angles: ScatteringAngles) -> Self {
        Self {
            geometry: Geometry::Isotropic(angles),
            ..Self::default()
        }
    }

    /// Semiclassical parameters: tensors rotated into the lab frame by
    /// `rotation`, projected onto the photon directions given by `angles`
    pub fn semiclassical(rotation: Array2<f64>, angles: &ScatteringAngles) -> Result<Self> {
        Ok(Self {
            geometry: Geometry::oriented_from_angles(angles)?,
            frame: Frame::Lab(rotation),
            ..Self::default()
        })
    }
}

/// RIXS intensity map
#[derive(Debug, Clone)]
pub struct RixsMap {
    /// Incident photon energies in eV
    pub incident: Vec<f64>,
    /// Energy losses in eV
    pub loss: Vec<f64>,
    /// Intensity indexed `[loss, incident]`
    pub intensity: Array2<f64>,
    /// Raman loss of every `(g, f)` channel
    pub raman_losses: Vec<RamanLoss>,
    /// Channels whose Raman losses disagree across intermediate states
    pub mismatches: Vec<RamanLoss>,
}

impl RixsMap {
    /// Intensity at one grid point
    pub fn at(&self, loss_index: usize, incident_index: usize) -> f64 {
        self.intensity[(loss_index, incident_index)]
    }

    /// Loss spectrum at one incident energy
    pub fn column(&self, incident_index: usize) -> ArrayView1<'_, f64> {
        self.intensity.column(incident_index)
    }

    /// Largest intensity in the map
    pub fn max_intensity(&self) -> f64 {
        self.intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Export the map as `incident loss intensity` rows, one block per
    /// incident energy
    pub fn export_to_file(&self, file_path: &str) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::{BufWriter, Write};

        let mut file = BufWriter::new(File::create(file_path)?);

        writeln!(file, "# RIXS map calculated with polarixs-rs")?;
        writeln!(
            file,
            "# {} incident x {} loss points, {} channels",
            self.incident.len(),
            self.loss.len(),
            self.raman_losses.len()
        )?;
        if !self.mismatches.is_empty() {
            writeln!(
                file,
                "# WARNING: {} channels with inconsistent Raman losses",
                self.mismatches.len()
            )?;
        }
        writeln!(file, "#")?;
        writeln!(file, "# Incident(eV)  Loss(eV)  Intensity")?;

        for (i, wi) in self.incident.iter().enumerate() {
            for (j, loss) in self.loss.iter().enumerate() {
                writeln!(
                    file,
                    "{:.4}  {:.4}  {:.6e}",
                    wi,
                    loss,
                    self.intensity[(j, i)]
                )?;
            }
            writeln!(file)?;
        }

        file.flush()
    }
}

/// Progress callback receiving `(completed_columns, total_columns)`
pub type ProgressCallback = dyn Fn(usize, usize) + Send + Sync;

/// Calculator for RIXS maps
pub struct RixsCalculator {
    parameters: RixsParameters,
    progress: Option<Box<ProgressCallback>>,
}

impl std::fmt::Debug for RixsCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RixsCalculator")
            .field("parameters", &self.parameters)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl RixsCalculator {
    pub fn new(parameters: RixsParameters) -> Self {
        Self {
            parameters,
            progress: None,
        }
    }

    /// Report progress after every finished incident-energy column
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn parameters(&self) -> &RixsParameters {
        &self.parameters
    }

    /// Compute the `loss.len() x incident.len()` intensity map
    pub fn calculate(
        &self,
        incident: &[f64],
        loss: &[f64],
        absorption: &TransitionTable,
        emission: &TransitionTable,
    ) -> Result<RixsMap> {
        let params = &self.parameters;

        validate_grid(incident, "incident")?;
        validate_grid(loss, "loss")?;
        if let Some(wi) = incident.iter().find(|&&wi| wi <= 0.0) {
            return Err(RixsError::InvalidParameter(format!(
                "incident energies must be positive, got {}",
                wi
            )));
        }
        if !(params.gamma_f > 0.0 && params.gamma_f.is_finite()) {
            return Err(RixsError::InvalidParameter(format!(
                "final-state width must be positive, got {}",
                params.gamma_f
            )));
        }
        self.check_geometry()?;

        let projector = Projector::new(&params.geometry)?;
        let mut assembler = TensorAssembler::new();
        assembler
            .set_filters(params.filters.clone())
            .set_frame(params.frame.clone());
        let map = assembler.assemble(absorption, emission)?;
        let summator = ResonanceSummator::with_tolerance(
            &map,
            params.gamma_n,
            params.interference,
            params.energy_tolerance,
        )?;

        info!(
            "RIXS map: {} incident x {} loss points over {} channels",
            incident.len(),
            loss.len(),
            summator.channel_count()
        );

        let total = incident.len();
        let completed = AtomicUsize::new(0);

        let columns = incident
            .par_iter()
            .map(|&wi| -> Result<Vec<f64>> {
                let lines = summator
                    .sum_at(wi)?
                    .iter()
                    .map(|sum| -> Result<(f64, f64)> {
                        Ok((sum.loss, projector.project(&sum.amplitude)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let column = convolve_column(wi, loss, &lines, params.gamma_f);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(callback) = &self.progress {
                    callback(done, total);
                }
                Ok(column)
            })
            .collect::<Result<Vec<_>>>()?;

        let intensity =
            Array2::from_shape_fn((loss.len(), incident.len()), |(j, i)| columns[i][j]);

        info!("RIXS map finished");

        Ok(RixsMap {
            incident: incident.to_vec(),
            loss: loss.to_vec(),
            intensity,
            raman_losses: summator.raman_losses(),
            mismatches: summator.mismatches(),
        })
    }

    fn check_geometry(&self) -> Result<()> {
        let params = &self.parameters;
        if params.interference == Interference::Incoherent && params.geometry.is_oriented() {
            return Err(RixsError::MalformedGeometry(
                "incoherent summation is an orientational average; use an isotropic geometry"
                    .to_string(),
            ));
        }
        if matches!(params.frame, Frame::Lab(_)) && !params.geometry.is_oriented() {
            return Err(RixsError::MalformedGeometry(
                "a lab-frame rotation needs an oriented geometry; the isotropic average ignores it"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Compute a RIXS map with default calculator settings
pub fn calculate_rixs_map(
    incident: &[f64],
    loss: &[f64],
    absorption: &TransitionTable,
    emission: &TransitionTable,
    parameters: &RixsParameters,
) -> Result<RixsMap> {
    RixsCalculator::new(parameters.clone()).calculate(incident, loss, absorption, emission)
}

/// Broaden `(loss, intensity)` lines onto the loss grid for one incident energy
///
/// Each grid point receives `Σ I · L(Δ - loss; Γf)` scaled by `(wi - loss) / wi`.
pub fn convolve_column(
    wi: f64,
    loss_grid: &[f64],
    lines: &[(f64, f64)],
    gamma_f: f64,
) -> Vec<f64> {
    loss_grid
        .iter()
        .map(|&loss| {
            let broadened: f64 = lines
                .iter()
                .map(|&(delta, intensity)| intensity * lorentzian(delta, loss, gamma_f))
                .sum();
            ((wi - loss) / wi) * broadened
        })
        .collect()
}

fn validate_grid(grid: &[f64], name: &str) -> Result<()> {
    if grid.is_empty() {
        return Err(RixsError::InvalidParameter(format!("{} grid is empty", name)));
    }
    if grid.iter().any(|e| !e.is_finite()) {
        return Err(RixsError::InvalidParameter(format!(
            "{} grid has non-finite energies",
            name
        )));
    }
    Ok(())
}
