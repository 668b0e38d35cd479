/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Kramers-Heisenberg summation over intermediate states
//!
//! For each `(g, f)` channel the path tensors are summed with the complex
//! resonance denominator `1 / (wi - E_gn + iΓn)`. The Raman loss of the
//! channel is the mean of `E_gn - E_nf` over its paths; a spread larger than
//! the tolerance means the tables disagree on the state energies and is
//! reported, but the mean is still used.

use super::assembler::TensorMap;
use super::errors::{Result, RixsError};
use super::tensor::ScatteringTensor;
use crate::utils::constants::ENERGY_VARIANCE_TOLERANCE;
use crate::utils::{mean, population_variance};
use log::{debug, warn};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// How intermediate-state contributions are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interference {
    /// Sum complex amplitudes, then square (Kramers-Heisenberg)
    #[default]
    Coherent,
    /// Sum squared path amplitudes; no cross terms between intermediate states
    Incoherent,
}

/// Raman loss of one `(g, f)` channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RamanLoss {
    pub ground: usize,
    pub final_state: usize,
    /// Mean of `E_gn - E_nf` over intermediate states, in eV
    pub energy: f64,
    /// Population variance of `E_gn - E_nf`, in eV²
    pub variance: f64,
    /// Number of intermediate states contributing
    pub paths: usize,
}

/// Net scattering amplitude of one channel at one incident energy
#[derive(Debug, Clone, PartialEq)]
pub enum NetAmplitude {
    /// Coherent tensor sum, still to be projected
    Tensor(ScatteringTensor),
    /// Incoherent intensity, already a scalar
    Intensity(f64),
}

/// Result of the summation for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ResonanceSum {
    pub ground: usize,
    pub final_state: usize,
    /// Raman loss in eV
    pub loss: f64,
    pub amplitude: NetAmplitude,
}

#[derive(Debug)]
struct Channel<'a> {
    loss: RamanLoss,
    /// `(E_gn, tensor)` per intermediate state
    terms: Vec<(f64, &'a ScatteringTensor)>,
}

/// Sums path tensors over intermediate states for a given incident energy
#[derive(Debug)]
pub struct ResonanceSummator<'a> {
    channels: Vec<Channel<'a>>,
    gamma_n: f64,
    mode: Interference,
    tolerance: f64,
}

impl<'a> ResonanceSummator<'a> {
    /// Group the map into channels and check energy conservation
    pub fn new(map: &'a TensorMap, gamma_n: f64, mode: Interference) -> Result<Self> {
        Self::with_tolerance(map, gamma_n, mode, ENERGY_VARIANCE_TOLERANCE)
    }

    /// Same as [`ResonanceSummator::new`] with an explicit variance tolerance (eV²)
    pub fn with_tolerance(
        map: &'a TensorMap,
        gamma_n: f64,
        mode: Interference,
        tolerance: f64,
    ) -> Result<Self> {
        if !(gamma_n > 0.0 && gamma_n.is_finite()) {
            return Err(RixsError::InvalidParameter(format!(
                "intermediate-state width must be positive, got {}",
                gamma_n
            )));
        }
        if !(tolerance >= 0.0) {
            return Err(RixsError::InvalidParameter(format!(
                "energy tolerance must be non-negative, got {}",
                tolerance
            )));
        }
        if map.is_empty() {
            return Err(RixsError::NoValidPaths {
                absorption: 0,
                emission: 0,
            });
        }
        if mode == Interference::Coherent && map.rank() == Some(0) {
            return Err(RixsError::IncompatibleMoments(
                "oscillator strengths carry no phase; use incoherent summation".to_string(),
            ));
        }

        let mut channels = Vec::new();
        for ((ground, final_state), paths) in map.channels() {
            let losses: Vec<f64> = paths.iter().map(|(_, e)| e.raman_loss()).collect();
            // Channels always hold at least one path
            let (Some(energy), Some(variance)) = (mean(&losses), population_variance(&losses))
            else {
                continue;
            };
            let loss = RamanLoss {
                ground,
                final_state,
                energy,
                variance,
                paths: paths.len(),
            };
            if variance >= tolerance && paths.len() > 1 {
                warn!(
                    "Raman losses disagree across intermediate states for g={}, f={} (variance {:.3e} eV²); using mean {:.6} eV",
                    ground, final_state, variance, energy
                );
            }
            let terms = paths.iter().map(|(_, e)| (e.e_gn, &e.tensor)).collect();
            channels.push(Channel { loss, terms });
        }
        let (g_max, n_max, f_max) = map.max_indices();
        debug!(
            "{} (g, f) channels from {} paths, highest states g={}, n={}, f={}",
            channels.len(),
            map.len(),
            g_max,
            n_max,
            f_max
        );

        Ok(Self {
            channels,
            gamma_n,
            mode,
            tolerance,
        })
    }

    pub fn mode(&self) -> Interference {
        self.mode
    }

    pub fn gamma_n(&self) -> f64 {
        self.gamma_n
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Raman loss of every channel
    pub fn raman_losses(&self) -> Vec<RamanLoss> {
        self.channels.iter().map(|c| c.loss).collect()
    }

    /// Channels whose per-path losses disagree beyond the tolerance
    pub fn mismatches(&self) -> Vec<RamanLoss> {
        self.channels
            .iter()
            .map(|c| c.loss)
            .filter(|l| l.paths > 1 && l.variance >= self.tolerance)
            .collect()
    }

    /// Net amplitude of every channel at incident energy `wi`
    pub fn sum_at(&self, wi: f64) -> Result<Vec<ResonanceSum>> {
        if !wi.is_finite() {
            return Err(RixsError::InvalidParameter(format!(
                "incident energy must be finite, got {}",
                wi
            )));
        }

        self.channels
            .iter()
            .map(|channel| -> Result<ResonanceSum> {
                let amplitude = match self.mode {
                    Interference::Coherent => {
                        let mut acc = channel.terms[0].1.zeros_like();
                        for (e_gn, tensor) in &channel.terms {
                            let denominator = Complex64::new(wi - e_gn, self.gamma_n);
                            acc.add_scaled(tensor, denominator.inv())?;
                        }
                        NetAmplitude::Tensor(acc)
                    }
                    Interference::Incoherent => {
                        let gamma_sq = self.gamma_n * self.gamma_n;
                        let intensity: f64 = channel
                            .terms
                            .iter()
                            .map(|(e_gn, tensor)| {
                                let detuning = wi - e_gn;
                                tensor.incoherent_weight() / (detuning * detuning + gamma_sq)
                            })
                            .sum();
                        NetAmplitude::Intensity(intensity)
                    }
                };
                Ok(ResonanceSum {
                    ground: channel.loss.ground,
                    final_state: channel.loss.final_state,
                    loss: channel.loss.energy,
                    amplitude,
                })
            })
            .collect()
    }
}
