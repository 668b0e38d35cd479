/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Absorption spectra
//!
//! Absorption-only mode: every ground→intermediate transition is broadened
//! by a unit-area Lorentzian weighted with its oscillator strength. There is
//! no emission step, no loss axis and no kinematic factor.

use super::errors::{Result, RixsError};
use crate::transitions::TransitionTable;
use crate::utils::{lorentzian, trapezoid};
use log::info;
use rayon::prelude::*;

/// Broadened absorption spectrum
#[derive(Debug, Clone)]
pub struct AbsorptionSpectrum {
    /// Incident photon energies in eV
    pub energies: Vec<f64>,
    /// Absorption intensity
    pub intensity: Vec<f64>,
}

impl AbsorptionSpectrum {
    /// Energy and intensity of the strongest point
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.energies
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Area under the sampled spectrum, `None` below two points
    pub fn integrated_intensity(&self) -> Option<f64> {
        trapezoid(&self.energies, &self.intensity).ok()
    }

    /// Export spectrum to a file
    pub fn export_to_file(&self, file_path: &str) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::{BufWriter, Write};

        let mut file = BufWriter::new(File::create(file_path)?);

        writeln!(file, "# XAS spectrum calculated with polarixs-rs")?;
        writeln!(file, "#")?;
        writeln!(file, "# Energy(eV)  Intensity")?;

        for (energy, intensity) in self.energies.iter().zip(&self.intensity) {
            writeln!(file, "{:.4}  {:.6e}", energy, intensity)?;
        }

        file.flush()
    }
}

/// Broaden the transitions of `table` onto `energies`
///
/// Records must carry scalar oscillator strengths.
pub fn calculate_absorption(
    energies: &[f64],
    table: &TransitionTable,
    gamma: f64,
) -> Result<AbsorptionSpectrum> {
    if table.is_empty() {
        return Err(RixsError::MissingData(
            "absorption table is empty".to_string(),
        ));
    }
    if energies.is_empty() || energies.iter().any(|e| !e.is_finite()) {
        return Err(RixsError::InvalidParameter(
            "energy grid must be non-empty and finite".to_string(),
        ));
    }
    if !(gamma > 0.0 && gamma.is_finite()) {
        return Err(RixsError::InvalidParameter(format!(
            "broadening width must be positive, got {}",
            gamma
        )));
    }

    let lines = table
        .iter()
        .map(|record| {
            record
                .moment
                .strength()
                .map(|strength| (record.energy, strength))
                .ok_or_else(|| {
                    RixsError::IncompatibleMoments(format!(
                        "absorption spectra need oscillator strengths, got {} moments",
                        record.moment.kind()
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "XAS spectrum: {} transitions on {} energies",
        lines.len(),
        energies.len()
    );

    let intensity = energies
        .par_iter()
        .map(|&w| {
            lines
                .iter()
                .map(|&(energy, strength)| strength * lorentzian(w, energy, gamma))
                .sum::<f64>()
        })
        .collect();

    Ok(AbsorptionSpectrum {
        energies: energies.to_vec(),
        intensity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transitions::{Moment, TransitionRecord};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_two_lines() {
        let table = TransitionTable::new(vec![
            TransitionRecord::new(5.0, Moment::Scalar(1.0), 1, 2),
            TransitionRecord::new(9.0, Moment::Scalar(0.5), 1, 3),
        ])
        .unwrap();
        let spectrum = calculate_absorption(&[5.0, 9.0], &table, 1.0).unwrap();

        assert_relative_eq!(
            spectrum.intensity[0],
            1.0 / PI + 0.5 / (PI * 17.0),
            epsilon = 1e-12
        );
        assert_eq!(spectrum.peak().unwrap().0, 5.0);
    }

    #[test]
    fn test_requires_strengths() {
        let table = TransitionTable::new(vec![TransitionRecord::new(
            5.0,
            Moment::real_dipole(1.0, 0.0, 0.0),
            1,
            2,
        )])
        .unwrap();
        assert!(matches!(
            calculate_absorption(&[5.0], &table, 1.0),
            Err(RixsError::IncompatibleMoments(_))
        ));
        assert!(matches!(
            calculate_absorption(&[5.0], &TransitionTable::default(), 1.0),
            Err(RixsError::MissingData(_))
        ));
    }
}
