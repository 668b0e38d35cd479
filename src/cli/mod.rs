/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Command Line Interface (CLI) module
//!
//! Runs RIXS maps and absorption spectra from JSON job files.

use crate::input::RixsJob;
use crate::rixs::{calculate_absorption, RixsCalculator};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "polarixs-rs", version, about = "Polarization-resolved RIXS and XAS spectra")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute a RIXS map (incident energy x energy loss)
    Rixs {
        /// JSON job file
        job: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "rixs_map.dat")]
        output: PathBuf,
        /// Override the intermediate-state width in eV
        #[arg(long)]
        gamma_n: Option<f64>,
        /// Override the final-state width in eV
        #[arg(long)]
        gamma_f: Option<f64>,
    },
    /// Compute an absorption spectrum from the absorption table
    Xas {
        /// JSON job file
        job: PathBuf,
        /// Output file
        #[arg(short, long, default_value = "xas.dat")]
        output: PathBuf,
        /// Override the Lorentzian width in eV
        #[arg(long)]
        gamma: Option<f64>,
    },
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Rixs {
            job,
            output,
            gamma_n,
            gamma_f,
        } => run_rixs(&job, &output, gamma_n, gamma_f),
        Command::Xas { job, output, gamma } => run_xas(&job, &output, gamma),
    }
}

fn load_job(path: &Path) -> anyhow::Result<RixsJob> {
    RixsJob::from_file(path).with_context(|| format!("Failed to read job {}", path.display()))
}

fn output_path(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("Output path is not valid UTF-8: {}", path.display()))
}

fn run_rixs(
    job_path: &Path,
    output: &Path,
    gamma_n: Option<f64>,
    gamma_f: Option<f64>,
) -> anyhow::Result<()> {
    let job = load_job(job_path)?;

    let mut parameters = job.rixs_parameters()?;
    if let Some(gamma) = gamma_n {
        parameters.gamma_n = gamma;
    }
    if let Some(gamma) = gamma_f {
        parameters.gamma_f = gamma;
    }

    let incident = job.incident_energies()?;
    let loss = job.loss_energies()?;
    let absorption = job.absorption_table();
    let emission = job.emission_table()?;

    let step = (incident.len() / 10).max(1);
    let calculator = RixsCalculator::new(parameters).with_progress(move |done, total| {
        if done % step == 0 || done == total {
            info!("Incident energies: {}/{}", done, total);
        }
    });

    let map = calculator
        .calculate(&incident, &loss, &absorption, &emission)
        .context("RIXS calculation failed")?;

    for mismatch in &map.mismatches {
        warn!(
            "Channel {} -> {}: Raman loss varies over {} intermediate states (variance {:.3e} eV^2)",
            mismatch.ground, mismatch.final_state, mismatch.paths, mismatch.variance
        );
    }

    map.export_to_file(output_path(output)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "RIXS map written to {} (max intensity {:.6e})",
        output.display(),
        map.max_intensity()
    );
    Ok(())
}

fn run_xas(job_path: &Path, output: &Path, gamma: Option<f64>) -> anyhow::Result<()> {
    let job = load_job(job_path)?;
    let energies = job.incident_energies()?;
    let gamma = gamma.unwrap_or(job.gamma_n);

    let spectrum = calculate_absorption(&energies, &job.absorption_table(), gamma)
        .context("Absorption calculation failed")?;

    spectrum
        .export_to_file(output_path(output)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if let Some((energy, intensity)) = spectrum.peak() {
        info!("Absorption peak at {:.4} eV ({:.6e})", energy, intensity);
    }
    if let Some(area) = spectrum.integrated_intensity() {
        info!("Integrated absorption over the grid: {:.6e}", area);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rixs_command() {
        let cli = Cli::try_parse_from(["polarixs-rs", "rixs", "job.json", "--gamma-n", "0.5"])
            .unwrap();
        match cli.command {
            Command::Rixs {
                job,
                output,
                gamma_n,
                gamma_f,
            } => {
                assert_eq!(job, PathBuf::from("job.json"));
                assert_eq!(output, PathBuf::from("rixs_map.dat"));
                assert_eq!(gamma_n, Some(0.5));
                assert_eq!(gamma_f, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_xas_command() {
        let cli =
            Cli::try_parse_from(["polarixs-rs", "xas", "job.json", "-o", "out.dat"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Xas { ref output, gamma: None, .. } if output == &PathBuf::from("out.dat")
        ));
    }

    #[test]
    fn test_missing_job_file() {
        let cli = Cli::try_parse_from(["polarixs-rs", "xas", "/nonexistent/job.json"]).unwrap();
        assert!(run(cli).is_err());
    }
}
