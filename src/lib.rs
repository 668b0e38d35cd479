/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! # polarixs-rs
//!
//! Polarization-resolved resonant inelastic X-ray scattering (RIXS) and X-ray
//! absorption (XAS) spectra from quantum-chemistry transition moments.
//!
//! Transition tables for the absorption and emission steps are joined into
//! scattering tensors, summed over intermediate states with the
//! Kramers-Heisenberg expression, projected onto the experimental geometry and
//! broadened with Lorentzians onto an incident-energy x energy-loss map.

pub mod cli;
pub mod input;
pub mod rixs;
pub mod transitions;
pub mod utils;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
