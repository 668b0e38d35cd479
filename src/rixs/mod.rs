/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Resonant inelastic X-ray scattering (RIXS) module
//!
//! The calculation runs in four stages:
//!
//! 1. [`assembler`] joins the two transition tables into per-path scattering tensors;
//! 2. [`resonance`] sums them over intermediate states for one incident energy;
//! 3. [`geometry`] projects the net tensor onto the experimental geometry;
//! 4. [`spectrum`] repeats this over the incident grid and broadens onto the loss grid.
//!
//! [`absorption`] covers the absorption-only (XAS) case.

pub mod absorption;
pub mod assembler;
pub mod errors;
pub mod geometry;
pub mod resonance;
pub mod spectrum;
pub mod tensor;

pub use absorption::{calculate_absorption, AbsorptionSpectrum};
pub use assembler::{Filters, Frame, StatePath, TensorAssembler, TensorEntry, TensorMap};
pub use errors::{Result, RixsError};
pub use geometry::{
    isotropic_rank2, isotropic_rank3, rank2_invariants, rank3_invariants, Geometry,
    PolarizationSetup, Projector, ScatteringAngles,
};
pub use resonance::{Interference, NetAmplitude, RamanLoss, ResonanceSum, ResonanceSummator};
pub use spectrum::{
    calculate_rixs_map, convolve_column, ProgressCallback, RixsCalculator, RixsMap,
    RixsParameters,
};
pub use tensor::{ScatteringTensor, WeightTensor};
