/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Input module
//!
//! Reads the JSON job descriptions consumed by the command line tool.

pub mod config;
pub mod errors;

pub use config::{EnergyGrid, FilterSpec, GeometrySpec, LegOrientation, RixsJob, MAX_GRID_POINTS};
pub use errors::{InputError, Result};
