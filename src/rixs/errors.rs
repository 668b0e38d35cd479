/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for the RIXS module

use crate::transitions::TransitionError;
use crate::utils::UtilsError;
use thiserror::Error;

/// Result type for RIXS operations
pub type Result<T> = std::result::Result<T, RixsError>;

/// RIXS-specific errors
#[derive(Error, Debug)]
pub enum RixsError {
    /// An expected table is absent or empty
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Tables were found but no ground leg joins any emission leg
    #[error(
        "No valid scattering paths: {absorption} absorption and {emission} emission records share no intermediate state"
    )]
    NoValidPaths { absorption: usize, emission: usize },

    /// Polarization, wavevector or angle arguments that do not fit the projector
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    /// Moment ranks that cannot be coupled into a scattering tensor
    #[error("Incompatible moments: {0}")]
    IncompatibleMoments(String),

    /// Error when parameters are invalid
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the transition tables
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl From<UtilsError> for RixsError {
    fn from(err: UtilsError) -> Self {
        RixsError::InvalidParameter(err.to_string())
    }
}
