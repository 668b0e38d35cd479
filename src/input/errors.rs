/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for the input module

use crate::rixs::RixsError;
use thiserror::Error;

/// Errors raised while reading a job description
#[derive(Error, Debug)]
pub enum InputError {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Energy grid that cannot be generated
    #[error("Invalid energy grid: {0}")]
    InvalidGrid(String),

    /// A section needed by the requested calculation is absent
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Geometry that cannot be turned into calculation parameters
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] RixsError),
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;
