/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for the transitions module

use thiserror::Error;

/// Errors raised while building or validating transition tables
#[derive(Error, Debug)]
pub enum TransitionError {
    /// An expected table or section is absent or empty
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A state referenced by a transition is absent from the eigenvalue table
    #[error("State {0} not found in eigenvalue table")]
    UnknownState(usize),

    /// More than one record for the same ordered pair of states
    #[error("Duplicate transition {from} -> {to}")]
    DuplicateTransition { from: usize, to: usize },

    /// Records of one table carry moments of different ranks
    #[error("Mixed moment kinds in table: {0}")]
    MixedMoments(String),

    /// State indices must be positive after subset renumbering
    #[error("Invalid state index: {0}")]
    InvalidIndex(String),

    /// Non-finite energies or components
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Property matrices with inconsistent shapes or component counts
    #[error("Shape error: {0}")]
    Shape(String),
}

/// Result type for transition table operations
pub type Result<T> = std::result::Result<T, TransitionError>;
