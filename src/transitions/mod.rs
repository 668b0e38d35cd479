/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Transition tables
//!
//! This module describes the numeric tables delivered by the quantum-chemistry
//! output reader: state energies and transition moments between states. Text
//! extraction itself lives outside this crate; everything here starts from
//! already-parsed rows.

pub mod errors;
pub mod record;
pub mod tables;

pub use errors::{Result, TransitionError};
pub use record::{Moment, MomentKind, TransitionRecord, TransitionTable};
pub use tables::{
    build_table, table_from_property_matrices, DipoleRow, EigenvalueRow, EigenvalueTable,
    MomentRow, QuadrupoleRow, StrengthRow, TableOptions,
};
