/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Numeric tables delivered by the output reader and the builders that turn
//! them into transition tables
//!
//! State energies come from the eigenvalue table; the energy gap of a
//! transition is `E(to) - E(from)` in eV. Two optional reductions mirror how
//! spectra are usually requested: a subset offset that renumbers the upper
//! manifold from 1 when ground and excited states occupy disjoint index
//! ranges, and a ground-state filter restricting the origins that contribute.

use super::errors::{Result, TransitionError};
use super::record::{Moment, TransitionRecord, TransitionTable};
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the state energy table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenvalueRow {
    /// State index (1-based)
    pub state: usize,
    /// Energy relative to the lowest state in Hartree
    pub relative_hartree: f64,
    /// Energy relative to the lowest state in eV
    pub energy_ev: f64,
    /// Energy relative to the lowest state in cm⁻¹
    pub energy_cm: f64,
}

/// State energies indexed by state number
#[derive(Debug, Clone)]
pub struct EigenvalueTable {
    rows: Vec<EigenvalueRow>,
    energies: HashMap<usize, f64>,
}

impl EigenvalueTable {
    /// Build the table; an empty row list means the energy section was not found
    pub fn new(rows: Vec<EigenvalueRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(TransitionError::MissingData(
                "eigenvalue table is empty".to_string(),
            ));
        }

        let mut energies = HashMap::with_capacity(rows.len());
        for row in &rows {
            if !row.energy_ev.is_finite() {
                return Err(TransitionError::InvalidValue(format!(
                    "energy of state {} is not finite",
                    row.state
                )));
            }
            if energies.insert(row.state, row.energy_ev).is_some() {
                return Err(TransitionError::InvalidIndex(format!(
                    "state {} listed twice in eigenvalue table",
                    row.state
                )));
            }
        }

        Ok(Self { rows, energies })
    }

    /// Build from plain eV energies of states 1..=N
    pub fn from_energies(energies_ev: &[f64]) -> Result<Self> {
        let lowest = energies_ev.iter().copied().fold(f64::INFINITY, f64::min);
        let rows = energies_ev
            .iter()
            .enumerate()
            .map(|(i, &e)| EigenvalueRow {
                state: i + 1,
                relative_hartree: (e - lowest) / HARTREE_TO_EV,
                energy_ev: e - lowest,
                energy_cm: (e - lowest) * EV_TO_CM,
            })
            .collect();
        Self::new(rows)
    }

    pub fn rows(&self) -> &[EigenvalueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Energy of a state in eV
    pub fn energy_ev(&self, state: usize) -> Option<f64> {
        self.energies.get(&state).copied()
    }

    /// Energy gap `E(to) - E(from)` in eV
    pub fn gap(&self, from: usize, to: usize) -> Result<f64> {
        let e_from = self
            .energy_ev(from)
            .ok_or(TransitionError::UnknownState(from))?;
        let e_to = self.energy_ev(to).ok_or(TransitionError::UnknownState(to))?;
        Ok(e_to - e_from)
    }
}

const HARTREE_TO_EV: f64 = 27.211386245988;
const EV_TO_CM: f64 = 8065.543937;

/// Row of a reader table carrying one transition moment
pub trait MomentRow {
    /// `(from, to)` state indices as printed
    fn states(&self) -> (usize, usize);
    /// The transition moment
    fn moment(&self) -> Moment;
}

/// Oscillator strength row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthRow {
    pub from: usize,
    pub to: usize,
    pub strength: f64,
}

/// Dipole transition vector row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipoleRow {
    pub from: usize,
    pub to: usize,
    pub components: [Complex64; 3],
}

/// Quadrupole transition row: xx, xy, xz, yy, yz, zz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrupoleRow {
    pub from: usize,
    pub to: usize,
    pub components: [Complex64; 6],
}

impl MomentRow for StrengthRow {
    fn states(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    fn moment(&self) -> Moment {
        Moment::Scalar(self.strength)
    }
}

impl MomentRow for DipoleRow {
    fn states(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    fn moment(&self) -> Moment {
        Moment::Dipole(self.components)
    }
}

impl MomentRow for QuadrupoleRow {
    fn states(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    fn moment(&self) -> Moment {
        Moment::Quadrupole(self.components)
    }
}

/// Reductions applied while building a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Offset subtracted from destination indices (0 disables renumbering)
    #[serde(default)]
    pub subset: usize,
    /// Origins allowed to contribute; empty keeps all
    #[serde(default)]
    pub ground_states: Vec<usize>,
    /// Drop transitions whose largest component magnitude does not exceed this
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl TableOptions {
    fn admits_origin(&self, state: usize) -> bool {
        self.ground_states.is_empty() || self.ground_states.contains(&state)
    }

    fn passes_threshold(&self, moment: &Moment) -> bool {
        match self.threshold {
            Some(t) => moment.max_component() > t,
            None => true,
        }
    }

    fn renumber(&self, to: usize) -> Result<usize> {
        match to.checked_sub(self.subset) {
            Some(index) if index > 0 => Ok(index),
            _ => Err(TransitionError::InvalidIndex(format!(
                "destination state {} lies inside the subset offset {}",
                to, self.subset
            ))),
        }
    }
}

/// Build a transition table from reader rows and the state energies
pub fn build_table<R: MomentRow>(
    eigenvalues: &EigenvalueTable,
    rows: &[R],
    options: &TableOptions,
) -> Result<TransitionTable> {
    if rows.is_empty() {
        return Err(TransitionError::MissingData(
            "transition section is empty".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let (from, to) = row.states();
        let moment = row.moment();
        if !options.admits_origin(from) || !options.passes_threshold(&moment) {
            continue;
        }
        let energy = eigenvalues.gap(from, to)?;
        records.push(TransitionRecord::new(
            energy,
            moment,
            from,
            options.renumber(to)?,
        ));
    }

    TransitionTable::new(records)
}

/// Build a transition table from dense per-component property matrices
///
/// `components` holds either the 3 dipole components (x, y, z) or the 6
/// quadrupole components (xx, xy, xz, yy, yz, zz), each an N x N matrix over
/// the states 1..=N. With a subset offset `s`, origins are restricted to
/// states `1..=s` and destinations to `s+1..=N`. Diagonal elements are
/// permanent moments, not transitions, and are skipped. Without an explicit
/// threshold, vanishing elements are dropped as well.
pub fn table_from_property_matrices(
    eigenvalues: &EigenvalueTable,
    components: &[Array2<Complex64>],
    options: &TableOptions,
) -> Result<TransitionTable> {
    let first = components.first().ok_or_else(|| {
        TransitionError::MissingData("no property matrices supplied".to_string())
    })?;
    let n_states = first.nrows();

    if components.len() != 3 && components.len() != 6 {
        return Err(TransitionError::Shape(format!(
            "expected 3 dipole or 6 quadrupole components, got {}",
            components.len()
        )));
    }
    if components
        .iter()
        .any(|m| m.dim() != (n_states, n_states))
    {
        return Err(TransitionError::Shape(
            "property matrices must share one square shape".to_string(),
        ));
    }
    if n_states == 0 {
        return Err(TransitionError::MissingData(
            "property matrices are empty".to_string(),
        ));
    }
    if options.subset >= n_states {
        return Err(TransitionError::InvalidIndex(format!(
            "subset offset {} leaves no destination among {} states",
            options.subset, n_states
        )));
    }

    let n_origin = if options.subset == 0 {
        n_states
    } else {
        options.subset
    };

    let mut records = Vec::new();
    for i in 0..n_origin {
        let from = i + 1;
        if !options.admits_origin(from) {
            continue;
        }
        for j in options.subset..n_states {
            if i == j {
                continue;
            }
            let moment = match components.len() {
                3 => Moment::Dipole([
                    components[0][(i, j)],
                    components[1][(i, j)],
                    components[2][(i, j)],
                ]),
                _ => Moment::Quadrupole([
                    components[0][(i, j)],
                    components[1][(i, j)],
                    components[2][(i, j)],
                    components[3][(i, j)],
                    components[4][(i, j)],
                    components[5][(i, j)],
                ]),
            };
            if moment.max_component() <= options.threshold.unwrap_or(0.0) {
                continue;
            }
            let to = j + 1;
            let energy = eigenvalues.gap(from, to)?;
            records.push(TransitionRecord::new(
                energy,
                moment,
                from,
                options.renumber(to)?,
            ));
        }
    }

    TransitionTable::new(records)
}
