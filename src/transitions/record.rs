/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Transition records and validated transition tables

use super::errors::{Result, TransitionError};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Rank of a transition moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    /// Scalar oscillator strength
    Scalar,
    /// Dipole moment vector (rank 1)
    Dipole,
    /// Quadrupole moment matrix (rank 2)
    Quadrupole,
}

impl std::fmt::Display for MomentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MomentKind::Scalar => write!(f, "scalar"),
            MomentKind::Dipole => write!(f, "dipole"),
            MomentKind::Quadrupole => write!(f, "quadrupole"),
        }
    }
}

/// Transition moment between two electronic states
///
/// Length-gauge moments are real and stored with zero imaginary parts;
/// velocity-gauge and spin-orbit-coupled moments may be genuinely complex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Moment {
    /// Oscillator strength
    Scalar(f64),
    /// Cartesian components (x, y, z)
    Dipole([Complex64; 3]),
    /// Independent components of the symmetric matrix (xx, xy, xz, yy, yz, zz)
    Quadrupole([Complex64; 6]),
}

impl Moment {
    /// Real-valued dipole moment
    pub fn real_dipole(x: f64, y: f64, z: f64) -> Self {
        Moment::Dipole([
            Complex64::new(x, 0.0),
            Complex64::new(y, 0.0),
            Complex64::new(z, 0.0),
        ])
    }

    /// Real-valued quadrupole moment from its six independent components
    pub fn real_quadrupole(components: [f64; 6]) -> Self {
        Moment::Quadrupole(components.map(|c| Complex64::new(c, 0.0)))
    }

    /// Kind of this moment
    pub fn kind(&self) -> MomentKind {
        match self {
            Moment::Scalar(_) => MomentKind::Scalar,
            Moment::Dipole(_) => MomentKind::Dipole,
            Moment::Quadrupole(_) => MomentKind::Quadrupole,
        }
    }

    /// Dipole moment as a 3-vector
    pub fn dipole_vector(&self) -> Option<Array1<Complex64>> {
        match self {
            Moment::Dipole(c) => Some(Array1::from(c.to_vec())),
            _ => None,
        }
    }

    /// Quadrupole moment reconstructed into its symmetric 3x3 matrix
    pub fn quadrupole_matrix(&self) -> Option<Array2<Complex64>> {
        match self {
            Moment::Quadrupole([xx, xy, xz, yy, yz, zz]) => Some(ndarray::array![
                [*xx, *xy, *xz],
                [*xy, *yy, *yz],
                [*xz, *yz, *zz]
            ]),
            _ => None,
        }
    }

    /// Oscillator strength of a scalar moment
    pub fn strength(&self) -> Option<f64> {
        match self {
            Moment::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Largest component magnitude
    pub fn max_component(&self) -> f64 {
        match self {
            Moment::Scalar(s) => s.abs(),
            Moment::Dipole(c) => c.iter().map(|z| z.norm()).fold(0.0, f64::max),
            Moment::Quadrupole(c) => c.iter().map(|z| z.norm()).fold(0.0, f64::max),
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Moment::Scalar(s) => s.is_finite(),
            Moment::Dipole(c) => c.iter().all(|z| z.is_finite()),
            Moment::Quadrupole(c) => c.iter().all(|z| z.is_finite()),
        }
    }
}

/// One transition: energy gap, moment and the two state indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Energy gap in eV
    pub energy: f64,
    /// Transition moment
    pub moment: Moment,
    /// Origin state index
    pub from: usize,
    /// Destination state index
    pub to: usize,
}

impl TransitionRecord {
    /// Create a new transition record
    pub fn new(energy: f64, moment: Moment, from: usize, to: usize) -> Self {
        Self {
            energy,
            moment,
            from,
            to,
        }
    }
}

/// Validated, immutable sequence of transition records
///
/// Guarantees positive state indices, finite values, a single moment kind and
/// at most one record per ordered `(from, to)` pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<TransitionRecord>", into = "Vec<TransitionRecord>")]
pub struct TransitionTable {
    records: Vec<TransitionRecord>,
    kind: Option<MomentKind>,
}

impl TransitionTable {
    /// Build a table, validating every record
    pub fn new(records: Vec<TransitionRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut kind = None;

        for record in &records {
            if record.from == 0 || record.to == 0 {
                return Err(TransitionError::InvalidIndex(format!(
                    "state indices start at 1, got {} -> {}",
                    record.from, record.to
                )));
            }
            if !record.energy.is_finite() || !record.moment.is_finite() {
                return Err(TransitionError::InvalidValue(format!(
                    "non-finite data in transition {} -> {}",
                    record.from, record.to
                )));
            }
            if !seen.insert((record.from, record.to)) {
                return Err(TransitionError::DuplicateTransition {
                    from: record.from,
                    to: record.to,
                });
            }
            match kind {
                None => kind = Some(record.moment.kind()),
                Some(k) if k != record.moment.kind() => {
                    return Err(TransitionError::MixedMoments(format!(
                        "{} and {} moments in one table",
                        k,
                        record.moment.kind()
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self { records, kind })
    }

    /// The records in input order
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// Iterate over the records
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Moment kind shared by all records, `None` for an empty table
    pub fn kind(&self) -> Option<MomentKind> {
        self.kind
    }

    /// Swap origin and destination of every record, keeping the energy gap
    ///
    /// Reader output lists transitions from the lower to the upper state. An
    /// emission leg runs from the intermediate (upper) state to the final
    /// (lower) one, so tables read for the emission step are reversed here.
    pub fn emission_legs(&self) -> TransitionTable {
        let records = self
            .records
            .iter()
            .map(|r| TransitionRecord::new(r.energy, r.moment, r.to, r.from))
            .collect();
        Self {
            records,
            kind: self.kind,
        }
    }

    /// Keep only records whose origin is one of `states`; empty keeps all
    pub fn restrict_origins(&self, states: &[usize]) -> TransitionTable {
        if states.is_empty() {
            return self.clone();
        }
        let records: Vec<_> = self
            .records
            .iter()
            .filter(|r| states.contains(&r.from))
            .copied()
            .collect();
        let kind = if records.is_empty() { None } else { self.kind };
        Self { records, kind }
    }

    /// Records grouped by origin state
    pub fn by_origin(&self) -> HashMap<usize, Vec<&TransitionRecord>> {
        let mut index: HashMap<usize, Vec<&TransitionRecord>> = HashMap::new();
        for record in &self.records {
            index.entry(record.from).or_default().push(record);
        }
        index
    }
}

impl TryFrom<Vec<TransitionRecord>> for TransitionTable {
    type Error = TransitionError;

    fn try_from(records: Vec<TransitionRecord>) -> Result<Self> {
        TransitionTable::new(records)
    }
}

impl From<TransitionTable> for Vec<TransitionRecord> {
    fn from(table: TransitionTable) -> Self {
        table.records
    }
}
