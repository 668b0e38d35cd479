/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Tensor assembly
//!
//! Joins the ground→intermediate table with the intermediate→final table on
//! the shared intermediate index and builds one scattering tensor per
//! `(g, n, f)` path. The outgoing moment is complex-conjugated (emission) and
//! both legs pass through optional real 3x3 polarization filters. In the lab
//! frame a rotation `R` fixes the molecular orientation before the tensor
//! product is formed.

use super::errors::{Result, RixsError};
use super::tensor::ScatteringTensor;
use crate::transitions::{Moment, MomentKind, TransitionRecord, TransitionTable};
use crate::utils::constants::GEOMETRY_TOLERANCE;
use crate::utils::{check_matrix3, complexify, identity3, real_matvec};
use log::{debug, info};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::collections::HashMap;

/// Real 3x3 polarization filters applied to the two legs
///
/// Dipole absorption legs use `incoming_left` only; quadrupole absorption
/// legs become `incoming_left · Q · incoming_right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub incoming_left: Array2<f64>,
    pub incoming_right: Array2<f64>,
    pub outgoing: Array2<f64>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            incoming_left: identity3(),
            incoming_right: identity3(),
            outgoing: identity3(),
        }
    }
}

impl Filters {
    /// Filters for a dipole-dipole calculation
    pub fn dipole(incoming: Array2<f64>, outgoing: Array2<f64>) -> Self {
        Self {
            incoming_left: incoming,
            incoming_right: identity3(),
            outgoing,
        }
    }

    fn validate(&self) -> Result<()> {
        check_matrix3(&self.incoming_left, "left incoming filter")?;
        check_matrix3(&self.incoming_right, "right incoming filter")?;
        check_matrix3(&self.outgoing, "outgoing filter")?;
        Ok(())
    }
}

/// Frame in which tensors are expressed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Frame {
    /// Molecular frame; orientation averaging is left to the projector
    #[default]
    Molecular,
    /// Lab frame reached through the given rotation matrix
    Lab(Array2<f64>),
}

/// Indices of one scattering path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatePath {
    pub ground: usize,
    pub intermediate: usize,
    pub final_state: usize,
}

impl StatePath {
    pub fn new(ground: usize, intermediate: usize, final_state: usize) -> Self {
        Self {
            ground,
            intermediate,
            final_state,
        }
    }
}

/// Tensor and leg energies of one path
#[derive(Debug, Clone, PartialEq)]
pub struct TensorEntry {
    /// Absorption energy `E_gn` in eV
    pub e_gn: f64,
    /// Emission energy `E_nf` in eV
    pub e_nf: f64,
    pub tensor: ScatteringTensor,
}

impl TensorEntry {
    /// Raman energy loss `E_gn - E_nf` carried by this path
    pub fn raman_loss(&self) -> f64 {
        self.e_gn - self.e_nf
    }
}

/// Paths of one `(g, f)` channel, intermediate states ascending
pub type ChannelPaths<'a> = Vec<(usize, &'a TensorEntry)>;

/// Sparse map from `(g, n, f)` to the path tensor, built once per spectrum
#[derive(Debug, Clone, Default)]
pub struct TensorMap {
    entries: HashMap<StatePath, TensorEntry>,
}

impl TensorMap {
    /// Look up a path; `None` means the path does not exist
    pub fn get(
        &self,
        ground: usize,
        intermediate: usize,
        final_state: usize,
    ) -> Option<&TensorEntry> {
        self.entries
            .get(&StatePath::new(ground, intermediate, final_state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatePath, &TensorEntry)> {
        self.entries.iter()
    }

    /// Rank of the stored tensors
    pub fn rank(&self) -> Option<usize> {
        self.entries.values().next().map(|e| e.tensor.rank())
    }

    /// Largest ground, intermediate and final index present
    pub fn max_indices(&self) -> (usize, usize, usize) {
        self.entries.keys().fold((0, 0, 0), |(g, n, f), p| {
            (g.max(p.ground), n.max(p.intermediate), f.max(p.final_state))
        })
    }

    /// Paths grouped by `(g, f)` channel, ordered by ground then final state
    pub fn channels(&self) -> Vec<((usize, usize), ChannelPaths<'_>)> {
        let mut paths: Vec<(&StatePath, &TensorEntry)> = self.entries.iter().collect();
        paths.sort_by_key(|(p, _)| (p.ground, p.final_state, p.intermediate));

        let mut channels: Vec<((usize, usize), ChannelPaths<'_>)> = Vec::new();
        for (path, entry) in paths {
            let key = (path.ground, path.final_state);
            match channels.last_mut() {
                Some((last, members)) if *last == key => members.push((path.intermediate, entry)),
                _ => channels.push((key, vec![(path.intermediate, entry)])),
            }
        }
        channels
    }
}

/// Builds the `(g, n, f)` tensor map from two transition tables
#[derive(Debug, Clone, Default)]
pub struct TensorAssembler {
    filters: Filters,
    frame: Frame,
}

impl TensorAssembler {
    /// Plane-wave assembler with identity filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polarization filters
    pub fn set_filters(&mut self, filters: Filters) -> &mut Self {
        self.filters = filters;
        self
    }

    /// Set the frame (molecular or rotated lab frame)
    pub fn set_frame(&mut self, frame: Frame) -> &mut Self {
        self.frame = frame;
        self
    }

    /// Assemble the tensor map
    ///
    /// An absorption record `g → n` joins every emission record whose origin
    /// is `n`. Records without a partner are skipped. An empty result is
    /// reported as [`RixsError::NoValidPaths`].
    pub fn assemble(
        &self,
        absorption: &TransitionTable,
        emission: &TransitionTable,
    ) -> Result<TensorMap> {
        self.filters.validate()?;
        if let Frame::Lab(rotation) = &self.frame {
            check_rotation(rotation)?;
        }

        let (Some(in_kind), Some(out_kind)) = (absorption.kind(), emission.kind()) else {
            return Err(RixsError::MissingData(format!(
                "absorption table has {} records, emission table has {}",
                absorption.len(),
                emission.len()
            )));
        };
        check_coupling(in_kind, out_kind)?;

        let by_origin = emission.by_origin();
        let mut entries = HashMap::new();

        for leg_in in absorption.iter() {
            let Some(partners) = by_origin.get(&leg_in.to) else {
                continue;
            };
            for leg_out in partners {
                let tensor = self.couple(leg_in, leg_out)?;
                entries.insert(
                    StatePath::new(leg_in.from, leg_in.to, leg_out.to),
                    TensorEntry {
                        e_gn: leg_in.energy,
                        e_nf: leg_out.energy,
                        tensor,
                    },
                );
            }
        }

        if entries.is_empty() {
            return Err(RixsError::NoValidPaths {
                absorption: absorption.len(),
                emission: emission.len(),
            });
        }

        info!(
            "Assembled {} {}-{} scattering paths",
            entries.len(),
            in_kind,
            out_kind
        );
        debug!(
            "{} absorption and {} emission records joined",
            absorption.len(),
            emission.len()
        );

        Ok(TensorMap { entries })
    }

    fn couple(
        &self,
        leg_in: &TransitionRecord,
        leg_out: &TransitionRecord,
    ) -> Result<ScatteringTensor> {
        match (&leg_in.moment, &leg_out.moment) {
            (Moment::Scalar(a), Moment::Scalar(b)) => Ok(ScatteringTensor::Scalar((a * b).abs())),
            (Moment::Dipole(_), Moment::Dipole(_)) => {
                let t_gn = real_matvec(&self.filters.incoming_left, &dipole(&leg_in.moment)?);
                let t_nf = self.outgoing_leg(&leg_out.moment)?;
                let tensor = ScatteringTensor::dipole_dipole(&t_gn, &t_nf);
                match (&self.frame, tensor) {
                    (Frame::Lab(r), ScatteringTensor::Rank2(t)) => {
                        let r = complexify(r);
                        Ok(ScatteringTensor::Rank2(r.dot(&t).dot(&r.t())))
                    }
                    (_, tensor) => Ok(tensor),
                }
            }
            (Moment::Quadrupole(_), Moment::Dipole(_)) => {
                let q = leg_in.moment.quadrupole_matrix().ok_or_else(|| {
                    RixsError::IncompatibleMoments(
                        "expected a quadrupole absorption leg".to_string(),
                    )
                })?;
                let left = complexify(&self.filters.incoming_left);
                let right = complexify(&self.filters.incoming_right);
                let mut t_gn = left.dot(&q).dot(&right);
                let mut t_nf = self.outgoing_leg(&leg_out.moment)?;
                if let Frame::Lab(r) = &self.frame {
                    let r = complexify(r);
                    t_gn = r.dot(&t_gn).dot(&r.t());
                    t_nf = r.dot(&t_nf);
                }
                Ok(ScatteringTensor::quadrupole_dipole(&t_gn, &t_nf))
            }
            (a, b) => Err(RixsError::IncompatibleMoments(format!(
                "cannot couple {} absorption with {} emission",
                a.kind(),
                b.kind()
            ))),
        }
    }

    /// Filtered, complex-conjugated emission moment
    fn outgoing_leg(&self, moment: &Moment) -> Result<Array1<Complex64>> {
        let conj = dipole(moment)?.mapv(|z| z.conj());
        Ok(real_matvec(&self.filters.outgoing, &conj))
    }
}

fn dipole(moment: &Moment) -> Result<Array1<Complex64>> {
    moment.dipole_vector().ok_or_else(|| {
        RixsError::IncompatibleMoments(format!("expected a dipole moment, got {}", moment.kind()))
    })
}

/// A lab frame needs an orthogonal matrix, `Rᵀ·R = 1`
fn check_rotation(rotation: &Array2<f64>) -> Result<()> {
    check_matrix3(rotation, "frame rotation")?;
    let deviation = (rotation.t().dot(rotation) - identity3())
        .iter()
        .fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if deviation > GEOMETRY_TOLERANCE {
        return Err(RixsError::MalformedGeometry(format!(
            "frame rotation is not orthogonal (|RᵀR - 1| = {:.3e})",
            deviation
        )));
    }
    Ok(())
}

fn check_coupling(incoming: MomentKind, outgoing: MomentKind) -> Result<()> {
    match (incoming, outgoing) {
        (MomentKind::Scalar, MomentKind::Scalar)
        | (MomentKind::Dipole, MomentKind::Dipole)
        | (MomentKind::Quadrupole, MomentKind::Dipole) => Ok(()),
        _ => Err(RixsError::IncompatibleMoments(format!(
            "{} absorption cannot be combined with {} emission",
            incoming, outgoing
        ))),
    }
}
