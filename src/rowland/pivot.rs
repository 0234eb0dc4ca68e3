/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Pivot point of an off-axis analyser on the sagittal plane

use serde::{Deserialize, Serialize};

/// Position of an analyser pivot on the local sagittal plane
///
/// The sagittal plane origin is the chi pivot of the central analyser,
/// `pivot_distance` behind its surface. `axoff` grows to the right of the
/// central analyser when looking at the sample and `sagoff` grows toward
/// the sample. The `_ideal` companions are the same point solved on the
/// analyser surface (sagittal radius `Rs`, pivot distance 0) instead of
/// the pivot radius `Rs + pivot_distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotSolution {
    /// Chi tilt at the pivot (deg)
    pub chi: f64,
    /// Axial offset of the pivot (mm)
    pub axoff: f64,
    /// Sagittal offset of the pivot (mm)
    pub sagoff: f64,
    /// Chi tilt solved on the analyser surface (deg)
    pub chi_ideal: f64,
    /// Axial offset of the analyser surface centre (mm)
    pub axoff_ideal: f64,
    /// Sagittal offset of the analyser surface centre (mm)
    pub sagoff_ideal: f64,
}
