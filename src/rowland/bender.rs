/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Two-bar linkage bending a ganged row of analysers
//!
//! The mechanism works on the local sagittal plane of the last three
//! analysers of the row (indices n-2, n-1, n). Point C lies on the radius
//! through analyser n-1, pushed outward by the aperture `dc` of the
//! linkage; point B is the anchor where the actuator arm attaches. The
//! actuator slides along a line of fixed axial offset.

use super::circle::RowlandCircle;
use super::config::{Actuator, BenderLinkage, RowlandConfig};
use super::errors::{Result, RowlandError};
use super::pivot::PivotSolution;
use crate::utils::{checked_acos, checked_asin};
use log::debug;
use serde::Serialize;
use std::f64::consts::PI;

/// Point on the local sagittal plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SagittalPoint {
    /// Axial offset (mm)
    pub axoff: f64,
    /// Sagittal offset (mm)
    pub sagoff: f64,
}

/// Solved state of the bender for one Bragg angle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenderSolution {
    /// Index of the outermost analyser driven by the linkage
    pub index: i32,
    /// Chi angles (deg) of analysers n-2, n-1, n
    pub chis: [f64; 3],
    /// Pivots of analysers n-2, n-1, n
    pub pivots: [PivotSolution; 3],
    /// Aperture of the linkage along the radius of analyser n-1 (mm)
    pub dc: f64,
    /// Anchor point B
    pub anchor: SagittalPoint,
    /// Actuator motor position (mm)
    pub actuator_position: f64,
}

/// Linkage plus actuator of a ganged analyser row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenderMechanism {
    linkage: BenderLinkage,
    actuator: Actuator,
}

impl BenderMechanism {
    pub fn new(linkage: BenderLinkage, actuator: Actuator) -> Self {
        Self { linkage, actuator }
    }

    /// Mechanism described by a configuration, if it has one
    pub fn from_config(config: &RowlandConfig) -> Option<Self> {
        match (config.bender, config.actuator) {
            (Some(linkage), Some(actuator)) => Some(Self::new(linkage, actuator)),
            _ => None,
        }
    }

    pub fn linkage(&self) -> &BenderLinkage {
        &self.linkage
    }

    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// Solve the linkage and the actuator position for the row ending at
    /// analyser `index` (`index >= 3`)
    pub fn solve(&self, circle: &RowlandCircle, index: i32) -> Result<BenderSolution> {
        if index < 3 {
            return Err(RowlandError::GeometryError(format!(
                "the bender needs at least three analysers per side, got index {}",
                index
            )));
        }
        let chis = [
            circle.get_chi2(index - 2, None)?,
            circle.get_chi2(index - 1, None)?,
            circle.get_chi2(index, None)?,
        ];
        let dchi = chis[2] - chis[0];
        debug!("chi{} = {:.5} deg, delta chi = {:.5} deg", index, chis[2], dchi);

        let pivots = [
            circle.pivot_solution(circle.get_axoff(chis[0]))?,
            circle.pivot_solution(circle.get_axoff(chis[1]))?,
            circle.pivot_solution(circle.get_axoff(chis[2]))?,
        ];

        // triangle closed by `arm` on the chord between pivots n-2 and n
        let radius = circle.rs() + circle.pivot_distance();
        let rdchi = (dchi / 2.0).to_radians();
        let height = radius * (1.0 - rdchi.cos());
        let chalf = radius * rdchi.sin();
        let arm = self.linkage.arm();
        let ra = acos_or_fail(chalf / arm, "arm too short for the pivot chord")?;
        let dc = arm * ra.sin() - height;

        let anchor = self.anchor_point(circle, &chis, &pivots, dc)?;
        debug!(
            "bender point B (local sagittal reference): aXoff = {:.5}, SagOff = {:.5}",
            anchor.axoff, anchor.sagoff
        );
        let actuator_position = self.actuator_position(&anchor)?;

        Ok(BenderSolution {
            index,
            chis,
            pivots,
            dc,
            anchor,
            actuator_position,
        })
    }

    /// Anchor point B of the linkage
    fn anchor_point(
        &self,
        circle: &RowlandCircle,
        chis: &[f64; 3],
        pivots: &[PivotSolution; 3],
        dc: f64,
    ) -> Result<SagittalPoint> {
        let radius = circle.rs() + circle.pivot_distance();
        match self.linkage {
            BenderLinkage::Prototype { arm0, arm, angle } => {
                let sc = circle.get_axoff_at(chis[1], circle.rs() + dc);
                let last = &pivots[2];
                let rb = acos_or_fail((last.axoff - sc) / arm, "point C out of reach")?;
                let rc = PI - angle.to_radians() - rb;
                Ok(SagittalPoint {
                    axoff: last.axoff + arm0 * rc.cos(),
                    sagoff: last.sagoff - arm0 * rc.sin(),
                })
            }
            BenderLinkage::Pantograph { arm0, .. } => {
                let adc = asin_or_fail(dc / 2.0 / arm0, "pantograph aperture exceeds the first arm")?;
                let pdc = arm0 * adc.cos();
                let pa = (pdc / (radius + dc / 2.0)).atan();
                let ph = radius * (1.0 - pa.cos());
                let pchalf = radius * pa.sin();
                let pra = acos_or_fail(pchalf / arm0, "anchor chord longer than the first arm")?;
                let pdc = arm0 * pra.sin() - ph;
                let pchi = pa + chis[2].to_radians();
                let prs = radius + pdc;
                Ok(SagittalPoint {
                    axoff: prs * pchi.sin(),
                    sagoff: radius - prs * pchi.cos(),
                })
            }
        }
    }

    /// Motor position of the actuator whose arm reaches `anchor`
    pub fn actuator_position(&self, anchor: &SagittalPoint) -> Result<f64> {
        let reach = match self.linkage {
            BenderLinkage::Prototype { .. } => self.actuator.axoff - anchor.axoff,
            BenderLinkage::Pantograph { anchor: length, .. } => {
                self.actuator.axoff - length - anchor.axoff
            }
        };
        let rd = asin_or_fail(reach / self.actuator.arm, "actuator arm cannot reach point B")?;
        Ok(self.actuator.arm * rd.cos() + anchor.sagoff)
    }
}

fn asin_or_fail(value: f64, what: &str) -> Result<f64> {
    checked_asin(value)
        .ok_or_else(|| RowlandError::NotConverged(format!("{}: asin({:.6})", what, value)))
}

fn acos_or_fail(value: f64, what: &str) -> Result<f64> {
    checked_acos(value)
        .ok_or_else(|| RowlandError::NotConverged(format!("{}: acos({:.6})", what, value)))
}
