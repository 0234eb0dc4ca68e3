/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Analytical angular deviation from the Bragg condition over a diffractor
//!
//! Wittry and Sun, J. Appl. Phys. 71 (1992) 564, table I; Pestehe,
//! J. Appl. Cryst. 45 (2012) 890, eqs. 12-13. Valid for an ideal point
//! source on the Rowland circle and a diffractor small compared with the
//! focal circle:
//!
//! ```text
//! dtheta(x, z) = A1 x^2 + A2 x^3 + A3 z^2 + A4 x z^2
//! A1  = cot(t) (1 - 1/(2 R1))
//! A2  = cot(t)^2 (1 - 1/(2 R1))
//! A3  = tan(t)/2 (1/R2 - 1/R2' - A4') + (2/R2' - 1/R2 - 1) / (2 sin(t) cos(t))
//! A4  = 1/(2 R2) - A4'/2 + (1/R2' - 1/(2 R2) - 1) / sin(t)^2
//! A4' = (1 - R2') / R2'^2
//! ```
//!
//! Coordinates and radii are in units of R1'.

use super::case::DiffractorCase;
use super::errors::{DthetaError, Result};
use log::debug;
use ndarray::{Array2, Zip};
use serde::Serialize;

/// Expansion coefficients of the deviation for one case and Bragg angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coefficients {
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a4: f64,
    /// Intermediate term, zero for flat or unit sagittal planes
    pub a4p: f64,
}

impl Coefficients {
    /// Coefficients of `case` at Bragg angle `theta` (deg)
    pub fn new(case: DiffractorCase, theta: f64) -> Result<Self> {
        validate_theta(theta)?;
        let rtheta = theta.to_radians();
        let radii = case.radii(rtheta);
        let (sin, cos) = rtheta.sin_cos();
        let tan = sin / cos;
        let cot = cos / sin;

        let inv_r1 = radii.r1.inverse();
        let inv_r2 = radii.r2.inverse();
        let inv_r2p = radii.r2p.inverse();
        // flat sagittal radii give 0 here instead of inf/inf
        let a4p = if radii.r2.is_infinite() || radii.r2p.is_infinite() || inv_r2p == 1.0 {
            0.0
        } else {
            (1.0 - 1.0 / inv_r2p) * inv_r2p * inv_r2p
        };

        let meridional = 1.0 - inv_r1 / 2.0;
        let coefficients = Self {
            a1: cot * meridional,
            a2: cot * cot * meridional,
            a3: tan / 2.0 * (inv_r2 - inv_r2p - a4p)
                + (2.0 * inv_r2p - inv_r2 - 1.0) / (2.0 * sin * cos),
            a4: inv_r2 / 2.0 - a4p / 2.0 + (inv_r2p - inv_r2 / 2.0 - 1.0) / (sin * sin),
            a4p,
        };
        debug!(
            "{} at {} deg: radii {:?}, coefficients {:?}",
            case.name(),
            theta,
            radii,
            coefficients
        );
        Ok(coefficients)
    }

    /// Deviation (rad) at one point
    pub fn evaluate(&self, x: f64, z: f64) -> f64 {
        let z2 = z * z;
        self.a1 * x * x + self.a2 * x * x * x + self.a3 * z2 + self.a4 * x * z2
    }
}

/// Deviation (rad) from the Bragg angle at point (x, z) of the diffractor
pub fn deviation(x: f64, z: f64, theta: f64, case: DiffractorCase) -> Result<f64> {
    Ok(Coefficients::new(case, theta)?.evaluate(x, z))
}

/// Deviation field (rad) over coordinate grids of identical shape
pub fn deviation_field(
    x: &Array2<f64>,
    z: &Array2<f64>,
    theta: f64,
    case: DiffractorCase,
) -> Result<Array2<f64>> {
    if x.dim() != z.dim() {
        return Err(DthetaError::InvalidGrid(format!(
            "x grid {:?} and z grid {:?} differ in shape",
            x.dim(),
            z.dim()
        )));
    }
    let coefficients = Coefficients::new(case, theta)?;
    Ok(Zip::from(x)
        .and(z)
        .map_collect(|&x, &z| coefficients.evaluate(x, z)))
}

pub(crate) fn validate_theta(theta: f64) -> Result<()> {
    if theta > 0.0 && theta < 90.0 {
        Ok(())
    } else {
        Err(DthetaError::InvalidAngle(theta))
    }
}
