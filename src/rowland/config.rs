/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Design-time configuration of a Rowland circle spectrometer
//!
//! Units: lengths in mm, angles in deg, d-spacing in Angstrom.

use super::errors::{Result, RowlandError};
use crate::crystal::{d_cubic, SI_ALAT};
use serde::{Deserialize, Serialize};

/// Lab frame in which the Rowland circle lies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Frame {
    /// Sample-analyser along Y, dispersion in the YZ plane, off-axis
    /// analysers rotated around the sample-detector axis
    #[default]
    Horizontal,
    /// Sample-detector along Z, off-axis analysers rotated around Z
    Vertical {
        /// Rotate positions by (90 - theta0) around X to lie horizontal
        #[serde(default)]
        rotate_horizontal: bool,
    },
}

/// Two-bar linkage bending a ganged row of analysers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum BenderLinkage {
    /// Friction prototype: two arms joined at a fixed angle
    Prototype {
        /// Arm anchoring the last pivot to the actuator (mm)
        arm0: f64,
        /// Arm from the bender point to the trapezoids (mm)
        arm: f64,
        /// Angle between the two arms (deg)
        angle: f64,
    },
    /// Pantograph mechanics
    Pantograph {
        /// First arm length (mm)
        arm0: f64,
        /// Second arm length (mm)
        arm: f64,
        /// Distance between the anchor and the actuator (mm)
        anchor: f64,
    },
}

impl BenderLinkage {
    /// Length of the arm that closes the triangle on the pivot chord
    pub fn arm(&self) -> f64 {
        match *self {
            BenderLinkage::Prototype { arm, .. } | BenderLinkage::Pantograph { arm, .. } => arm,
        }
    }

    /// Length of the arm reaching the anchor point B
    pub fn arm0(&self) -> f64 {
        match *self {
            BenderLinkage::Prototype { arm0, .. } | BenderLinkage::Pantograph { arm0, .. } => arm0,
        }
    }
}

/// Linear actuator driving the bender anchor point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actuator {
    /// Fixed axial offset of the actuator line (mm)
    pub axoff: f64,
    /// Actuator arm length (mm)
    pub arm: f64,
}

/// Rowland circle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowlandConfig {
    /// Meridional bending radius of the analyser (mm); the Rowland circle
    /// radius is half of it
    pub rm: f64,
    /// Bragg angle of the central analyser (deg)
    pub theta0: f64,
    /// Crystal d-spacing (Angstrom)
    pub d_spacing: f64,
    /// Miscut angle between surface and diffracting planes (deg); positive
    /// values give q > p
    pub alpha: f64,
    /// Optical width of one analyser (mm)
    pub analyser_width: f64,
    /// Extended width at which adjacent analysers touch (mm)
    pub analyser_width_ext: f64,
    /// Offset added to the sagittal radius where the extended width applies (mm)
    pub sagittal_radius_ext: f64,
    /// Distance of the chi pivot behind the analyser surface (mm)
    pub pivot_distance: f64,
    /// Lab frame convention
    pub frame: Frame,
    /// Bender linkage, if the analysers are ganged
    pub bender: Option<BenderLinkage>,
    /// Actuator driving the bender
    pub actuator: Option<Actuator>,
}

impl Default for RowlandConfig {
    fn default() -> Self {
        Self {
            rm: 1000.0,
            theta0: 75.0,
            d_spacing: d_cubic(SI_ALAT, [4, 4, 4]).unwrap_or(SI_ALAT / 48f64.sqrt()),
            alpha: 0.0,
            analyser_width: 0.0,
            analyser_width_ext: 0.0,
            sagittal_radius_ext: 0.0,
            pivot_distance: 0.0,
            frame: Frame::Horizontal,
            bender: None,
            actuator: None,
        }
    }
}

impl RowlandConfig {
    /// Create a configuration with the mandatory parameters
    pub fn new(rm: f64, theta0: f64, d_spacing: f64) -> Self {
        Self {
            rm,
            theta0,
            d_spacing,
            ..Self::default()
        }
    }

    /// Set the analyser widths and pivot distance
    pub fn with_analyser(mut self, width: f64, width_ext: f64, radius_ext: f64, pivot: f64) -> Self {
        self.analyser_width = width;
        self.analyser_width_ext = width_ext;
        self.sagittal_radius_ext = radius_ext;
        self.pivot_distance = pivot;
        self
    }

    /// Set the miscut angle (deg)
    pub fn with_miscut(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the lab frame
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Attach a bender linkage and its actuator
    pub fn with_bender(mut self, bender: BenderLinkage, actuator: Actuator) -> Self {
        self.bender = Some(bender);
        self.actuator = Some(actuator);
        self
    }

    /// Check the configuration invariants
    pub fn validate(&self) -> Result<()> {
        validate_theta(self.theta0)?;
        if !(self.rm.is_finite() && self.rm > 0.0) {
            return Err(RowlandError::GeometryError(format!(
                "bending radius must be positive, got {}",
                self.rm
            )));
        }
        if !(self.d_spacing.is_finite() && self.d_spacing > 0.0) {
            return Err(RowlandError::GeometryError(format!(
                "d-spacing must be positive, got {}",
                self.d_spacing
            )));
        }
        if !(self.alpha.abs() < self.theta0) {
            return Err(RowlandError::GeometryError(format!(
                "miscut {} deg must be smaller than theta0 {} deg",
                self.alpha, self.theta0
            )));
        }
        let lengths = [
            ("analyser width", self.analyser_width),
            ("extended width", self.analyser_width_ext),
            ("sagittal radius offset", self.sagittal_radius_ext),
        ];
        for (name, value) in lengths {
            if !value.is_finite() {
                return Err(RowlandError::GeometryError(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if !(self.pivot_distance.is_finite() && self.pivot_distance >= 0.0) {
            return Err(RowlandError::GeometryError(format!(
                "pivot distance must be non-negative, got {}",
                self.pivot_distance
            )));
        }
        Ok(())
    }
}

/// Reject Bragg angles outside (0, 90) deg
pub(crate) fn validate_theta(theta: f64) -> Result<()> {
    if theta > 0.0 && theta < 90.0 {
        Ok(())
    } else {
        Err(RowlandError::InvalidAngle(theta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RowlandConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert_eq!(
            RowlandConfig::new(500.0, 90.0, 3.0).validate(),
            Err(RowlandError::InvalidAngle(90.0))
        );
        assert!(matches!(
            RowlandConfig::new(0.0, 45.0, 3.0).validate(),
            Err(RowlandError::GeometryError(_))
        ));
        assert!(matches!(
            RowlandConfig::new(500.0, 45.0, -1.0).validate(),
            Err(RowlandError::GeometryError(_))
        ));
        assert!(matches!(
            RowlandConfig::new(500.0, 30.0, 3.0)
                .with_miscut(35.0)
                .validate(),
            Err(RowlandError::GeometryError(_))
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = RowlandConfig::new(500.0, 65.0, 3.1356)
            .with_analyser(25.0, 32.0, 10.0, 97.0)
            .with_frame(Frame::Vertical {
                rotate_horizontal: true,
            })
            .with_bender(
                BenderLinkage::Prototype {
                    arm0: 40.0,
                    arm: 60.0,
                    angle: 100.0,
                },
                Actuator {
                    axoff: 269.0,
                    arm: 135.0,
                },
            );
        let json = serde_json::to_string(&config).unwrap();
        let back: RowlandConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        // missing fields fall back to defaults
        let partial: RowlandConfig = serde_json::from_str(r#"{"rm": 500.0, "theta0": 35.0}"#).unwrap();
        assert_eq!(partial.rm, 500.0);
        assert_eq!(partial.frame, Frame::Horizontal);
        assert!(partial.bender.is_none());
    }
}
