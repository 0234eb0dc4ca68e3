/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Lab-frame positions of the analysers and the detector
//!
//! The sample sits at the origin in both frames.

use super::circle::RowlandCircle;
use super::config::Frame;
use super::errors::{Result, RowlandError};
use crate::utils::{det_pos_rotated, rotate, rotate_about_x, DetectorStages, Vector3D};
use log::warn;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// Offsets of the analyser centre induced by a miscut
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiscutOffset {
    /// Offset along the sample-analyser direction (mm)
    pub horizontal: f64,
    /// Offset across the analyser surface (mm)
    pub vertical: f64,
    /// The vertical offset is larger than half the analyser width
    pub exceeds_half_width: bool,
}

impl RowlandCircle {
    /// Detector centre position
    pub fn get_det_pos(&self) -> Vector3D {
        let (p, q) = (self.p(), self.q());
        let rtheta = self.rtheta0();
        match self.config().frame {
            Frame::Horizontal => Vector3D::new(
                0.0,
                p + q * (2.0 * rtheta).cos(),
                q * (2.0 * rtheta).sin(),
            ),
            Frame::Vertical { .. } => {
                let det = Vector3D::new(0.0, (p - q) * rtheta.sin(), (p + q) * rtheta.cos());
                self.to_lab(det)
            }
        }
    }

    /// Centre position of an analyser tilted by `chi` (deg) on the
    /// sagittal plane
    pub fn get_ana_pos(&self, chi: f64) -> Result<Vector3D> {
        let p = self.p();
        let rtheta = self.rtheta0();
        match self.config().frame {
            Frame::Horizontal => {
                let center = Vector3D::new(0.0, p, 0.0);
                if chi == 0.0 {
                    return Ok(center);
                }
                rotate(center, self.get_det_pos(), chi.to_radians()).ok_or_else(|| {
                    RowlandError::GeometryError("sample-detector axis has zero length".to_string())
                })
            }
            Frame::Vertical { .. } => {
                let center = Vector3D::new(0.0, p * rtheta.sin(), p * rtheta.cos());
                if chi == 0.0 {
                    return Ok(self.to_lab(center));
                }
                let side = rotate(center, Vector3D::unit_z(), chi.to_radians()).ok_or_else(|| {
                    RowlandError::GeometryError("degenerate rotation axis".to_string())
                })?;
                Ok(self.to_lab(side))
            }
        }
    }

    /// Detector stage positions in a frame rotated by `rotation_deg`
    /// around X (see [`crate::utils::det_pos_rotated`])
    pub fn det_pos_rotated(&self, rotation_deg: f64, offsets: (f64, f64)) -> DetectorStages {
        det_pos_rotated(self.get_det_pos(), rotation_deg, offsets)
    }

    /// Analyser centre offsets produced by the miscut angle
    ///
    /// At zero miscut the offsets are `(-p, 0)` in the horizontal frame and
    /// `(0, 0)` in the vertical one.
    pub fn get_miscut_off(&self) -> MiscutOffset {
        let config = self.config();
        let ralpha = config.alpha.to_radians();
        let (horizontal, vertical) = match config.frame {
            Frame::Horizontal => {
                let p = self.p();
                (-p * (ralpha / 2.0).cos(), -p * (ralpha / 2.0).sin())
            }
            Frame::Vertical { .. } => {
                let r = self.rowland_radius();
                (-r * (1.0 - ralpha.cos()), -r * ralpha.sin())
            }
        };
        let half_width = config.analyser_width / 2.0;
        let exceeds_half_width = half_width > 0.0 && vertical.abs() > half_width;
        if exceeds_half_width {
            warn!(
                "miscut offset {:.3} mm exceeds the analyser half-width {:.3} mm",
                vertical.abs(),
                half_width
            );
        }
        MiscutOffset {
            horizontal,
            vertical,
            exceeds_half_width,
        }
    }

    /// Vertical frame positions, optionally tilted by (theta0 - 90) deg
    /// around X so that the central analyser lies on the horizontal plane
    fn to_lab(&self, position: Vector3D) -> Vector3D {
        match self.config().frame {
            Frame::Vertical {
                rotate_horizontal: true,
            } => rotate_about_x(position, self.rtheta0() - FRAC_PI_2),
            _ => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowland::RowlandConfig;
    use approx::assert_relative_eq;

    fn circle(theta: f64, frame: Frame) -> RowlandCircle {
        RowlandCircle::new(
            RowlandConfig::new(1000.0, theta, 3.1356)
                .with_analyser(25.0, 32.0, 0.0, 0.0)
                .with_frame(frame),
        )
        .unwrap()
    }

    #[test]
    fn test_horizontal_positions_on_rowland_circle() {
        let rc = circle(60.0, Frame::Horizontal);
        let ana = rc.get_ana_pos(0.0).unwrap();
        let det = rc.get_det_pos();
        assert_relative_eq!(ana.distance(&Vector3D::origin()), rc.p(), epsilon = 1e-9);
        assert_relative_eq!(ana.distance(&det), rc.q(), epsilon = 1e-9);
        assert_relative_eq!(det.length(), rc.sd(), epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_side_analyser_keeps_distances() {
        let rc = circle(60.0, Frame::Horizontal);
        let side = rc.get_ana_pos(8.0).unwrap();
        let det = rc.get_det_pos();
        assert!(side.x.abs() > 1.0);
        assert_relative_eq!(side.length(), rc.p(), epsilon = 1e-9);
        assert_relative_eq!(side.distance(&det), rc.q(), epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_positions() {
        let rc = circle(
            40.0,
            Frame::Vertical {
                rotate_horizontal: false,
            },
        );
        let det = rc.get_det_pos();
        assert_relative_eq!(det.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(det.z, rc.sd(), epsilon = 1e-9);
        let ana = rc.get_ana_pos(0.0).unwrap();
        assert_relative_eq!(ana.length(), rc.p(), epsilon = 1e-9);
        assert_relative_eq!(ana.distance(&det), rc.q(), epsilon = 1e-9);

        // rotation around Z keeps the height
        let side = rc.get_ana_pos(10.0).unwrap();
        assert_relative_eq!(side.z, ana.z, epsilon = 1e-9);
        assert_relative_eq!(side.distance(&det), rc.q(), epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_rotated_to_horizontal() {
        let rc = circle(
            40.0,
            Frame::Vertical {
                rotate_horizontal: true,
            },
        );
        // the central analyser ends on the horizontal plane
        let ana = rc.get_ana_pos(0.0).unwrap();
        assert_relative_eq!(ana.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ana.length(), rc.p(), epsilon = 1e-9);
    }

    #[test]
    fn test_miscut_reduces_at_zero() {
        let rc = circle(60.0, Frame::Horizontal);
        let off = rc.get_miscut_off();
        assert_eq!(off.horizontal, -rc.p());
        assert_eq!(off.vertical, 0.0);
        assert!(!off.exceeds_half_width);

        let rc = circle(
            60.0,
            Frame::Vertical {
                rotate_horizontal: false,
            },
        );
        let off = rc.get_miscut_off();
        assert_eq!(off.horizontal, 0.0);
        assert_eq!(off.vertical, 0.0);
    }

    #[test]
    fn test_miscut_flags_large_offsets() {
        let rc = RowlandCircle::new(
            RowlandConfig::new(1000.0, 60.0, 3.1356)
                .with_analyser(25.0, 32.0, 0.0, 0.0)
                .with_miscut(5.0),
        )
        .unwrap();
        let off = rc.get_miscut_off();
        assert_relative_eq!(off.vertical, -rc.p() * 2.5f64.to_radians().sin(), epsilon = 1e-12);
        assert!(off.exceeds_half_width);
    }

    fn vertical_miscut(analyser_width: f64) -> RowlandCircle {
        RowlandCircle::new(
            RowlandConfig::new(1000.0, 60.0, 3.1356)
                .with_analyser(analyser_width, 32.0, 0.0, 0.0)
                .with_miscut(5.0)
                .with_frame(Frame::Vertical {
                    rotate_horizontal: false,
                }),
        )
        .unwrap()
    }

    #[test]
    fn test_vertical_miscut_offsets() {
        let ralpha = 5f64.to_radians();
        let off = vertical_miscut(25.0).get_miscut_off();
        assert_relative_eq!(off.horizontal, -500.0 * (1.0 - ralpha.cos()), epsilon = 1e-12);
        assert_relative_eq!(off.vertical, -500.0 * ralpha.sin(), epsilon = 1e-12);
        assert!(off.exceeds_half_width);
    }

    #[test]
    fn test_vertical_miscut_flag_at_half_width() {
        let offset = 500.0 * 5f64.to_radians().sin();
        let flagged = |width: f64| vertical_miscut(width).get_miscut_off().exceeds_half_width;
        // an offset of exactly half the width still fits
        assert!(!flagged(2.0 * offset));
        assert!(!flagged(2.0 * offset + 1e-6));
        assert!(flagged(2.0 * offset - 1e-6));
        // no width, no flag
        assert!(!flagged(0.0));
    }
}
