/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Geometry primitives shared by the Rowland circle and bender solvers
//!
//! Angles passed to these helpers are in radians unless the name says
//! otherwise; lengths are in millimetres.

use super::vector::Vector3D;

/// Rotate `vector` by `angle` radians around `axis` (right-hand rule)
///
/// Uses the Euler-Rodrigues formula. The axis does not need to be
/// normalised, but it must have a direction: `None` is returned for a
/// zero-length axis.
pub fn rotate(vector: Vector3D, axis: Vector3D, angle: f64) -> Option<Vector3D> {
    let k = axis.normalize()?;
    let (sin, cos) = angle.sin_cos();
    Some(vector * cos + k.cross(&vector) * sin + k * (k.dot(&vector) * (1.0 - cos)))
}

/// Rotate `vector` by `angle` radians around the X axis (right-hand rule)
pub fn rotate_about_x(vector: Vector3D, angle: f64) -> Vector3D {
    let (sin, cos) = angle.sin_cos();
    Vector3D::new(
        vector.x,
        vector.y * cos - vector.z * sin,
        vector.y * sin + vector.z * cos,
    )
}

/// Height of the circular segment cut by a chord of length `chord` in a
/// circle of radius `radius`
///
/// Returns `None` when the chord does not fit in the circle (`chord >= 2R`).
pub fn circular_segment_height(chord: f64, radius: f64) -> Option<f64> {
    if !(chord.abs() < 2.0 * radius) {
        return None;
    }
    Some(radius - (radius * radius - chord * chord / 4.0).sqrt())
}

/// Detector stage positions in a frame rotated around the X axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorStages {
    /// Position along the rotated (parallel) axis
    pub parallel: f64,
    /// Position along the rotated (perpendicular) axis
    pub perpendicular: f64,
}

/// Re-project a detector position (assumed on the YZ plane) into a frame
/// rotated counter-clockwise by `rotation_deg` around X, with the stage
/// origins shifted by `offsets = (y0, z0)`
///
/// The sign of the perpendicular stage follows the usual stage convention:
/// it grows toward the sample side of the rotated axis.
pub fn det_pos_rotated(position: Vector3D, rotation_deg: f64, offsets: (f64, f64)) -> DetectorStages {
    let dr = position.y.hypot(position.z);
    let alpha = position.z.atan2(position.y) - rotation_deg.to_radians();
    DetectorStages {
        parallel: dr * alpha.cos() - offsets.0,
        perpendicular: offsets.1 - dr * alpha.sin(),
    }
}

/// `asin` that refuses arguments outside `[-1, 1]` instead of returning NaN
pub fn checked_asin(value: f64) -> Option<f64> {
    if (-1.0..=1.0).contains(&value) {
        Some(value.asin())
    } else {
        None
    }
}

/// `acos` that refuses arguments outside `[-1, 1]` instead of returning NaN
pub fn checked_acos(value: f64) -> Option<f64> {
    if (-1.0..=1.0).contains(&value) {
        Some(value.acos())
    } else {
        None
    }
}
