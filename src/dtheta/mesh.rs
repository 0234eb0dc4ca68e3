/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Aperture masks over the diffractor surface
//!
//! Grids are normalised by the bending radius Rm. Rows run along z
//! (sagittal), columns along x (meridional), and both shapes share the
//! same sample points: only the mask differs. A `true` mask cell lies
//! outside the aperture.

use super::errors::{DthetaError, Result};
use log::debug;
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outline of the analyser aperture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApertureShape {
    /// Disc of radius `half_width`
    #[default]
    Circular,
    /// Strip of half-height `half_height` across the full x range
    Rectangular,
}

impl ApertureShape {
    /// Integer code written in scan files
    pub fn code(self) -> u8 {
        match self {
            ApertureShape::Circular => 1,
            ApertureShape::Rectangular => 2,
        }
    }
}

impl fmt::Display for ApertureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApertureShape::Circular => f.write_str("circular"),
            ApertureShape::Rectangular => f.write_str("rectangular"),
        }
    }
}

impl FromStr for ApertureShape {
    type Err = DthetaError;

    /// Accepts any label containing `circ` or `rect`, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        if lower.contains("circ") {
            Ok(ApertureShape::Circular)
        } else if lower.contains("rect") {
            Ok(ApertureShape::Rectangular)
        } else {
            Err(DthetaError::InvalidGrid(format!("unknown aperture shape '{}'", s)))
        }
    }
}

/// Mesh parameters, as kept in a sweep configuration file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub shape: ApertureShape,
    /// Bending radius of the crystal planes (mm)
    pub rm: f64,
    /// Disc radius, or half side along x for a rectangle (mm)
    pub half_width: f64,
    /// Half side along z of a rectangle (mm)
    pub half_height: f64,
    /// Points per axis
    pub resolution: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            shape: ApertureShape::Circular,
            rm: 1000.0,
            half_width: 50.0,
            half_height: 10.0,
            resolution: 1000,
        }
    }
}

impl MeshConfig {
    pub fn build(&self) -> Result<ApertureMesh> {
        get_mesh(
            self.shape,
            self.rm,
            self.half_width,
            self.half_height,
            self.resolution,
        )
    }
}

/// Masked coordinate grids of an aperture
#[derive(Debug, Clone)]
pub struct ApertureMesh {
    config: MeshConfig,
    x: Array2<f64>,
    z: Array2<f64>,
    mask: Array2<bool>,
}

impl ApertureMesh {
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn shape(&self) -> ApertureShape {
        self.config.shape
    }

    /// Meridional coordinates (units of Rm)
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Sagittal coordinates (units of Rm)
    pub fn z(&self) -> &Array2<f64> {
        &self.z
    }

    /// `true` outside the aperture
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Number of cells inside the aperture
    pub fn unmasked_count(&self) -> usize {
        self.mask.iter().filter(|&&masked| !masked).count()
    }

    /// Grid step along x (first row)
    pub fn step_x(&self) -> f64 {
        self.x[[0, 1]] - self.x[[0, 0]]
    }

    /// Grid step along z (first column)
    pub fn step_z(&self) -> f64 {
        self.z[[1, 0]] - self.z[[0, 0]]
    }

    /// Area of one cell (units of Rm^2)
    ///
    /// Uses the x step, falling back to the z step when x collapses.
    pub fn cell_area(&self) -> Result<f64> {
        let (dx, dz) = (self.step_x(), self.step_z());
        if dx != 0.0 {
            Ok(dx * dx)
        } else if dz != 0.0 {
            Ok(dz * dz)
        } else {
            Err(DthetaError::DegenerateGrid(format!(
                "zero cell size for a {} aperture of half-width {} mm",
                self.config.shape, self.config.half_width
            )))
        }
    }

    /// Area of the aperture (units of Rm^2)
    pub fn unmasked_area(&self) -> Result<f64> {
        Ok(self.unmasked_count() as f64 * self.cell_area()?)
    }
}

/// Build the masked grid of an aperture
///
/// # Arguments
///
/// * `shape` - Aperture outline
/// * `rm` - Bending radius used to normalise the coordinates (mm)
/// * `half_width` - Disc radius or half side along x (mm)
/// * `half_height` - Half side along z of a rectangle (mm)
/// * `resolution` - Points per axis, at least 2
pub fn get_mesh(
    shape: ApertureShape,
    rm: f64,
    half_width: f64,
    half_height: f64,
    resolution: usize,
) -> Result<ApertureMesh> {
    if resolution <= 1 {
        return Err(DthetaError::InvalidGrid(format!(
            "resolution must be at least 2, got {}",
            resolution
        )));
    }
    if !(rm.is_finite() && rm > 0.0) {
        return Err(DthetaError::InvalidGrid(format!(
            "bending radius must be positive, got {}",
            rm
        )));
    }
    if !(half_width.is_finite() && half_width >= 0.0 && half_height.is_finite() && half_height >= 0.0)
    {
        return Err(DthetaError::InvalidGrid(format!(
            "aperture half-sizes must be non-negative, got {} x {}",
            half_width, half_height
        )));
    }

    let extent = half_width / rm;
    let axis = Array1::linspace(-extent, extent, resolution);
    let x = Array2::from_shape_fn((resolution, resolution), |(_, j)| axis[j]);
    let z = Array2::from_shape_fn((resolution, resolution), |(i, _)| axis[i]);

    let mask = match shape {
        ApertureShape::Circular => {
            let r2 = extent * extent;
            Zip::from(&x)
                .and(&z)
                .map_collect(|&x, &z| x * x + z * z > r2)
        }
        ApertureShape::Rectangular => {
            let zmax = half_height / rm;
            z.mapv(|z| z.abs() > zmax)
        }
    };

    let mesh = ApertureMesh {
        config: MeshConfig {
            shape,
            rm,
            half_width,
            half_height,
            resolution,
        },
        x,
        z,
        mask,
    };
    debug!(
        "{} mesh {}x{}: {} cells inside",
        shape,
        resolution,
        resolution,
        mesh.unmasked_count()
    );
    Ok(mesh)
}
