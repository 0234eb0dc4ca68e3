/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Interplanar spacing calculator
//!
//! Lattice constants are in Angstroms and angles in degrees. The general
//! (triclinic) expression is evaluated through the reciprocal metric; the
//! other systems use their closed forms.

use super::errors::{CrystalError, Result};
use serde::{Deserialize, Serialize};

/// Silicon lattice constant at 25 C (Angstrom)
pub const SI_ALAT: f64 = 5.431065;
/// Germanium lattice constant at 25 C (Angstrom)
pub const GE_ALAT: f64 = 5.657906;
/// Indium antimonide lattice constant (Angstrom)
pub const INSB_ALAT: f64 = 6.48;
/// Beta-quartz (hexagonal) lattice constant a (Angstrom)
pub const SIO2_A: f64 = 4.913;
/// Beta-quartz (hexagonal) lattice constant c (Angstrom)
pub const SIO2_C: f64 = 5.405;

/// Crystal system together with its lattice constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum CrystalSystem {
    Cubic {
        a: f64,
    },
    Tetragonal {
        a: f64,
        c: f64,
    },
    Orthorhombic {
        a: f64,
        b: f64,
        c: f64,
    },
    Hexagonal {
        a: f64,
        c: f64,
    },
    /// Unique axis b, `beta` in degrees
    Monoclinic {
        a: f64,
        b: f64,
        c: f64,
        beta: f64,
    },
    /// Cell angles in degrees
    Triclinic {
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    },
}

impl CrystalSystem {
    /// Name of the crystal system
    pub fn name(&self) -> &'static str {
        match self {
            CrystalSystem::Cubic { .. } => "cubic",
            CrystalSystem::Tetragonal { .. } => "tetragonal",
            CrystalSystem::Orthorhombic { .. } => "orthorhombic",
            CrystalSystem::Hexagonal { .. } => "hexagonal",
            CrystalSystem::Monoclinic { .. } => "monoclinic",
            CrystalSystem::Triclinic { .. } => "triclinic",
        }
    }

    fn validate(&self) -> Result<()> {
        let lengths = match *self {
            CrystalSystem::Cubic { a } => vec![a],
            CrystalSystem::Tetragonal { a, c } | CrystalSystem::Hexagonal { a, c } => vec![a, c],
            CrystalSystem::Orthorhombic { a, b, c }
            | CrystalSystem::Monoclinic { a, b, c, .. }
            | CrystalSystem::Triclinic { a, b, c, .. } => vec![a, b, c],
        };
        if lengths.iter().any(|l| !(l.is_finite() && *l > 0.0)) {
            return Err(CrystalError::InvalidLattice(format!(
                "{} lattice constants must be positive, got {:?}",
                self.name(),
                lengths
            )));
        }
        let angles = match *self {
            CrystalSystem::Monoclinic { beta, .. } => vec![beta],
            CrystalSystem::Triclinic {
                alpha, beta, gamma, ..
            } => vec![alpha, beta, gamma],
            _ => Vec::new(),
        };
        if angles.iter().any(|ang| !(*ang > 0.0 && *ang < 180.0)) {
            return Err(CrystalError::InvalidLattice(format!(
                "{} cell angles must lie in (0, 180) deg, got {:?}",
                self.name(),
                angles
            )));
        }
        Ok(())
    }

    /// Interplanar spacing (Angstrom) of the (hkl) planes
    pub fn d_spacing(&self, hkl: [i32; 3]) -> Result<f64> {
        self.validate()?;
        if hkl == [0, 0, 0] {
            return Err(CrystalError::InvalidPlane(
                "(000) is not a lattice plane".to_string(),
            ));
        }
        let (h, k, l) = (hkl[0] as f64, hkl[1] as f64, hkl[2] as f64);

        let inv_d2 = match *self {
            CrystalSystem::Cubic { a } => (h * h + k * k + l * l) / (a * a),
            CrystalSystem::Tetragonal { a, c } => (h * h + k * k) / (a * a) + l * l / (c * c),
            CrystalSystem::Orthorhombic { a, b, c } => {
                h * h / (a * a) + k * k / (b * b) + l * l / (c * c)
            }
            CrystalSystem::Hexagonal { a, c } => {
                4.0 / 3.0 * (h * h + h * k + k * k) / (a * a) + l * l / (c * c)
            }
            CrystalSystem::Monoclinic { a, b, c, beta } => {
                let (sin_b, cos_b) = beta.to_radians().sin_cos();
                (h * h / (a * a) + k * k * sin_b * sin_b / (b * b) + l * l / (c * c)
                    - 2.0 * h * l * cos_b / (a * c))
                    / (sin_b * sin_b)
            }
            CrystalSystem::Triclinic {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            } => {
                let (sa, ca) = alpha.to_radians().sin_cos();
                let (sb, cb) = beta.to_radians().sin_cos();
                let (sg, cg) = gamma.to_radians().sin_cos();
                let v2 = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
                if v2 <= 0.0 {
                    return Err(CrystalError::InvalidLattice(format!(
                        "cell angles ({}, {}, {}) do not span a volume",
                        alpha, beta, gamma
                    )));
                }
                let volume2 = (a * b * c) * (a * b * c) * v2;
                let s11 = (b * c * sa).powi(2);
                let s22 = (a * c * sb).powi(2);
                let s33 = (a * b * sg).powi(2);
                let s12 = a * b * c * c * (ca * cb - cg);
                let s23 = a * a * b * c * (cb * cg - ca);
                let s13 = a * b * b * c * (cg * ca - cb);
                (s11 * h * h
                    + s22 * k * k
                    + s33 * l * l
                    + 2.0 * s12 * h * k
                    + 2.0 * s23 * k * l
                    + 2.0 * s13 * h * l)
                    / volume2
            }
        };

        if !(inv_d2.is_finite() && inv_d2 > 0.0) {
            return Err(CrystalError::InvalidPlane(format!(
                "({} {} {}) gives a non-physical spacing in the {} system",
                hkl[0],
                hkl[1],
                hkl[2],
                self.name()
            )));
        }
        Ok(1.0 / inv_d2.sqrt())
    }
}

/// A reflecting lattice plane of a named material
///
/// The d-spacing is computed once at construction and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticePlane {
    material: String,
    system: CrystalSystem,
    hkl: [i32; 3],
    d_spacing: f64,
}

impl LatticePlane {
    /// Create a lattice plane, validating the lattice and the reflection
    pub fn new(material: impl Into<String>, system: CrystalSystem, hkl: [i32; 3]) -> Result<Self> {
        let d_spacing = system.d_spacing(hkl)?;
        Ok(Self {
            material: material.into(),
            system,
            hkl,
            d_spacing,
        })
    }

    /// Silicon reflection
    pub fn silicon(hkl: [i32; 3]) -> Result<Self> {
        Self::new("Si", CrystalSystem::Cubic { a: SI_ALAT }, hkl)
    }

    /// Germanium reflection
    pub fn germanium(hkl: [i32; 3]) -> Result<Self> {
        Self::new("Ge", CrystalSystem::Cubic { a: GE_ALAT }, hkl)
    }

    /// Material label
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Crystal system and lattice constants
    pub fn system(&self) -> &CrystalSystem {
        &self.system
    }

    /// Miller indices
    pub fn hkl(&self) -> [i32; 3] {
        self.hkl
    }

    /// Interplanar spacing in Angstrom
    pub fn d_spacing(&self) -> f64 {
        self.d_spacing
    }

    /// Short label such as `Si(444)`
    pub fn label(&self) -> String {
        format!(
            "{}({}{}{})",
            self.material, self.hkl[0], self.hkl[1], self.hkl[2]
        )
    }
}

/// d-spacing of a cubic lattice
pub fn d_cubic(a: f64, hkl: [i32; 3]) -> Result<f64> {
    CrystalSystem::Cubic { a }.d_spacing(hkl)
}

/// d-spacing of a hexagonal lattice
pub fn d_hexagonal(a: f64, c: f64, hkl: [i32; 3]) -> Result<f64> {
    CrystalSystem::Hexagonal { a, c }.d_spacing(hkl)
}
