/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Diffractor focusing geometries
//!
//! Each case fixes four radii in units of R1', the bending radius of the
//! diffracting planes: R1 (surface) and R1' (planes) in the meridional
//! direction x, R2 (surface) and R2' (planes) in the sagittal direction z.
//!
//! | code | case               | label     | R1  | R1' | R2      | R2'     |
//! |------|--------------------|-----------|-----|-----|---------|---------|
//! | 1    | Johann             | Jn        | 1   | 1   | inf     | inf     |
//! | 2    | Johansson          | Js        | 0.5 | 1   | inf     | inf     |
//! | 3    | Spherical Jn       | SphJn     | 1   | 1   | 1       | 1       |
//! | 4    | Spherical Js       | SphJs     | 0.5 | 1   | 0.5     | 1       |
//! | 5    | Wittry             | TorJs     | 0.5 | 1   | 1       | 1       |
//! | 6    | Js 45 deg focusing | Js45focus | 0.5 | 1   | 0.5     | 0.5     |
//! | 7    | Js focusing        | JsFocus   | 0.5 | 1   | sin^2 t | sin^2 t |
//! | 8    | Berreman           | Berreman  | inf | 1   | sin^2 t | sin^2 t |
//! | 9    | Jn focusing        | JnFocus   | 1   | 1   | sin^2 t | sin^2 t |
//! | 10   | Von Hamos          | VH        | inf | inf | 1       | 1       |
//!
//! Codes are part of the persisted scan format and never change.

use super::errors::{DthetaError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Curvature radius in units of R1'
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
    Finite(f64),
    /// Flat direction
    Infinite,
}

impl Radius {
    /// `1/R`, exactly zero for a flat direction
    pub fn inverse(self) -> f64 {
        match self {
            Radius::Finite(r) => 1.0 / r,
            Radius::Infinite => 0.0,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Radius::Infinite)
    }
}

/// The four radii of a case at a given Bragg angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseRadii {
    pub r1: Radius,
    pub r1p: Radius,
    pub r2: Radius,
    pub r2p: Radius,
}

/// Naming style used when mapping a code back to a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Compact label, e.g. `SphJn`
    Short,
    /// Descriptive name, e.g. `Spherical Jn`
    Long,
}

/// Point-to-point focusing geometry of a bent crystal diffractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiffractorCase {
    Johann,
    Johansson,
    SphericalJohann,
    SphericalJohansson,
    /// Toroidal Johansson
    Wittry,
    Johansson45Focus,
    JohanssonFocus,
    Berreman,
    JohannFocus,
    VonHamos,
}

/// Every label and synonym accepted for each case
static SYNONYMS: &[(&str, DiffractorCase)] = &[
    ("Johann", DiffractorCase::Johann),
    ("Jn", DiffractorCase::Johann),
    ("Johansson", DiffractorCase::Johansson),
    ("Js", DiffractorCase::Johansson),
    ("Spherical plate", DiffractorCase::SphericalJohann),
    ("Spherical Jn", DiffractorCase::SphericalJohann),
    ("SphJn", DiffractorCase::SphericalJohann),
    ("Spherical Johansson", DiffractorCase::SphericalJohansson),
    ("Spherical Js", DiffractorCase::SphericalJohansson),
    ("SphJs", DiffractorCase::SphericalJohansson),
    ("Wittry", DiffractorCase::Wittry),
    ("Toroidal Js", DiffractorCase::Wittry),
    ("TorJs", DiffractorCase::Wittry),
    ("Js 45 deg focusing", DiffractorCase::Johansson45Focus),
    ("Js45focus", DiffractorCase::Johansson45Focus),
    ("Js focusing", DiffractorCase::JohanssonFocus),
    ("JsFocus", DiffractorCase::JohanssonFocus),
    ("Berreman", DiffractorCase::Berreman),
    ("Jn focusing", DiffractorCase::JohannFocus),
    ("JnFocus", DiffractorCase::JohannFocus),
    ("Von Hamos", DiffractorCase::VonHamos),
    ("VH", DiffractorCase::VonHamos),
];

static CASE_BY_LABEL: Lazy<HashMap<&'static str, DiffractorCase>> =
    Lazy::new(|| SYNONYMS.iter().copied().collect());

impl DiffractorCase {
    /// All cases in code order
    pub const ALL: [DiffractorCase; 10] = [
        DiffractorCase::Johann,
        DiffractorCase::Johansson,
        DiffractorCase::SphericalJohann,
        DiffractorCase::SphericalJohansson,
        DiffractorCase::Wittry,
        DiffractorCase::Johansson45Focus,
        DiffractorCase::JohanssonFocus,
        DiffractorCase::Berreman,
        DiffractorCase::JohannFocus,
        DiffractorCase::VonHamos,
    ];

    /// Stable integer code (1-10)
    pub fn code(self) -> u8 {
        match self {
            DiffractorCase::Johann => 1,
            DiffractorCase::Johansson => 2,
            DiffractorCase::SphericalJohann => 3,
            DiffractorCase::SphericalJohansson => 4,
            DiffractorCase::Wittry => 5,
            DiffractorCase::Johansson45Focus => 6,
            DiffractorCase::JohanssonFocus => 7,
            DiffractorCase::Berreman => 8,
            DiffractorCase::JohannFocus => 9,
            DiffractorCase::VonHamos => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|case| case.code() == code)
    }

    /// Case for any accepted label or synonym (exact match)
    pub fn from_label(label: &str) -> Option<Self> {
        CASE_BY_LABEL.get(label).copied()
    }

    /// Compact label
    pub fn label(self) -> &'static str {
        match self {
            DiffractorCase::Johann => "Jn",
            DiffractorCase::Johansson => "Js",
            DiffractorCase::SphericalJohann => "SphJn",
            DiffractorCase::SphericalJohansson => "SphJs",
            DiffractorCase::Wittry => "TorJs",
            DiffractorCase::Johansson45Focus => "Js45focus",
            DiffractorCase::JohanssonFocus => "JsFocus",
            DiffractorCase::Berreman => "Berreman",
            DiffractorCase::JohannFocus => "JnFocus",
            DiffractorCase::VonHamos => "VH",
        }
    }

    /// Descriptive name
    pub fn name(self) -> &'static str {
        match self {
            DiffractorCase::Johann => "Johann",
            DiffractorCase::Johansson => "Johansson",
            DiffractorCase::SphericalJohann => "Spherical Jn",
            DiffractorCase::SphericalJohansson => "Spherical Johansson",
            DiffractorCase::Wittry => "Toroidal Js",
            DiffractorCase::Johansson45Focus => "Js 45 deg focusing",
            DiffractorCase::JohanssonFocus => "Js focusing",
            DiffractorCase::Berreman => "Berreman",
            DiffractorCase::JohannFocus => "Jn focusing",
            DiffractorCase::VonHamos => "Von Hamos",
        }
    }

    /// Radii of this case at the Bragg angle `rtheta` (rad)
    pub fn radii(self, rtheta: f64) -> CaseRadii {
        use Radius::{Finite, Infinite};
        let focus = Finite(rtheta.sin().powi(2));
        let (r1, r1p, r2, r2p) = match self {
            DiffractorCase::Johann => (Finite(1.0), Finite(1.0), Infinite, Infinite),
            DiffractorCase::Johansson => (Finite(0.5), Finite(1.0), Infinite, Infinite),
            DiffractorCase::SphericalJohann => (Finite(1.0), Finite(1.0), Finite(1.0), Finite(1.0)),
            DiffractorCase::SphericalJohansson => {
                (Finite(0.5), Finite(1.0), Finite(0.5), Finite(1.0))
            }
            DiffractorCase::Wittry => (Finite(0.5), Finite(1.0), Finite(1.0), Finite(1.0)),
            DiffractorCase::Johansson45Focus => {
                (Finite(0.5), Finite(1.0), Finite(0.5), Finite(0.5))
            }
            DiffractorCase::JohanssonFocus => (Finite(0.5), Finite(1.0), focus, focus),
            DiffractorCase::Berreman => (Infinite, Finite(1.0), focus, focus),
            DiffractorCase::JohannFocus => (Finite(1.0), Finite(1.0), focus, focus),
            DiffractorCase::VonHamos => (Infinite, Infinite, Finite(1.0), Finite(1.0)),
        };
        CaseRadii { r1, r1p, r2, r2p }
    }
}

impl fmt::Display for DiffractorCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DiffractorCase {
    type Err = DthetaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s.trim()).ok_or_else(|| DthetaError::UnknownCase(s.to_string()))
    }
}

impl TryFrom<u8> for DiffractorCase {
    type Error = DthetaError;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| DthetaError::UnknownCase(format!("code {}", code)))
    }
}

impl TryFrom<String> for DiffractorCase {
    type Error = DthetaError;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<DiffractorCase> for String {
    fn from(case: DiffractorCase) -> Self {
        case.label().to_string()
    }
}

/// Integer code of a case label; 0 for unknown labels
pub fn map_case_to_num(label: &str) -> u8 {
    DiffractorCase::from_label(label).map_or(0, DiffractorCase::code)
}

/// Label of a case code; `"Unknown"` for unknown codes
pub fn map_num_to_case(code: u8, style: LabelStyle) -> &'static str {
    match (DiffractorCase::from_code(code), style) {
        (Some(case), LabelStyle::Short) => case.label(),
        (Some(case), LabelStyle::Long) => case.name(),
        (None, _) => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        for (i, case) in DiffractorCase::ALL.iter().enumerate() {
            assert_eq!(case.code() as usize, i + 1);
        }
        assert_eq!(DiffractorCase::from_code(0), None);
        assert_eq!(DiffractorCase::from_code(11), None);
    }

    #[test]
    fn test_every_synonym_maps_to_its_case() {
        assert_eq!(map_case_to_num("Spherical plate"), 3);
        assert_eq!(map_case_to_num("Wittry"), 5);
        assert_eq!(map_case_to_num("TorJs"), 5);
        assert_eq!(map_case_to_num("JnFocus"), 9);
        assert_eq!(map_case_to_num("VH"), 10);
        assert_eq!(map_case_to_num("johann"), 0);
        assert_eq!(map_case_to_num(""), 0);
        for (label, case) in SYNONYMS {
            assert_eq!(map_case_to_num(label), case.code());
        }
    }

    #[test]
    fn test_labels_roundtrip() {
        for code in 1..=10u8 {
            assert_eq!(map_case_to_num(map_num_to_case(code, LabelStyle::Short)), code);
            assert_eq!(map_case_to_num(map_num_to_case(code, LabelStyle::Long)), code);
        }
        assert_eq!(map_num_to_case(0, LabelStyle::Long), "Unknown");
        assert_eq!(map_num_to_case(42, LabelStyle::Short), "Unknown");
    }

    #[test]
    fn test_parse_and_display() {
        let case: DiffractorCase = " Spherical Js ".parse().unwrap();
        assert_eq!(case, DiffractorCase::SphericalJohansson);
        assert_eq!(case.to_string(), "SphJs");
        assert_eq!(
            "Rowland".parse::<DiffractorCase>(),
            Err(DthetaError::UnknownCase("Rowland".to_string()))
        );
        assert_eq!(DiffractorCase::try_from(8u8), Ok(DiffractorCase::Berreman));
        assert!(DiffractorCase::try_from(0u8).is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&DiffractorCase::JohanssonFocus).unwrap();
        assert_eq!(json, "\"JsFocus\"");
        let case: DiffractorCase = serde_json::from_str("\"Wittry\"").unwrap();
        assert_eq!(case, DiffractorCase::Wittry);
        assert!(serde_json::from_str::<DiffractorCase>("\"Bragg\"").is_err());
    }

    #[test]
    fn test_radii() {
        let rtheta = 30f64.to_radians();
        let radii = DiffractorCase::JohanssonFocus.radii(rtheta);
        assert_eq!(radii.r2, Radius::Finite(rtheta.sin().powi(2)));
        assert!(DiffractorCase::Johann.radii(rtheta).r2p.is_infinite());
        assert_eq!(Radius::Infinite.inverse(), 0.0);
        assert_eq!(Radius::Finite(0.5).inverse(), 2.0);
    }
}
