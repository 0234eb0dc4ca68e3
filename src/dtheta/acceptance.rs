/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Effective acceptance of a diffractor
//!
//! For a given case and Bragg angle, the cells of an aperture whose
//! deviation stays within the rocking curve width `wrc` reflect; their
//! area divided by `sin(theta)` is the effective solid angle. The energy
//! resolution combines the deviation spread over the whole aperture with
//! `wrc`:
//!
//! ```text
//! sa   = sum(accepted cell areas) / sin(theta)
//! eres = sqrt((max(dtheta) - min(dtheta))^2 + wrc^2) / tan(theta)
//! ```

use super::case::DiffractorCase;
use super::deviation::{deviation_field, validate_theta};
use super::errors::{DthetaError, Result};
use super::mesh::{ApertureMesh, MeshConfig};
use log::{debug, info, warn};
use ndarray::Zip;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the deviation is compared with the rocking curve width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Reject cells with `|dtheta| > wrc`
    #[default]
    Absolute,
    /// Reject cells with `dtheta > wrc`
    Signed,
}

impl ThresholdMode {
    fn rejects(self, dtheta: f64, wrc: f64) -> bool {
        match self {
            ThresholdMode::Absolute => dtheta.abs() > wrc,
            ThresholdMode::Signed => dtheta > wrc,
        }
    }
}

/// Rocking curve width (rad), shared or one per Bragg angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RockingWidth {
    Uniform(f64),
    /// One width per angle, in the order of the angle list
    PerAngle(Vec<f64>),
}

impl Default for RockingWidth {
    fn default() -> Self {
        RockingWidth::Uniform(1.25e-4)
    }
}

impl RockingWidth {
    /// Width to use for the `index`-th angle
    pub fn at(&self, index: usize) -> Option<f64> {
        match self {
            RockingWidth::Uniform(wrc) => Some(*wrc),
            RockingWidth::PerAngle(widths) => widths.get(index).copied(),
        }
    }

    /// Smallest width, bounding any scale shared by all angles
    pub fn display_bound(&self) -> f64 {
        match self {
            RockingWidth::Uniform(wrc) => *wrc,
            RockingWidth::PerAngle(widths) => widths.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    /// Check the widths against the number of angles of a sweep
    pub fn validate(&self, n_angles: usize) -> Result<()> {
        self.check_len(n_angles)?;
        let widths: &[f64] = match self {
            RockingWidth::Uniform(wrc) => std::slice::from_ref(wrc),
            RockingWidth::PerAngle(widths) => widths,
        };
        widths.iter().try_for_each(|&wrc| validate_width(wrc))
    }

    /// A per-angle list must hold exactly one width per angle
    fn check_len(&self, n_angles: usize) -> Result<()> {
        match self {
            RockingWidth::PerAngle(widths) if widths.len() != n_angles => {
                Err(DthetaError::InvalidThreshold(format!(
                    "{} widths given for {} angles",
                    widths.len(),
                    n_angles
                )))
            }
            _ => Ok(()),
        }
    }
}

fn validate_width(wrc: f64) -> Result<()> {
    if wrc.is_finite() && wrc >= 0.0 {
        Ok(())
    } else {
        Err(DthetaError::InvalidThreshold(format!(
            "width must be finite and non-negative, got {}",
            wrc
        )))
    }
}

/// Acceptance of one case at one Bragg angle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceResult {
    pub case: DiffractorCase,
    /// Bragg angle (deg)
    pub theta: f64,
    /// Rocking curve width used (rad)
    pub wrc: f64,
    /// Effective solid angle (units of Rm^2)
    pub solid_angle: f64,
    /// Relative energy resolution dE/E
    pub energy_resolution: f64,
    /// Cells inside the aperture and within `wrc`
    pub accepted_cells: usize,
    /// Smallest deviation over the aperture (rad)
    pub dtheta_min: f64,
    /// Largest deviation over the aperture (rad)
    pub dtheta_max: f64,
}

/// Acceptance of one case along a list of Bragg angles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceSeries {
    pub case: DiffractorCase,
    pub theta: Vec<f64>,
    pub wrc: Vec<f64>,
    pub solid_angle: Vec<f64>,
    pub energy_resolution: Vec<f64>,
}

impl AcceptanceSeries {
    fn new(case: DiffractorCase) -> Self {
        Self {
            case,
            theta: Vec::new(),
            wrc: Vec::new(),
            solid_angle: Vec::new(),
            energy_resolution: Vec::new(),
        }
    }

    fn push(&mut self, result: &AcceptanceResult) {
        self.theta.push(result.theta);
        self.wrc.push(result.wrc);
        self.solid_angle.push(result.solid_angle);
        self.energy_resolution.push(result.energy_resolution);
    }

    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }
}

/// Sweep point that could not be evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub case: DiffractorCase,
    pub theta: f64,
    pub error: DthetaError,
}

/// Outcome of a (case x angle) sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// One series per case, in the order of the case list
    pub series: Vec<AcceptanceSeries>,
    /// Points skipped, in sweep order
    pub failures: Vec<SweepFailure>,
}

/// Sweep parameters, as kept in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub cases: Vec<DiffractorCase>,
    /// Bragg angles (deg)
    pub angles: Vec<f64>,
    pub wrc: RockingWidth,
    pub mode: ThresholdMode,
    pub mesh: MeshConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            cases: vec![
                DiffractorCase::Johann,
                DiffractorCase::Johansson,
                DiffractorCase::SphericalJohann,
                DiffractorCase::Wittry,
            ],
            angles: vec![15.0, 45.0, 75.0],
            wrc: RockingWidth::default(),
            mode: ThresholdMode::default(),
            mesh: MeshConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Build the mesh and run the sweep
    pub fn run(&self) -> Result<SweepReport> {
        let mesh = self.mesh.build()?;
        AcceptanceEvaluator::new(&mesh)
            .with_mode(self.mode)
            .sweep(&self.cases, &self.angles, &self.wrc)
    }
}

/// Integrates the deviation field of a case over an aperture mesh
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceEvaluator<'a> {
    mesh: &'a ApertureMesh,
    mode: ThresholdMode,
}

impl<'a> AcceptanceEvaluator<'a> {
    pub fn new(mesh: &'a ApertureMesh) -> Self {
        Self {
            mesh,
            mode: ThresholdMode::Absolute,
        }
    }

    pub fn with_mode(mut self, mode: ThresholdMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mesh(&self) -> &ApertureMesh {
        self.mesh
    }

    /// Acceptance of `case` at Bragg angle `theta` (deg) for the rocking
    /// curve width `wrc` (rad)
    pub fn evaluate(&self, case: DiffractorCase, theta: f64, wrc: f64) -> Result<AcceptanceResult> {
        validate_theta(theta)?;
        validate_width(wrc)?;
        let cell_area = self.mesh.cell_area()?;
        let field = deviation_field(self.mesh.x(), self.mesh.z(), theta, case)?;

        let mut accepted_cells = 0usize;
        let mut dtheta_min = f64::INFINITY;
        let mut dtheta_max = f64::NEG_INFINITY;
        Zip::from(&field)
            .and(self.mesh.mask())
            .for_each(|&dtheta, &outside| {
                if outside {
                    return;
                }
                dtheta_min = dtheta_min.min(dtheta);
                dtheta_max = dtheta_max.max(dtheta);
                if !self.mode.rejects(dtheta, wrc) {
                    accepted_cells += 1;
                }
            });
        // no cell inside the aperture
        if dtheta_min > dtheta_max {
            dtheta_min = 0.0;
            dtheta_max = 0.0;
        }
        let spread = dtheta_max - dtheta_min;

        let rtheta = theta.to_radians();
        let solid_angle = accepted_cells as f64 * cell_area / rtheta.sin();
        let energy_resolution = (spread * spread + wrc * wrc).sqrt() / rtheta.tan();
        debug!(
            "{} at {} deg: {} cells accepted, sa = {:.4e}, eres = {:.4e}",
            case, theta, accepted_cells, solid_angle, energy_resolution
        );
        Ok(AcceptanceResult {
            case,
            theta,
            wrc,
            solid_angle,
            energy_resolution,
            accepted_cells,
            dtheta_min,
            dtheta_max,
        })
    }

    /// Evaluate every (case, angle) pair in parallel
    ///
    /// Series keep the order of `cases` and `angles`. A point that fails is
    /// recorded in the report and the sweep goes on; only a width list that
    /// does not match the angles aborts the sweep.
    pub fn sweep(
        &self,
        cases: &[DiffractorCase],
        angles: &[f64],
        wrc: &RockingWidth,
    ) -> Result<SweepReport> {
        wrc.check_len(angles.len())?;
        info!(
            "Sweeping {} cases x {} angles on a {} aperture (wrc bound {:.3e} rad)",
            cases.len(),
            angles.len(),
            self.mesh.shape(),
            wrc.display_bound()
        );

        let points: Vec<(usize, usize)> = (0..cases.len())
            .flat_map(|c| (0..angles.len()).map(move |a| (c, a)))
            .collect();
        let outcomes: Vec<(usize, Result<AcceptanceResult>)> = points
            .par_iter()
            .map(|&(c, a)| {
                let outcome = match wrc.at(a) {
                    Some(width) => self.evaluate(cases[c], angles[a], width),
                    None => Err(DthetaError::InvalidThreshold(format!(
                        "no width for angle #{}",
                        a
                    ))),
                };
                (a, outcome)
            })
            .collect();

        let mut series: Vec<AcceptanceSeries> =
            cases.iter().map(|&case| AcceptanceSeries::new(case)).collect();
        let mut failures = Vec::new();
        for (&(c, _), (a, outcome)) in points.iter().zip(outcomes) {
            match outcome {
                Ok(result) => series[c].push(&result),
                Err(error) => {
                    warn!("Skipping {} at {} deg: {}", cases[c], angles[a], error);
                    failures.push(SweepFailure {
                        case: cases[c],
                        theta: angles[a],
                        error,
                    });
                }
            }
        }
        Ok(SweepReport { series, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtheta::mesh::{get_mesh, ApertureShape};
    use approx::assert_relative_eq;

    fn small_mesh() -> ApertureMesh {
        get_mesh(ApertureShape::Circular, 1000.0, 50.0, 10.0, 101).unwrap()
    }

    #[test]
    fn test_rocking_width() {
        let per_angle = RockingWidth::PerAngle(vec![3e-4, 1e-4, 2e-4]);
        assert_eq!(per_angle.display_bound(), 1e-4);
        assert_eq!(per_angle.at(2), Some(2e-4));
        assert_eq!(per_angle.at(3), None);
        assert!(per_angle.validate(3).is_ok());
        assert!(matches!(
            per_angle.validate(2),
            Err(DthetaError::InvalidThreshold(_))
        ));
        assert!(RockingWidth::Uniform(-1.0).validate(5).is_err());

        let parsed: RockingWidth = serde_json::from_str("[1e-4, 2e-4]").unwrap();
        assert_eq!(parsed, RockingWidth::PerAngle(vec![1e-4, 2e-4]));
        let parsed: RockingWidth = serde_json::from_str("1.25e-4").unwrap();
        assert_eq!(parsed, RockingWidth::Uniform(1.25e-4));
    }

    #[test]
    fn test_full_acceptance_for_wide_rocking_curve() {
        let mesh = small_mesh();
        let evaluator = AcceptanceEvaluator::new(&mesh);
        let result = evaluator.evaluate(DiffractorCase::Johann, 60.0, 1.0).unwrap();
        assert_eq!(result.accepted_cells, mesh.unmasked_count());
        assert_relative_eq!(
            result.solid_angle,
            mesh.unmasked_area().unwrap() / 60f64.to_radians().sin(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_energy_resolution_uses_full_aperture() {
        let mesh = small_mesh();
        let evaluator = AcceptanceEvaluator::new(&mesh);
        let narrow = evaluator.evaluate(DiffractorCase::Johann, 45.0, 1e-6).unwrap();
        let wide = evaluator.evaluate(DiffractorCase::Johann, 45.0, 1e-3).unwrap();
        // the spread does not depend on the accepted region
        assert_eq!(narrow.dtheta_min, wide.dtheta_min);
        assert_eq!(narrow.dtheta_max, wide.dtheta_max);
        assert!(narrow.accepted_cells <= wide.accepted_cells);
        assert!(narrow.energy_resolution <= wide.energy_resolution);
        let spread = narrow.dtheta_max - narrow.dtheta_min;
        assert_relative_eq!(
            narrow.energy_resolution,
            (spread * spread + 1e-12).sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_signed_mode_accepts_negative_deviations() {
        let mesh = small_mesh();
        let absolute = AcceptanceEvaluator::new(&mesh)
            .evaluate(DiffractorCase::Johann, 30.0, 1e-5)
            .unwrap();
        let signed = AcceptanceEvaluator::new(&mesh)
            .with_mode(ThresholdMode::Signed)
            .evaluate(DiffractorCase::Johann, 30.0, 1e-5)
            .unwrap();
        assert!(signed.accepted_cells >= absolute.accepted_cells);
    }

    #[test]
    fn test_degenerate_mesh() {
        let mesh = get_mesh(ApertureShape::Circular, 1000.0, 0.0, 0.0, 11).unwrap();
        assert!(matches!(
            AcceptanceEvaluator::new(&mesh).evaluate(DiffractorCase::Johann, 45.0, 1e-4),
            Err(DthetaError::DegenerateGrid(_))
        ));
    }

    #[test]
    fn test_sweep_keeps_order_and_isolates_failures() {
        let mesh = small_mesh();
        let cases = [DiffractorCase::Johansson, DiffractorCase::Johann];
        let angles = [75.0, 95.0, 15.0, 45.0];
        let report = AcceptanceEvaluator::new(&mesh)
            .sweep(&cases, &angles, &RockingWidth::Uniform(1.25e-4))
            .unwrap();
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.series[0].case, DiffractorCase::Johansson);
        assert_eq!(report.series[1].theta, vec![75.0, 15.0, 45.0]);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.theta == 95.0 && f.error == DthetaError::InvalidAngle(95.0)));
    }

    #[test]
    fn test_sweep_rejects_mismatched_widths() {
        let mesh = small_mesh();
        let result = AcceptanceEvaluator::new(&mesh).sweep(
            &[DiffractorCase::Johann],
            &[30.0, 60.0],
            &RockingWidth::PerAngle(vec![1e-4]),
        );
        assert!(matches!(result, Err(DthetaError::InvalidThreshold(_))));
    }

    #[test]
    fn test_sweep_config_from_json() {
        let config: SweepConfig = serde_json::from_str(
            r#"{
                "cases": ["Jn", "Wittry"],
                "angles": [35.0, 65.0],
                "wrc": [1e-4, 2e-4],
                "mesh": {"shape": "rectangular", "resolution": 51}
            }"#,
        )
        .unwrap();
        assert_eq!(config.mode, ThresholdMode::Absolute);
        let report = config.run().unwrap();
        assert_eq!(report.series[1].case, DiffractorCase::Wittry);
        assert_eq!(report.series[1].wrc, vec![1e-4, 2e-4]);
        assert!(report.failures.is_empty());
    }
}
