/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Rowland circle position solver
//!
//! Lens equations (Suortti et al., J. Synchrotron Rad. 6 (1999) 69;
//! Podorov et al., J. Phys. D 34 (2001) 2363), with `Rm` the meridional
//! bending radius:
//!
//! ```text
//! p = Rm sin(theta0 - alpha)        q = Rm sin(theta0 + alpha)
//! Rs = Rm sin(theta0 - alpha) sin(theta0 + alpha)
//! ```

use super::config::{validate_theta, RowlandConfig};
use super::errors::{Result, RowlandError};
use super::pivot::PivotSolution;
use crate::utils::constants::{
    energy_to_wavelength, wavelength_to_energy, MIN_ENERGY_STEP, MIN_Z_STEP,
};
use crate::utils::{checked_asin, circular_segment_height};
use log::{debug, info};
use serde::Serialize;

/// Quantities derived from (Rm, theta0, alpha); recomputed as a whole on
/// every change of theta0
#[derive(Debug, Clone, Copy, PartialEq)]
struct Focus {
    theta0: f64,
    rtheta0: f64,
    p: f64,
    q: f64,
    rs: f64,
    sd: f64,
}

impl Focus {
    fn new(rm: f64, theta0: f64, alpha: f64) -> Self {
        let rtheta0 = theta0.to_radians();
        let ralpha = alpha.to_radians();
        let sin_p = (rtheta0 - ralpha).sin();
        let sin_q = (rtheta0 + ralpha).sin();
        Self {
            theta0,
            rtheta0,
            p: rm * sin_p,
            q: rm * sin_q,
            rs: rm * sin_p * sin_q,
            sd: rm * (2.0 * rtheta0).sin(),
        }
    }
}

/// Snapshot of the main Rowland circle parameters
#[derive(Debug, Clone, Serialize)]
pub struct RowlandSummary {
    pub theta0: f64,
    pub alpha: f64,
    pub d_spacing: f64,
    pub energy: f64,
    pub p: f64,
    pub q: f64,
    pub rm: f64,
    pub rs: f64,
    pub analyser_width: f64,
    pub analyser_width_ext: f64,
    pub pivot_distance: f64,
}

/// Rowland circle geometry for a given Bragg angle
#[derive(Debug, Clone)]
pub struct RowlandCircle {
    config: RowlandConfig,
    focus: Focus,
}

impl RowlandCircle {
    /// Create a Rowland circle from a validated configuration
    pub fn new(config: RowlandConfig) -> Result<Self> {
        config.validate()?;
        let focus = Focus::new(config.rm, config.theta0, config.alpha);
        let circle = Self { config, focus };
        circle.log_focus();
        Ok(circle)
    }

    /// Configuration this circle was built from (theta0 reflects the last
    /// successful `set_theta0`)
    pub fn config(&self) -> &RowlandConfig {
        &self.config
    }

    /// Move the central analyser to a new Bragg angle (deg)
    ///
    /// p, q, Rs and the energy are recomputed; on error the circle is left
    /// untouched.
    pub fn set_theta0(&mut self, theta0: f64) -> Result<()> {
        validate_theta(theta0)?;
        if !(self.config.alpha.abs() < theta0) {
            return Err(RowlandError::GeometryError(format!(
                "miscut {} deg must be smaller than theta0 {} deg",
                self.config.alpha, theta0
            )));
        }
        self.config.theta0 = theta0;
        self.focus = Focus::new(self.config.rm, theta0, self.config.alpha);
        self.log_focus();
        Ok(())
    }

    fn log_focus(&self) {
        info!(
            "theta0 = {:.3} deg, alpha = {:.3} deg, ene0 = {:.2} eV, p = {:.3} mm, q = {:.3} mm, Rs = {:.3} mm",
            self.focus.theta0,
            self.config.alpha,
            self.get_ene(),
            self.focus.p,
            self.focus.q,
            self.focus.rs
        );
    }

    /// Bragg angle of the central analyser (deg)
    pub fn theta0(&self) -> f64 {
        self.focus.theta0
    }

    /// Bragg angle of the central analyser (rad)
    pub fn rtheta0(&self) -> f64 {
        self.focus.rtheta0
    }

    /// Sample-analyser distance (mm)
    pub fn p(&self) -> f64 {
        self.focus.p
    }

    /// Analyser-detector distance (mm)
    pub fn q(&self) -> f64 {
        self.focus.q
    }

    /// Sagittal focusing radius at the analyser centre (mm)
    pub fn rs(&self) -> f64 {
        self.focus.rs
    }

    /// Sample-detector distance (mm)
    pub fn sd(&self) -> f64 {
        self.focus.sd
    }

    /// Meridional bending radius (mm)
    pub fn rm(&self) -> f64 {
        self.config.rm
    }

    /// Radius of the Rowland circle itself (mm)
    pub fn rowland_radius(&self) -> f64 {
        self.config.rm / 2.0
    }

    /// Crystal d-spacing (Angstrom)
    pub fn d_spacing(&self) -> f64 {
        self.config.d_spacing
    }

    /// Distance of the chi pivot behind the analyser surface (mm)
    pub fn pivot_distance(&self) -> f64 {
        self.config.pivot_distance
    }

    /// Bragg energy (eV) of the central analyser
    pub fn get_ene(&self) -> f64 {
        bragg_energy(self.config.d_spacing, self.focus.rtheta0)
    }

    /// Bragg energy (eV) at an arbitrary angle (deg)
    pub fn get_ene_at(&self, theta: f64) -> Result<f64> {
        validate_theta(theta)?;
        Ok(bragg_energy(self.config.d_spacing, theta.to_radians()))
    }

    /// Bragg angle (deg) reflecting the given energy (eV)
    pub fn get_theta(&self, energy: f64) -> Result<f64> {
        if !(energy.is_finite() && energy > 0.0) {
            return Err(RowlandError::GeometryError(format!(
                "energy must be positive, got {}",
                energy
            )));
        }
        let wavelength = energy_to_wavelength(energy);
        let sin_theta = wavelength / (2.0 * self.config.d_spacing);
        checked_asin(sin_theta)
            .map(f64::to_degrees)
            .ok_or_else(|| {
                RowlandError::NotConverged(format!(
                    "{} eV is below the Bragg cut-off of d = {} A",
                    energy, self.config.d_spacing
                ))
            })
    }

    /// Move the central analyser to the Bragg angle of `energy` (eV)
    pub fn set_ene0(&mut self, energy: f64) -> Result<()> {
        let theta = self.get_theta(energy)?;
        self.set_theta0(theta)
    }

    /// Angular step (rad) for an energy step (eV), from the differential
    /// Bragg law
    pub fn get_dth(&self, e_delta: f64) -> f64 {
        if e_delta.abs() <= MIN_ENERGY_STEP {
            return 0.0;
        }
        -(e_delta / self.get_ene()) * self.focus.rtheta0.tan()
    }

    /// Analyser Z offset (mm) for an energy step (eV)
    pub fn get_az_off(&self, e_delta: f64) -> f64 {
        if e_delta.abs() <= MIN_ENERGY_STEP {
            return 0.0;
        }
        let dth = self.get_dth(e_delta);
        debug!("dth = {:.1} urad ({:.5} deg)", dth * 1e6, dth.to_degrees());
        self.focus.p * dth.tan()
    }

    /// Analyser Y offset (mm) for an energy step (eV)
    pub fn get_ay_off(&self, e_delta: f64) -> f64 {
        if e_delta.abs() <= MIN_ENERGY_STEP {
            return 0.0;
        }
        let dth = self.get_dth(e_delta);
        self.config.rm * self.focus.rtheta0.tan() * dth.tan()
    }

    /// Energy step (eV) produced by an analyser Z offset (mm)
    pub fn get_ene_off(&self, az_off: f64) -> f64 {
        if az_off.abs() <= MIN_Z_STEP {
            return 0.0;
        }
        let dth = (az_off / self.focus.p).atan();
        self.get_ene() * dth / self.focus.rtheta0.tan()
    }

    /// Chi angle (deg) of a pivot at axial offset `axoff` (mm)
    pub fn get_chi(&self, axoff: f64) -> Result<f64> {
        self.chi_on(axoff, self.focus.rs + self.config.pivot_distance)
            .map(f64::to_degrees)
    }

    /// Chi angle (rad) of a point at `axoff` on a circle of radius `radius`
    fn chi_on(&self, axoff: f64, radius: f64) -> Result<f64> {
        checked_asin(axoff / radius).ok_or_else(|| {
            RowlandError::NotConverged(format!(
                "axial offset {:.4} mm lies outside the sagittal circle of radius {:.4} mm",
                axoff, radius
            ))
        })
    }

    /// Chi angle (deg) at which analyser `index` touches its neighbours
    ///
    /// Adjacent analysers of extended width `aWext` touch on the radius
    /// `rs` (default: `Rs + sagittal_radius_ext`) when
    /// `chi = 2 asin(aWext / (2 rs)) * index`. Negative indices are on the
    /// left of the central analyser.
    pub fn get_chi2(&self, index: i32, rs: Option<f64>) -> Result<f64> {
        let width = self.config.analyser_width_ext;
        if !(width > 0.0) {
            return Err(RowlandError::GeometryError(format!(
                "extended analyser width must be positive, got {}",
                width
            )));
        }
        if index == 0 {
            return Ok(0.0);
        }
        let radius = rs.unwrap_or(self.focus.rs + self.config.sagittal_radius_ext);
        let half = checked_asin(width / (2.0 * radius)).ok_or_else(|| {
            RowlandError::NotConverged(format!(
                "analysers of width {} mm cannot touch on a radius of {:.4} mm",
                width, radius
            ))
        })?;
        Ok((2.0 * half * index as f64).to_degrees())
    }

    /// Edge-to-edge distance (mm) between analysers `index` and `index - 1`
    /// when analyser `index` sits at `chi` (deg)
    pub fn get_ana_dist(&self, chi: f64, index: i32) -> f64 {
        let step = if index == 0 { chi } else { chi / index as f64 };
        let half = (step / 2.0).to_radians();
        let distance = 2.0 * self.focus.rs * half.sin() - self.config.analyser_width * half.cos();
        debug!(
            "analyser #{}-#{} (edge-to-edge) = {:.4} mm, delta chi = {:.4} deg",
            index,
            index - 1,
            distance,
            step
        );
        distance
    }

    /// Axial offset (mm) of the pivot for a known chi (deg)
    pub fn get_axoff(&self, chi: f64) -> f64 {
        self.get_axoff_at(chi, self.focus.rs)
    }

    /// Axial offset (mm) of the pivot for a known chi (deg) on the sagittal
    /// radius `rs`
    pub fn get_axoff_at(&self, chi: f64, rs: f64) -> f64 {
        (rs + self.config.pivot_distance) * chi.to_radians().sin()
    }

    /// Axial offset (mm) at the analyser surface for a known chi (deg)
    pub fn get_axoff0(&self, chi: f64) -> f64 {
        self.focus.rs * chi.to_radians().sin()
    }

    /// Axial offset (mm) of a pivot constrained to a straight trajectory
    ///
    /// The trajectory starts at (`axoff_min`, `sagoff_min`) and is tilted by
    /// `deg_rot` from the sagittal offset axis; the returned value is the
    /// intersection with the current pivot circle on the sample side.
    pub fn get_axoff_line(&self, axoff_min: f64, sagoff_min: f64, deg_rot: f64) -> Result<f64> {
        let phi = deg_rot.to_radians();
        if phi == 0.0 {
            return Ok(axoff_min);
        }
        let radius = self.focus.rs + self.config.pivot_distance;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (x0, y0) = (sagoff_min, axoff_min);
        let b = -2.0 * x0 * cos_phi + 2.0 * radius * cos_phi + 2.0 * y0 * sin_phi;
        let c = x0 * x0 + y0 * y0 - 2.0 * radius * x0;
        let discriminant = b * b - 4.0 * c;
        if discriminant < 0.0 {
            return Err(RowlandError::NotConverged(format!(
                "trajectory from ({:.4}, {:.4}) at {} deg misses the pivot circle",
                axoff_min, sagoff_min, deg_rot
            )));
        }
        let distance = (-b + discriminant.sqrt()) / 2.0;
        debug!(
            "pivot trajectory: d = {:.5}, sagoff = {:.5}",
            distance,
            sagoff_min - distance * cos_phi
        );
        Ok(axoff_min + distance * sin_phi)
    }

    /// Sagittal offset (mm) of the pivot at axial offset `axoff`
    ///
    /// `axoff` must be the pivot position; the analyser surface position
    /// gives a wrong result.
    pub fn get_sag_off(&self, axoff: f64) -> Result<f64> {
        Ok(self.pivot_solution(axoff)?.sagoff)
    }

    /// Sagittal offset (mm) of the analyser surface centre for a pivot at
    /// axial offset `axoff`
    pub fn get_sag_off0(&self, axoff: f64) -> Result<f64> {
        Ok(self.pivot_solution(axoff)?.sagoff_ideal)
    }

    /// Full pivot solution for a pivot at axial offset `axoff` (mm)
    pub fn pivot_solution(&self, axoff: f64) -> Result<PivotSolution> {
        self.pivot_solution_at(axoff, self.focus.rs)
    }

    /// Full pivot solution on an explicit sagittal radius `rs`
    pub fn pivot_solution_at(&self, axoff: f64, rs: f64) -> Result<PivotSolution> {
        let al = self.config.pivot_distance;
        let rchi = self.chi_on(axoff, rs + al)?;
        let axoff_ideal = axoff - al * rchi.sin();
        let rchi_ideal = self.chi_on(axoff_ideal, rs)?;
        let sagoff_ideal = circular_segment_height(2.0 * axoff_ideal, rs).ok_or_else(|| {
            RowlandError::GeometryError(format!(
                "chord {:.4} mm exceeds the sagittal diameter {:.4} mm",
                2.0 * axoff_ideal,
                2.0 * rs
            ))
        })?;
        let sagoff = sagoff_ideal - al * rchi.cos() + al;
        let solution = PivotSolution {
            chi: rchi.to_degrees(),
            axoff,
            sagoff,
            chi_ideal: rchi_ideal.to_degrees(),
            axoff_ideal,
            sagoff_ideal,
        };
        debug!("pivot (aL = {}): {:?}", al, solution);
        Ok(solution)
    }

    /// Pivot of analyser `index` when all analysers touch (see
    /// [`RowlandCircle::get_chi2`])
    pub fn get_pivot(&self, index: i32) -> Result<PivotSolution> {
        let chi = self.get_chi2(index, None)?;
        self.pivot_solution(self.get_axoff(chi))
    }

    /// Pivots for a list of analyser indices, in the given order
    pub fn get_pivots(&self, indices: &[i32]) -> Result<Vec<PivotSolution>> {
        indices.iter().map(|&n| self.get_pivot(n)).collect()
    }

    /// Main parameters at the current Bragg angle
    pub fn summary(&self) -> RowlandSummary {
        RowlandSummary {
            theta0: self.focus.theta0,
            alpha: self.config.alpha,
            d_spacing: self.config.d_spacing,
            energy: self.get_ene(),
            p: self.focus.p,
            q: self.focus.q,
            rm: self.config.rm,
            rs: self.focus.rs,
            analyser_width: self.config.analyser_width,
            analyser_width_ext: self.config.analyser_width_ext,
            pivot_distance: self.config.pivot_distance,
        }
    }
}

/// Bragg energy (eV) for d-spacing `d` (Angstrom) and angle `rtheta` (rad)
pub fn bragg_energy(d: f64, rtheta: f64) -> f64 {
    wavelength_to_energy(2.0 * d * rtheta.sin())
}
