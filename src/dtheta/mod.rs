/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Angular deviation and effective acceptance of bent crystal diffractors
//!
//! This module evaluates the analytical deviation from the Bragg condition
//! over the surface of a diffractor for the usual point-to-point focusing
//! geometries, and integrates it over a masked aperture into an effective
//! solid angle and energy resolution.

mod acceptance;
mod case;
mod deviation;
mod errors;
mod mesh;

pub use acceptance::{
    AcceptanceEvaluator, AcceptanceResult, AcceptanceSeries, RockingWidth, SweepConfig,
    SweepFailure, SweepReport, ThresholdMode,
};
pub use case::{map_case_to_num, map_num_to_case, CaseRadii, DiffractorCase, LabelStyle, Radius};
pub use deviation::{deviation, deviation_field, Coefficients};
pub use errors::{DthetaError, Result};
pub use mesh::{get_mesh, ApertureMesh, ApertureShape, MeshConfig};
