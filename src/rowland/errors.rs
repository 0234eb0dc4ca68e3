/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the Rowland circle module

use thiserror::Error;

/// Result type for Rowland circle operations
pub type Result<T> = std::result::Result<T, RowlandError>;

/// Rowland circle and bender errors
///
/// All variants are deterministic input-validation failures: an
/// unrealizable geometry is reported, never coerced into a neighbouring
/// valid one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowlandError {
    /// Bragg angle outside the open interval (0, 90) deg
    #[error("Invalid Bragg angle: {0} deg (expected 0 < theta < 90)")]
    InvalidAngle(f64),

    /// Geometry that cannot be built (non-positive sizes, chord beyond the
    /// diameter, too few analysers for a bender, ...)
    #[error("Geometry error: {0}")]
    GeometryError(String),

    /// An intermediate inverse trigonometric argument left [-1, 1]
    #[error("Solver did not converge: {0}")]
    NotConverged(String),
}
