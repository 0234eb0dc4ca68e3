/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the angular deviation module

use thiserror::Error;

/// Result type for deviation and acceptance operations
pub type Result<T> = std::result::Result<T, DthetaError>;

/// Errors raised by the diffractor model, the aperture meshes and the
/// acceptance evaluator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DthetaError {
    /// Label or code not found in the diffractor case table
    #[error("Unknown diffractor case: {0}")]
    UnknownCase(String),

    /// Bragg angle outside the open interval (0, 90) deg
    #[error("Invalid Bragg angle: {0} deg (expected 0 < theta < 90)")]
    InvalidAngle(f64),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Grid with zero cell size along both axes
    #[error("Degenerate grid: {0}")]
    DegenerateGrid(String),

    /// Rocking curve width missing, negative or not matching the angles
    #[error("Invalid rocking curve width: {0}")]
    InvalidThreshold(String),
}
