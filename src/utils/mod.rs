/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions for spectrometer geometry
//!
//! This module provides the vector type, rotation helpers and physical
//! constants used throughout the crate.

pub mod constants;
pub mod geometry;
pub mod vector;

pub use constants::{energy_to_wavelength, wavelength_to_energy, HC};
pub use geometry::{
    checked_acos, checked_asin, circular_segment_height, det_pos_rotated, rotate, rotate_about_x,
    DetectorStages,
};
pub use vector::Vector3D;
