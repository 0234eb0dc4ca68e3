/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # rowland-rs
//!
//! Geometry and optical acceptance of wavelength-dispersive X-ray
//! spectrometers built from bent crystal analysers on a Rowland circle.
//!
//! The crate has two engines:
//!
//! - [`rowland`]: Rowland circle position solver (distances, energy,
//!   lab-frame positions, pivots of off-axis analysers, miscut offsets)
//!   and the bender linkage of ganged analyser rows.
//! - [`dtheta`]: analytical deviation from the Bragg condition over the
//!   diffractor for ten focusing geometries, integrated over a masked
//!   aperture into effective solid angle and energy resolution.
//!
//! [`crystal`] provides d-spacings, [`io`] stores acceptance sweeps as
//! SPEC files.

pub mod cli;
pub mod crystal;
pub mod dtheta;
pub mod io;
pub mod rowland;
pub mod utils;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
