/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal lattice module
//!
//! Interplanar d-spacings for the six crystal systems, used to convert the
//! analyser Bragg angle into an energy.

pub mod errors;
pub mod lattice;

pub use errors::{CrystalError, Result};
pub use lattice::{
    d_cubic, d_hexagonal, CrystalSystem, LatticePlane, GE_ALAT, INSB_ALAT, SIO2_A, SIO2_C,
    SI_ALAT,
};
