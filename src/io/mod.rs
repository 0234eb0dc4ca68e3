/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Scan file input/output
//!
//! Acceptance sweeps are persisted as SPEC data files, one scan per
//! diffractor case.

mod errors;
mod specfile;

pub use errors::{Result, SpecError};
pub use specfile::{
    write_acceptance_scans, SpecFile, SpecHeader, SpecScan, SpecWriter, ACCEPTANCE_COLUMNS,
    ACCEPTANCE_MOTORS,
};
