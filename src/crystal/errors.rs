/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the crystal module

/// Error types for the crystal module
#[derive(Debug, thiserror::Error)]
pub enum CrystalError {
    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Invalid reflection: {0}")]
    InvalidPlane(String),
}

/// Result type for crystal operations
pub type Result<T> = std::result::Result<T, CrystalError>;
