/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for scan file input/output

use std::io;
use thiserror::Error;

/// Errors raised while writing or reading SPEC files
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Labels and data columns do not line up
    #[error("Column mismatch: {0}")]
    ColumnMismatch(String),
}

/// Result type for scan file operations
pub type Result<T> = std::result::Result<T, SpecError>;
