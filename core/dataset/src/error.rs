//! FILENAME: core/dataset/src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown measure column: {0}")]
    UnknownMeasure(String),

    #[error("No measure column declared")]
    MissingMeasure,

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Too many rows: row {0} does not fit a u32 source index")]
    TooManyRows(usize),

    #[error("Invalid scale factor: {0} (must be finite and > 0)")]
    InvalidScale(f64),
}
