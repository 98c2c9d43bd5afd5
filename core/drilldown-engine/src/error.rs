//! FILENAME: core/drilldown-engine/src/error.rs

use dataset::DatasetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DrillError>;

/// Every failure the engine reports. All of them are user-input problems:
/// the caller renders a "no data" or "invalid selection" state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrillError {
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown measure: {0}")]
    UnknownMeasure(String),

    #[error("Cannot filter on unknown column: {0}")]
    InvalidDimension(String),

    #[error("Breadcrumb index {index} out of range (stack depth {depth})")]
    IndexOutOfRange { index: usize, depth: usize },

    #[error("No rows to aggregate")]
    EmptyView,

    #[error("Invalid scale factor: {0} (must be finite and > 0)")]
    InvalidScale(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

impl DrillError {
    /// True when the caller should show an empty "no data" state.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DrillError::EmptyView)
    }

    /// True when the caller passed a column or breadcrumb that does not exist.
    pub fn is_invalid_selection(&self) -> bool {
        matches!(
            self,
            DrillError::UnknownDimension(_)
                | DrillError::UnknownMeasure(_)
                | DrillError::InvalidDimension(_)
                | DrillError::IndexOutOfRange { .. }
        )
    }
}

impl From<serde_json::Error> for DrillError {
    fn from(err: serde_json::Error) -> Self {
        DrillError::InvalidConfig(err.to_string())
    }
}
