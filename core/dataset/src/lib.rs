//! FILENAME: core/dataset/src/lib.rs
//! PURPOSE: Shared data types for the drill-down engine.
//! CONTEXT: Loaders build a `DatasetView` once; the engine only ever reads it
//! and derives new, filtered views from it.

pub mod error;
pub mod scalar;
pub mod schema;
pub mod view;

pub use error::{DatasetError, Result};
pub use scalar::{compare_chronological, normalize_time, OrderedFloat, ScalarKey, ScalarValue};
pub use schema::{Column, ColumnKind, Schema};
pub use view::{DatasetView, DatasetViewBuilder, Row};
