//! FILENAME: core/drilldown-engine/src/lib.rs
//! Drill-down engine for tabular datasets.
//!
//! This crate narrows a `dataset::DatasetView` through a stack of
//! dimension→value filters and computes the statistics an analyst needs to
//! pick the next filter. It owns no I/O and no rendering.
//!
//! Layers:
//! - `definition`: Serializable request and configuration types (WHAT is asked)
//! - `filter_stack`: The breadcrumb state machine (WHERE the analyst is)
//! - `aggregate`, `top_n`, `hierarchy`, `summary`: Pure computations over a view (HOW we calculate)
//! - `units`: Raw ↔ display scaling, applied once by consumers
//! - `session`: One analyst's session with an invalidated-on-mutation memo

mod logging;

pub mod accumulator;
pub mod aggregate;
pub mod definition;
pub mod drill;
pub mod error;
pub mod filter_stack;
pub mod hierarchy;
pub mod session;
pub mod summary;
pub mod top_n;
pub mod units;

pub use accumulator::{MeasureAccumulator, MeasureStats};
pub use aggregate::{aggregate, aggregate_total, aggregate_with, Group};
pub use definition::*;
pub use drill::{drill_through, DrillThroughResult, DEFAULT_MAX_RECORDS};
pub use error::{DrillError, Result};
pub use filter_stack::FilterStack;
pub use hierarchy::{build, build_with, HierarchyNode};
pub use session::{AggregationMemo, DrillSession};
pub use summary::{available_categories, summarize, ColumnMean, DistinctCount, ViewSummary};
pub use top_n::{rank_by_average, top_n, Choice};
pub use units::{to_display, to_raw, DisplayScale, ScaledGroup};

pub use logging::{CAT_AGG, CAT_CONFIG, CAT_HIER, CAT_SESSION, CAT_STACK};
