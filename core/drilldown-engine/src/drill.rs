//! FILENAME: core/drilldown-engine/src/drill.rs
//! Drill-through - the source records behind a group or hierarchy node.

use dataset::DatasetView;
use serde::{Deserialize, Serialize};

use crate::definition::Filter;
use crate::error::Result;
use crate::filter_stack::compile_filters;

/// Default limit on returned source rows.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Result of drilling through to source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillThroughResult {
    /// The filter path that was drilled into.
    pub path: Vec<Filter>,

    /// Column headers of the view.
    pub headers: Vec<String>,

    /// The detail records (source row indices).
    pub source_rows: Vec<u32>,

    /// Total count of matching records.
    pub total_count: usize,

    /// Maximum records that were fetched.
    pub max_records: usize,

    /// Whether more records matched than were fetched.
    pub is_truncated: bool,
}

impl DrillThroughResult {
    pub fn new(path: Vec<Filter>) -> Self {
        DrillThroughResult {
            path,
            headers: Vec::new(),
            source_rows: Vec::new(),
            total_count: 0,
            max_records: DEFAULT_MAX_RECORDS,
            is_truncated: false,
        }
    }
}

/// Collects the source rows of `view` matching every filter of `path`.
pub fn drill_through(view: &DatasetView, path: &[Filter], max_records: usize) -> Result<DrillThroughResult> {
    let matchers = compile_filters(view, path)?;

    let mut result = DrillThroughResult::new(path.to_vec());
    result.max_records = max_records;
    result.headers = view.schema().names().map(str::to_string).collect();

    let mut count = 0;
    for row in view.rows() {
        if matchers.iter().all(|m| m.matches(row)) {
            count += 1;
            if result.source_rows.len() < max_records {
                result.source_rows.push(row.source_row);
            }
        }
    }

    result.total_count = count;
    result.is_truncated = count > max_records;
    Ok(result)
}
