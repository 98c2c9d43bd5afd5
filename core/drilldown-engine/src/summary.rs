//! FILENAME: core/drilldown-engine/src/summary.rs
//! PURPOSE: Headline numbers for the active view and the drill-option catalogue.
//! CONTEXT: Unlike the Aggregator these work on empty views, so the caller
//! can always show "0 listings" instead of an error state.

use dataset::{ColumnKind, DatasetView};
use serde::{Deserialize, Serialize};

use crate::accumulator::{MeasureAccumulator, MeasureStats};
use crate::definition::DrillCategory;
use crate::error::{DrillError, Result};

/// Mean of one numeric column (e.g. average model year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMean {
    pub column: String,
    pub mean: Option<f64>,
}

/// Number of distinct non-empty values of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctCount {
    pub dimension: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub total_rows: usize,
    pub measure: String,
    /// Raw (unscaled) statistics of the view's measure.
    pub measure_stats: MeasureStats,
    pub column_means: Vec<ColumnMean>,
    pub distinct_counts: Vec<DistinctCount>,
}

/// Summarizes `view`: row count, measure statistics, the mean of each of
/// `numeric_columns` and the distinct count of each of `dimensions`.
pub fn summarize<S: AsRef<str>>(view: &DatasetView, numeric_columns: &[S], dimensions: &[S]) -> Result<ViewSummary> {
    let measure_index = view
        .column_index(view.measure())
        .ok_or_else(|| DrillError::UnknownMeasure(view.measure().to_string()))?;

    let mut measure = MeasureAccumulator::new();
    for row in view.rows() {
        measure.add(row.get(measure_index).as_number());
    }

    let column_means = numeric_columns
        .iter()
        .map(|column| {
            let column = column.as_ref();
            let values = view
                .column_values(column)
                .map_err(|_| DrillError::UnknownDimension(column.to_string()))?;
            // Time-like cells are averaged by their normalized year, so "2019" counts.
            let kind = view.schema().kind_of(column).unwrap_or_default();
            let mut acc = MeasureAccumulator::new();
            for value in values {
                let number = match kind {
                    ColumnKind::TimeLike => kind.key_of(value).to_value().as_number(),
                    _ => value.as_number(),
                };
                acc.add(number);
            }
            Ok(ColumnMean {
                column: column.to_string(),
                mean: acc.finish().average,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let distinct_counts = dimensions
        .iter()
        .map(|dimension| {
            let dimension = dimension.as_ref();
            let count = view
                .distinct_count(dimension)
                .map_err(|_| DrillError::UnknownDimension(dimension.to_string()))?;
            Ok(DistinctCount {
                dimension: dimension.to_string(),
                count,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ViewSummary {
        total_rows: view.len(),
        measure: view.measure().to_string(),
        measure_stats: measure.finish(),
        column_means,
        distinct_counts,
    })
}

/// Categories with at least one column present in `view`, each restricted to
/// its present columns. Order is preserved.
pub fn available_categories(view: &DatasetView, categories: &[DrillCategory]) -> Vec<DrillCategory> {
    categories
        .iter()
        .filter_map(|category| {
            let columns: Vec<String> = category
                .columns
                .iter()
                .filter(|c| view.has_column(c))
                .cloned()
                .collect();
            (!columns.is_empty()).then(|| DrillCategory {
                name: category.name.clone(),
                columns,
            })
        })
        .collect()
}
