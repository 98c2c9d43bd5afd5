//! FILENAME: core/dataset/src/view.rs
//! PURPOSE: Immutable snapshot of rows plus column metadata.
//! CONTEXT: Every filtering or cleaning operation returns a new view that
//! shares the schema with its parent. Rows are never mutated in place.
//! A view also carries the designated measure column and the display scale
//! factor, but it never applies the scale itself.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::scalar::{ScalarKey, ScalarValue};
use crate::schema::{Column, ColumnKind, Schema};

static EMPTY_VALUE: ScalarValue = ScalarValue::Empty;

// ============================================================================
// ROW
// ============================================================================

/// A single row, stored positionally against the view's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// The row index in the originally loaded data (0-based).
    pub source_row: u32,

    /// One value per schema column, in schema order.
    pub values: Vec<ScalarValue>,
}

impl Row {
    /// Gets the value at a column index. Out-of-range reads as Empty.
    pub fn get(&self, index: usize) -> &ScalarValue {
        self.values.get(index).unwrap_or(&EMPTY_VALUE)
    }
}

// ============================================================================
// DATASET VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetView {
    schema: Arc<Schema>,
    rows: Vec<Row>,
    measure: String,
    scale: f64,
}

impl DatasetView {
    /// Starts building a view over the given column names.
    pub fn builder<I, S>(columns: I) -> DatasetViewBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DatasetViewBuilder::new(columns)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The designated numeric measure column.
    pub fn measure(&self) -> &str {
        &self.measure
    }

    /// The display scale factor (raw / scale = display).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    pub fn is_time_like(&self, name: &str) -> bool {
        self.schema.is_time_like(name)
    }

    /// Reads a cell by column name.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a ScalarValue> {
        self.column_index(column).map(|i| row.get(i))
    }

    /// Builds the grouping key of a row for a column, honouring the column kind.
    pub fn key_at(&self, row: &Row, column_index: usize) -> ScalarKey {
        let kind = self
            .schema
            .columns()
            .get(column_index)
            .map(|c| c.kind)
            .unwrap_or_default();
        kind.key_of(row.get(column_index))
    }

    /// Iterates over one column's cells in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &ScalarValue> + '_> {
        let index = self.require_column(column)?;
        Ok(self.rows.iter().map(move |row| row.get(index)))
    }

    /// Number of distinct non-empty keys in a column.
    pub fn distinct_count(&self, column: &str) -> Result<usize> {
        let index = self.require_column(column)?;
        let distinct: FxHashSet<ScalarKey> = self
            .rows
            .iter()
            .map(|row| self.key_at(row, index))
            .filter(|key| !key.is_empty())
            .collect();
        Ok(distinct.len())
    }

    /// Creates a view with the same schema, measure and scale over other rows.
    pub fn derive(&self, rows: Vec<Row>) -> DatasetView {
        DatasetView {
            schema: Arc::clone(&self.schema),
            rows,
            measure: self.measure.clone(),
            scale: self.scale,
        }
    }

    /// Same rows, another designated measure column.
    pub fn with_measure(&self, measure: &str) -> Result<DatasetView> {
        if !self.schema.contains(measure) {
            return Err(DatasetError::UnknownMeasure(measure.to_string()));
        }
        let mut view = self.clone();
        view.measure = measure.to_string();
        Ok(view)
    }

    /// Same rows, another display scale.
    pub fn with_scale(&self, scale: f64) -> Result<DatasetView> {
        validate_scale(scale)?;
        let mut view = self.clone();
        view.scale = scale;
        Ok(view)
    }

    /// Same rows, with one column re-declared as another kind.
    pub fn with_column_kind(&self, column: &str, kind: ColumnKind) -> Result<DatasetView> {
        let index = self.require_column(column)?;
        if self.kind_at(index) == kind {
            return Ok(self.clone());
        }
        let mut columns = self.schema.columns().to_vec();
        columns[index].kind = kind;
        let mut view = self.clone();
        view.schema = Arc::new(Schema::new(columns)?);
        Ok(view)
    }

    // ========================================================================
    // ROW FILTERING / CLEANING
    // ========================================================================

    /// Keeps the rows matching a predicate.
    pub fn filter_rows<F>(&self, mut predicate: F) -> DatasetView
    where
        F: FnMut(&Row) -> bool,
    {
        let rows = self.rows.iter().filter(|row| predicate(row)).cloned().collect();
        self.derive(rows)
    }

    /// Keeps rows where `column == value` (time-like columns compare normalized keys).
    pub fn retain_equal(&self, column: &str, value: &ScalarValue) -> Result<DatasetView> {
        let index = self.require_column(column)?;
        let kind = self.kind_at(index);
        let wanted = kind.key_of(value);
        Ok(self.filter_rows(|row| kind.key_of(row.get(index)) == wanted))
    }

    /// Drops rows whose `column` key was already seen, keeping the first occurrence.
    /// Rows with an empty key are always kept.
    pub fn dedup_by(&self, column: &str) -> Result<DatasetView> {
        let index = self.require_column(column)?;
        let mut seen: FxHashSet<ScalarKey> = FxHashSet::default();
        Ok(self.filter_rows(|row| {
            let key = self.key_at(row, index);
            key.is_empty() || seen.insert(key)
        }))
    }

    /// Keeps rows whose numeric `column` lies within the inclusive bounds.
    /// Non-numeric cells are dropped.
    pub fn retain_range(&self, column: &str, min: Option<f64>, max: Option<f64>) -> Result<DatasetView> {
        let index = self.require_column(column)?;
        Ok(self.filter_rows(|row| match row.get(index).as_number() {
            Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
            None => false,
        }))
    }

    fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))
    }

    fn kind_at(&self, index: usize) -> ColumnKind {
        self.schema
            .columns()
            .get(index)
            .map(|c| c.kind)
            .unwrap_or_default()
    }
}

fn validate_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(DatasetError::InvalidScale(scale))
    }
}

// ============================================================================
// BUILDER
// ============================================================================

enum PendingRow {
    Values(Vec<ScalarValue>),
    Record(Vec<(String, ScalarValue)>),
}

/// Collects columns, kinds and rows; all validation happens in `build`.
pub struct DatasetViewBuilder {
    columns: Vec<Column>,
    kinds: Vec<(String, ColumnKind)>,
    measure: Option<String>,
    scale: f64,
    rows: Vec<PendingRow>,
}

impl DatasetViewBuilder {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DatasetViewBuilder {
            columns: columns.into_iter().map(Column::categorical).collect(),
            kinds: Vec::new(),
            measure: None,
            scale: 1.0,
            rows: Vec::new(),
        }
    }

    pub fn column_kind(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.kinds.push((name.into(), kind));
        self
    }

    pub fn time_like(self, name: impl Into<String>) -> Self {
        self.column_kind(name, ColumnKind::TimeLike)
    }

    pub fn numeric(self, name: impl Into<String>) -> Self {
        self.column_kind(name, ColumnKind::Numeric)
    }

    pub fn measure(mut self, name: impl Into<String>) -> Self {
        self.measure = Some(name.into());
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Adds a positional row (one value per column).
    pub fn row(mut self, values: Vec<ScalarValue>) -> Self {
        self.rows.push(PendingRow::Values(values));
        self
    }

    pub fn rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<ScalarValue>>,
    {
        self.rows.extend(rows.into_iter().map(PendingRow::Values));
        self
    }

    /// Adds a named record. Columns the record does not mention are Empty.
    pub fn record<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ScalarValue)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.rows.push(PendingRow::Record(fields));
        self
    }

    pub fn build(self) -> Result<DatasetView> {
        let mut columns = self.columns;

        for (name, kind) in &self.kinds {
            let column = columns
                .iter_mut()
                .find(|c| &c.name == name)
                .ok_or_else(|| DatasetError::UnknownColumn(name.clone()))?;
            column.kind = *kind;
        }

        let measure = self.measure.ok_or(DatasetError::MissingMeasure)?;
        match columns.iter_mut().find(|c| c.name == measure) {
            Some(column) => {
                if column.kind == ColumnKind::Categorical {
                    column.kind = ColumnKind::Numeric;
                }
            }
            None => return Err(DatasetError::UnknownMeasure(measure)),
        }

        validate_scale(self.scale)?;
        let schema = Schema::new(columns)?;
        let width = schema.len();

        let mut rows = Vec::with_capacity(self.rows.len());
        for (i, pending) in self.rows.into_iter().enumerate() {
            let values = match pending {
                PendingRow::Values(values) => {
                    if values.len() != width {
                        return Err(DatasetError::RowWidth {
                            row: i,
                            expected: width,
                            found: values.len(),
                        });
                    }
                    values
                }
                PendingRow::Record(fields) => {
                    let mut values = vec![ScalarValue::Empty; width];
                    for (name, value) in fields {
                        let index = schema
                            .index_of(&name)
                            .ok_or(DatasetError::UnknownColumn(name))?;
                        values[index] = value;
                    }
                    values
                }
            };
            rows.push(Row {
                source_row: source_index(i)?,
                values,
            });
        }

        Ok(DatasetView {
            schema: Arc::new(schema),
            rows,
            measure,
            scale: self.scale,
        })
    }
}

/// Position of a loaded row as stored in `Row::source_row`.
fn source_index(i: usize) -> Result<u32> {
    u32::try_from(i).map_err(|_| DatasetError::TooManyRows(i))
}
