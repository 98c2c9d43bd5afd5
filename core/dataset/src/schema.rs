//! FILENAME: core/dataset/src/schema.rs
//! PURPOSE: Column metadata shared by a view and every view derived from it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::scalar::{normalize_time, ScalarKey, ScalarValue};

/// How a column's values are interpreted when grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Opaque keys compared by equality.
    #[default]
    Categorical,
    /// Numeric column (a measure, or a numeric attribute such as mileage).
    Numeric,
    /// Time column (e.g. model year). Values are normalized before grouping
    /// and groups are ordered chronologically.
    TimeLike,
}

impl ColumnKind {
    /// Builds the grouping key for a cell of this kind.
    pub fn key_of(&self, value: &ScalarValue) -> ScalarKey {
        match self {
            ColumnKind::TimeLike => normalize_time(value),
            _ => ScalarKey::from(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Column::new(name, ColumnKind::Categorical)
    }
}

/// Ordered set of uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    index: FxHashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.name.clone(), i).is_some() {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Schema { columns, index })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|c| c.kind)
    }

    pub fn is_time_like(&self, name: &str) -> bool {
        self.kind_of(name) == Some(ColumnKind::TimeLike)
    }
}
