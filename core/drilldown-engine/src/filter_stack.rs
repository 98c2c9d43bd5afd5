//! FILENAME: core/drilldown-engine/src/filter_stack.rs
//! PURPOSE: The breadcrumb trail of applied dimension→value filters.
//! CONTEXT: Owned by one interactive session and mutated only through
//! push / pop / pop_to / reset. The active view is always recomputed from the
//! base view, so two calls with the same stack give identical results.

use std::hash::{Hash, Hasher};

use dataset::{ColumnKind, DatasetView, Row, ScalarKey, ScalarValue};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::{Breadcrumb, Filter};
use crate::error::{DrillError, Result};
use crate::logging::{log_debug, log_enter, log_exit, CAT_STACK};

/// Filters stored inline; deeper trails spill to the heap.
const INLINE_FILTERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStack {
    /// Columns of the base view; pushing anything else is rejected.
    known_columns: Vec<String>,
    /// Applied filters, outermost first. No two share a dimension.
    filters: SmallVec<[Filter; INLINE_FILTERS]>,
    /// Bumped on every mutation.
    version: u64,
}

impl FilterStack {
    /// Creates an empty stack accepting the columns of `base`.
    pub fn new(base: &DatasetView) -> Self {
        Self::with_columns(base.schema().names())
    }

    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterStack {
            known_columns: columns.into_iter().map(Into::into).collect(),
            filters: SmallVec::new(),
            version: 0,
        }
    }

    /// Appends a filter. If `dimension` is already filtered at index i, the
    /// stack is first truncated to length i, discarding that entry and every
    /// deeper one.
    pub fn push(&mut self, dimension: &str, value: impl Into<ScalarValue>) -> Result<()> {
        self.push_filter(Filter::new(dimension, value))
    }

    /// Like `push`, keeping the filter's kind override (hierarchy paths).
    pub fn push_filter(&mut self, filter: Filter) -> Result<()> {
        let dimension = filter.dimension.as_str();
        if !self.known_columns.iter().any(|c| c == dimension) {
            return Err(DrillError::InvalidDimension(dimension.to_string()));
        }

        if let Some(index) = self.position(dimension) {
            log_debug!(
                CAT_STACK,
                "re-filter on {} at depth {}: dropping {} entries",
                dimension,
                index,
                self.filters.len() - index
            );
            self.filters.truncate(index);
        }
        log_debug!(CAT_STACK, "push {}", filter.label());
        self.filters.push(filter);
        self.version += 1;
        Ok(())
    }

    /// Truncates the stack to length `index` (breadcrumb jump).
    pub fn pop_to(&mut self, index: usize) -> Result<()> {
        if index > self.filters.len() {
            return Err(DrillError::IndexOutOfRange {
                index,
                depth: self.filters.len(),
            });
        }
        log_debug!(CAT_STACK, "pop_to {} (depth {})", index, self.filters.len());
        self.filters.truncate(index);
        self.version += 1;
        Ok(())
    }

    /// Removes the deepest filter (one level back). No-op on an empty stack.
    pub fn pop(&mut self) -> Option<Filter> {
        let removed = self.filters.pop();
        if let Some(ref filter) = removed {
            log_debug!(CAT_STACK, "pop {}", filter.label());
            self.version += 1;
        }
        removed
    }

    pub fn reset(&mut self) {
        log_debug!(CAT_STACK, "reset (depth {})", self.filters.len());
        self.filters.clear();
        self.version += 1;
    }

    /// Rows of `base` satisfying every filter (logical AND).
    pub fn active_view(&self, base: &DatasetView) -> Result<DatasetView> {
        log_enter!(CAT_STACK, "active_view", "rows={} depth={}", base.len(), self.filters.len());
        let matchers = compile_filters(base, &self.filters)?;
        let view = base.filter_rows(|row| matchers.iter().all(|m| m.matches(row)));
        log_exit!(CAT_STACK, "active_view", "rows={}", view.len());
        Ok(view)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.filters
            .iter()
            .enumerate()
            .map(|(i, filter)| Breadcrumb {
                dimension: filter.dimension.clone(),
                value: filter.value.clone(),
                depth: i + 1,
                label: filter.label(),
            })
            .collect()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn contains(&self, dimension: &str) -> bool {
        self.position(dimension).is_some()
    }

    /// Index of the filter on `dimension`, if any.
    pub fn position(&self, dimension: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.dimension == dimension)
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Hash of the stack contents. Equal stacks give equal fingerprints.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.filters.len().hash(&mut hasher);
        for filter in &self.filters {
            filter.dimension.hash(&mut hasher);
            ScalarKey::from(&filter.value).hash(&mut hasher);
            filter.time_like.hash(&mut hasher);
        }
        hasher.finish()
    }
}

// ============================================================================
// ROW MATCHING
// ============================================================================

/// A filter resolved against a view's schema.
pub(crate) struct FilterMatcher {
    index: usize,
    kind: ColumnKind,
    key: ScalarKey,
}

impl FilterMatcher {
    pub fn matches(&self, row: &Row) -> bool {
        self.kind.key_of(row.get(self.index)) == self.key
    }
}

/// Resolves filters to column positions. Time-like columns compare
/// normalized keys, so a year filter of 2019 matches "2019". A filter's own
/// kind override wins over the schema.
pub(crate) fn compile_filters(view: &DatasetView, filters: &[Filter]) -> Result<Vec<FilterMatcher>> {
    filters
        .iter()
        .map(|filter| {
            let index = view
                .column_index(&filter.dimension)
                .ok_or_else(|| DrillError::UnknownDimension(filter.dimension.clone()))?;
            let schema_kind = view.schema().kind_of(&filter.dimension).unwrap_or_default();
            let kind = filter.effective_kind(schema_kind);
            Ok(FilterMatcher {
                index,
                kind,
                key: kind.key_of(&filter.value),
            })
        })
        .collect()
}
