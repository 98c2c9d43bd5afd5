//! FILENAME: core/drilldown-engine/src/session.rs
//! PURPOSE: One analyst's interactive drill-down session.
//! CONTEXT: Owns the base view, the filter stack and the configuration.
//! Every query recomputes from the active view. Per-dimension aggregations
//! may be served from an explicit memo, which is cleared whenever the
//! filter stack changes.

use dataset::{ColumnKind, DatasetView, ScalarValue};
use rustc_hash::FxHashMap;

use crate::aggregate::{aggregate, Group};
use crate::definition::{Breadcrumb, DrillCategory, DrillConfig, Filter};
use crate::drill::{drill_through, DrillThroughResult};
use crate::error::Result;
use crate::filter_stack::FilterStack;
use crate::hierarchy::{build, HierarchyNode};
use crate::logging::{log_debug, log_info, log_warn, CAT_SESSION};
use crate::summary::{available_categories, summarize, ViewSummary};
use crate::top_n::{rank_by_average, top_n, Choice};
use crate::units::DisplayScale;

// ============================================================================
// AGGREGATION MEMO
// ============================================================================

/// Cache of `(stack fingerprint, dimension) -> groups`.
#[derive(Debug, Default)]
pub struct AggregationMemo {
    entries: FxHashMap<(u64, String), Vec<Group>>,
    hits: u64,
    misses: u64,
}

impl AggregationMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, fingerprint: u64, dimension: &str) -> Option<&Vec<Group>> {
        let found = self.entries.get(&(fingerprint, dimension.to_string()));
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, fingerprint: u64, dimension: &str, groups: Vec<Group>) {
        self.entries.insert((fingerprint, dimension.to_string()), groups);
    }

    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            log_debug!(CAT_SESSION, "memo invalidated ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug)]
pub struct DrillSession {
    base: DatasetView,
    stack: FilterStack,
    config: DrillConfig,
    memo: AggregationMemo,
}

impl DrillSession {
    /// Starts a session with an empty filter stack. Configured time
    /// dimensions present in `base` are declared time-like, so filtering and
    /// grouping on them use normalized keys.
    pub fn new(base: DatasetView, config: DrillConfig) -> Result<Self> {
        config.validate()?;

        let mut base = base;
        for dimension in &config.time_dimensions {
            if base.has_column(dimension) && !base.is_time_like(dimension) {
                base = base.with_column_kind(dimension, ColumnKind::TimeLike)?;
            }
        }

        log_info!(
            CAT_SESSION,
            "session started: {} rows, {} columns, measure {}",
            base.len(),
            base.schema().len(),
            base.measure()
        );

        Ok(DrillSession {
            stack: FilterStack::new(&base),
            base,
            config,
            memo: AggregationMemo::new(),
        })
    }

    pub fn base(&self) -> &DatasetView {
        &self.base
    }

    pub fn stack(&self) -> &FilterStack {
        &self.stack
    }

    pub fn config(&self) -> &DrillConfig {
        &self.config
    }

    pub fn memo(&self) -> &AggregationMemo {
        &self.memo
    }

    pub fn active_view(&self) -> Result<DatasetView> {
        self.stack.active_view(&self.base)
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Next-level choices for `dimension` in the active view.
    pub fn choices(&self, dimension: &str) -> Result<Vec<Choice>> {
        top_n(&self.active_view()?, dimension, self.config.top_n)
    }

    /// Drills down by pushing `dimension == value`.
    pub fn select(&mut self, dimension: &str, value: impl Into<ScalarValue>) -> Result<()> {
        self.stack.push(dimension, value)?;
        self.memo.invalidate();
        Ok(())
    }

    /// Goes one level back.
    pub fn back(&mut self) -> Option<Filter> {
        let removed = self.stack.pop();
        if removed.is_some() {
            self.memo.invalidate();
        }
        removed
    }

    /// Jumps to a breadcrumb depth (0 returns to the unfiltered view).
    pub fn jump(&mut self, index: usize) -> Result<()> {
        self.stack.pop_to(index)?;
        self.memo.invalidate();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.stack.reset();
        self.memo.invalidate();
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.stack.breadcrumbs()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Groups the active view by `dimension` over the view's measure.
    pub fn aggregate(&mut self, dimension: &str) -> Result<Vec<Group>> {
        let fingerprint = self.stack.fingerprint();
        if let Some(groups) = self.memo.get(fingerprint, dimension) {
            return Ok(groups.clone());
        }
        let groups = aggregate(&self.active_view()?, dimension, self.base.measure())?;
        self.memo.insert(fingerprint, dimension, groups.clone());
        Ok(groups)
    }

    /// Groups of `dimension` ranked by average measure, up to `rank_limit`.
    pub fn ranking(&self, dimension: &str) -> Result<Vec<Group>> {
        rank_by_average(
            &self.active_view()?,
            dimension,
            self.base.measure(),
            self.config.rank_limit,
        )
    }

    /// Multi-level breakdown of the active view. Levels beyond
    /// `max_hierarchy_levels` are ignored.
    pub fn hierarchy<S: AsRef<str>>(&self, levels: &[S]) -> Result<HierarchyNode> {
        let max = self.config.max_hierarchy_levels;
        let levels = if levels.len() > max {
            log_warn!(
                CAT_SESSION,
                "hierarchy request has {} levels, keeping the first {}",
                levels.len(),
                max
            );
            &levels[..max]
        } else {
            levels
        };
        build(&self.active_view()?, levels, self.base.measure())
    }

    /// Breakdown over the configured default levels.
    pub fn default_hierarchy(&self) -> Result<HierarchyNode> {
        self.hierarchy(&self.config.hierarchy_levels)
    }

    /// Headline numbers of the active view. Configured columns missing from
    /// the view are skipped.
    pub fn summary(&self) -> Result<ViewSummary> {
        let present = |columns: &[String]| -> Vec<String> {
            columns
                .iter()
                .filter(|c| self.base.has_column(c))
                .cloned()
                .collect()
        };
        summarize(
            &self.active_view()?,
            &present(&self.config.summary_columns),
            &present(&self.config.summary_dimensions),
        )
    }

    /// Drill options applicable to this dataset.
    pub fn categories(&self) -> Vec<DrillCategory> {
        available_categories(&self.base, &self.config.categories)
    }

    pub fn display_scale(&self) -> Result<DisplayScale> {
        DisplayScale::of_view(&self.base)
    }

    /// Source rows behind the current breadcrumb trail.
    pub fn drill_through(&self, max_records: usize) -> Result<DrillThroughResult> {
        drill_through(&self.base, self.stack.filters(), max_records)
    }
}
