//! FILENAME: core/drilldown-engine/src/definition.rs
//! Drill-down Definition - The serializable configuration and request types.
//!
//! This module contains the types needed to DESCRIBE a drill-down request.
//! These structures are designed to be:
//! - Serializable (sent to and from the rendering/navigation side as JSON)
//! - Plain data, no references into a view
//! - Immutable snapshots of analyst intent

use dataset::{ColumnKind, ScalarValue};
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, Result};
use crate::logging::{log_debug, CAT_CONFIG};

// ============================================================================
// FILTERS
// ============================================================================

/// "Keep rows where row[dimension] == value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub dimension: String,
    pub value: ScalarValue,
    /// Overrides the schema's time-likeness when comparing, as `Level` does.
    /// Set on hierarchy paths built under an overridden level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_like: Option<bool>,
}

impl Filter {
    pub fn new(dimension: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Filter {
            dimension: dimension.into(),
            value: value.into(),
            time_like: None,
        }
    }

    pub fn with_time_like(mut self, time_like: Option<bool>) -> Self {
        self.time_like = time_like;
        self
    }

    /// The column kind used to compare cells against this filter.
    pub(crate) fn effective_kind(&self, schema_kind: ColumnKind) -> ColumnKind {
        override_kind(self.time_like, schema_kind)
    }

    /// Navigation label, e.g. "brand: toyota".
    pub fn label(&self) -> String {
        format!("{}: {}", self.dimension, self.value.display_value())
    }
}

/// One entry of the navigation trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub dimension: String,
    pub value: ScalarValue,
    /// 1-based position in the stack. Passing it to `pop_to` returns to
    /// this crumb and keeps it.
    pub depth: usize,
    pub label: String,
}

// ============================================================================
// GROUP ORDERING
// ============================================================================

/// How groups returned by one aggregation call are ordered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum GroupOrder {
    /// Chronological for time-like dimensions, frequency otherwise.
    #[default]
    Auto,
    /// Descending count, ties broken by ascending value.
    Frequency,
    /// Ascending time order, regardless of count.
    Chronological,
    /// Order in which values first appear in the view.
    FirstSeen,
    /// Listed values first, in the given order; the rest by frequency.
    Explicit(Vec<ScalarValue>),
}

// ============================================================================
// HIERARCHY LEVELS
// ============================================================================

/// One level of a hierarchy request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub dimension: String,
    /// Overrides the schema's time-likeness for this level when set.
    #[serde(default)]
    pub time_like: Option<bool>,
}

impl Level {
    pub fn new(dimension: impl Into<String>) -> Self {
        Level {
            dimension: dimension.into(),
            time_like: None,
        }
    }

    pub fn time_like(dimension: impl Into<String>) -> Self {
        Level {
            dimension: dimension.into(),
            time_like: Some(true),
        }
    }

    pub fn categorical(dimension: impl Into<String>) -> Self {
        Level {
            dimension: dimension.into(),
            time_like: Some(false),
        }
    }

    /// The column kind used for grouping at this level.
    pub(crate) fn effective_kind(&self, schema_kind: ColumnKind) -> ColumnKind {
        override_kind(self.time_like, schema_kind)
    }
}

fn override_kind(time_like: Option<bool>, schema_kind: ColumnKind) -> ColumnKind {
    match time_like {
        Some(true) => ColumnKind::TimeLike,
        Some(false) if schema_kind == ColumnKind::TimeLike => ColumnKind::Categorical,
        _ => schema_kind,
    }
}

impl From<&str> for Level {
    fn from(dimension: &str) -> Self {
        Level::new(dimension)
    }
}

impl From<String> for Level {
    fn from(dimension: String) -> Self {
        Level::new(dimension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchyOptions {
    /// Drop rows that are missing a value at any requested level before building.
    #[serde(default)]
    pub drop_missing: bool,
}

// ============================================================================
// DRILL OPTIONS
// ============================================================================

/// A named group of columns offered as drill-down dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillCategory {
    pub name: String,
    pub columns: Vec<String>,
}

impl DrillCategory {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DrillCategory {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// ENGINE CONFIGURATION
// ============================================================================

/// Session-level settings. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Number of next-level choices offered to the analyst.
    pub top_n: usize,

    /// Number of groups kept when ranking by average measure.
    pub rank_limit: usize,

    /// Dimensions treated as time-like in hierarchies, on top of the schema.
    pub time_dimensions: Vec<String>,

    /// Default hierarchy levels.
    pub hierarchy_levels: Vec<String>,

    /// Maximum number of levels in one hierarchy request.
    pub max_hierarchy_levels: usize,

    /// Numeric columns averaged in the view summary.
    pub summary_columns: Vec<String>,

    /// Dimensions whose distinct counts appear in the view summary.
    pub summary_dimensions: Vec<String>,

    /// Drill-option catalogue.
    pub categories: Vec<DrillCategory>,
}

impl Default for DrillConfig {
    fn default() -> Self {
        DrillConfig {
            top_n: 15,
            rank_limit: 20,
            time_dimensions: vec!["year".to_string()],
            hierarchy_levels: vec!["brand".to_string(), "series".to_string()],
            max_hierarchy_levels: 3,
            summary_columns: vec!["year".to_string(), "mileage_km".to_string()],
            summary_dimensions: vec!["brand".to_string(), "region".to_string()],
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<DrillCategory> {
    vec![
        DrillCategory::new("Brand", ["brand", "series", "model"]),
        DrillCategory::new("Region", ["region"]),
        DrillCategory::new("Year", ["year"]),
        DrillCategory::new("Price", ["price_ntd"]),
        DrillCategory::new("Fuel", ["fuel"]),
        DrillCategory::new("Transmission", ["transmission"]),
        DrillCategory::new("Color", ["color"]),
    ]
}

impl DrillConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DrillConfig = serde_json::from_str(json)?;
        config.validate()?;
        log_debug!(
            CAT_CONFIG,
            "loaded config: top_n={} rank_limit={} max_levels={}",
            config.top_n,
            config.rank_limit,
            config.max_hierarchy_levels
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(DrillError::InvalidConfig("top_n must be at least 1".to_string()));
        }
        if self.rank_limit == 0 {
            return Err(DrillError::InvalidConfig("rank_limit must be at least 1".to_string()));
        }
        if self.max_hierarchy_levels == 0 {
            return Err(DrillError::InvalidConfig(
                "max_hierarchy_levels must be at least 1".to_string(),
            ));
        }
        if let Some(category) = self.categories.iter().find(|c| c.name.trim().is_empty()) {
            return Err(DrillError::InvalidConfig(format!(
                "category with columns {:?} has no name",
                category.columns
            )));
        }
        Ok(())
    }

    pub fn is_time_dimension(&self, dimension: &str) -> bool {
        self.time_dimensions.iter().any(|d| d == dimension)
    }
}
