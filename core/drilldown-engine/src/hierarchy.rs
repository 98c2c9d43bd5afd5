//! FILENAME: core/drilldown-engine/src/hierarchy.rs
//! Hierarchy Builder - nested aggregation over an ordered list of dimensions.
//!
//! Algorithm:
//! 1. Resolve every level to a column index and grouping kind
//! 2. Optionally drop rows missing a value at any level
//! 3. At depth d, bucket the parent's rows by level d (Aggregator ordering rule)
//! 4. Recurse into each bucket until the last level, which yields leaves
//!
//! Time-like levels group by the normalized time key, so 2019, "2019" and
//! "2019.0" form one node and siblings read left to right in time.

use dataset::{ColumnKind, DatasetView, Row, ScalarKey, ScalarValue};
use serde::{Deserialize, Serialize};

use crate::aggregate::{bucket_rows, order_buckets, total_group, Group};
use crate::definition::{Filter, GroupOrder, HierarchyOptions, Level};
use crate::error::{DrillError, Result};
use crate::logging::{log_debug, log_enter, log_exit, CAT_HIER};

// ============================================================================
// TREE STRUCTURES
// ============================================================================

/// A node in the hierarchy tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Statistics of the rows under this node. None on the root, except
    /// when no levels were requested.
    pub group: Option<Group>,

    /// The dimension this node's value belongs to (None on the root).
    pub dimension: Option<String>,

    /// Depth in the tree (0 = root).
    pub depth: usize,

    /// Filters from the root down to and including this node.
    pub path: Vec<Filter>,

    /// Child nodes (next level of grouping).
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn root(group: Option<Group>) -> Self {
        HierarchyNode {
            group,
            dimension: None,
            depth: 0,
            path: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Display label of the node's value.
    pub fn label(&self) -> String {
        self.group
            .as_ref()
            .map(|g| g.value.display_value())
            .unwrap_or_default()
    }

    /// Leaf nodes in depth-first order.
    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a HierarchyNode>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::node_count).sum::<usize>()
    }

    /// Follows one value per level from this node. An empty path returns self.
    pub fn find(&self, values: &[ScalarValue]) -> Option<&HierarchyNode> {
        let Some((first, rest)) = values.split_first() else {
            return Some(self);
        };
        let wanted = ScalarKey::from(first);
        self.children
            .iter()
            .find(|child| child.group.as_ref().map(Group::key).as_ref() == Some(&wanted))
            .or_else(|| {
                // A time-like level stores normalized keys; retry with one.
                let normalized = ColumnKind::TimeLike.key_of(first);
                self.children
                    .iter()
                    .find(|child| child.group.as_ref().map(Group::key).as_ref() == Some(&normalized))
            })
            .and_then(|child| child.find(rest))
    }
}

// ============================================================================
// BUILDER
// ============================================================================

struct ResolvedLevel {
    dimension: String,
    index: usize,
    kind: ColumnKind,
    /// Carried onto path filters when the level's kind differs from the schema's.
    time_like: Option<bool>,
}

/// Builds the hierarchy for `dimensions` over `view`, using each column's
/// declared kind.
pub fn build<S: AsRef<str>>(view: &DatasetView, dimensions: &[S], measure: &str) -> Result<HierarchyNode> {
    let levels: Vec<Level> = dimensions.iter().map(|d| Level::new(d.as_ref())).collect();
    build_with(view, &levels, measure, &HierarchyOptions::default())
}

/// Like `build`, with per-level kind overrides and options.
pub fn build_with(
    view: &DatasetView,
    levels: &[Level],
    measure: &str,
    options: &HierarchyOptions,
) -> Result<HierarchyNode> {
    log_enter!(CAT_HIER, "build_with", "levels={} rows={}", levels.len(), view.len());
    let result = build_tree(view, levels, measure, options);
    log_exit!(CAT_HIER, "build_with", "ok={}", result.is_ok());
    result
}

fn build_tree(
    view: &DatasetView,
    levels: &[Level],
    measure: &str,
    options: &HierarchyOptions,
) -> Result<HierarchyNode> {
    let resolved = levels
        .iter()
        .map(|level| {
            let index = view
                .column_index(&level.dimension)
                .ok_or_else(|| DrillError::UnknownDimension(level.dimension.clone()))?;
            let schema_kind = view.schema().kind_of(&level.dimension).unwrap_or_default();
            let kind = level.effective_kind(schema_kind);
            Ok(ResolvedLevel {
                dimension: level.dimension.clone(),
                index,
                kind,
                time_like: (kind != schema_kind).then_some(kind == ColumnKind::TimeLike),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let measure_index = view
        .column_index(measure)
        .ok_or_else(|| DrillError::UnknownMeasure(measure.to_string()))?;
    if view.is_empty() {
        return Err(DrillError::EmptyView);
    }

    let mut rows: Vec<&Row> = view.rows().iter().collect();
    if options.drop_missing {
        rows.retain(|row| {
            resolved
                .iter()
                .all(|level| !level.kind.key_of(row.get(level.index)).is_empty())
        });
        if rows.is_empty() {
            return Err(DrillError::EmptyView);
        }
    }

    if resolved.is_empty() {
        log_debug!(CAT_HIER, "no levels requested, returning total over {} rows", rows.len());
        return Ok(HierarchyNode::root(Some(total_group(&rows, measure_index))));
    }

    let mut root = HierarchyNode::root(None);
    root.children = build_level(&resolved, 0, &rows, measure_index, &[]);

    log_debug!(
        CAT_HIER,
        "built hierarchy over {:?}: {} rows -> {} nodes",
        resolved.iter().map(|l| l.dimension.as_str()).collect::<Vec<_>>(),
        rows.len(),
        root.node_count()
    );
    Ok(root)
}

/// Recursively builds one level of the tree.
fn build_level(
    levels: &[ResolvedLevel],
    level: usize,
    rows: &[&Row],
    measure_index: usize,
    parent_path: &[Filter],
) -> Vec<HierarchyNode> {
    let Some(current) = levels.get(level) else {
        return Vec::new();
    };

    let mut buckets = bucket_rows(rows, current.index, current.kind, measure_index);
    order_buckets(&mut buckets, &GroupOrder::Auto, current.kind);

    let mut nodes = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let (group, group_rows) = bucket.into_group(&current.dimension);

        let mut path = parent_path.to_vec();
        path.push(group.filter().with_time_like(current.time_like));

        let children = if level + 1 < levels.len() {
            build_level(levels, level + 1, &group_rows, measure_index, &path)
        } else {
            Vec::new()
        };

        nodes.push(HierarchyNode {
            group: Some(group),
            dimension: Some(current.dimension.clone()),
            depth: level + 1,
            path,
            children,
        });
    }
    nodes
}
