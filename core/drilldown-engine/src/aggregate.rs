//! FILENAME: core/drilldown-engine/src/aggregate.rs
//! Aggregator - groups a view by one dimension and summarizes the measure.
//!
//! Algorithm:
//! 1. Resolve the dimension and measure columns (unknown names fail first)
//! 2. Bucket rows by grouping key in first-seen order (time-like keys normalized)
//! 3. Feed each row's measure into its bucket's accumulator
//! 4. Order the buckets (frequency, chronological, first-seen or explicit)

use std::cmp::Ordering;

use dataset::{compare_chronological, ColumnKind, DatasetView, Row, ScalarKey, ScalarValue};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::accumulator::{MeasureAccumulator, MeasureStats};
use crate::definition::{Filter, GroupOrder};
use crate::error::{DrillError, Result};
use crate::logging::{log_debug, CAT_AGG};

// ============================================================================
// GROUP
// ============================================================================

/// One group of an aggregation: the rows sharing a dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Empty for the synthetic all-rows group.
    pub dimension: String,
    pub value: ScalarValue,
    pub count: usize,
    pub numeric_count: usize,
    pub sum: Option<f64>,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

impl Group {
    pub(crate) fn from_stats(dimension: &str, value: ScalarValue, stats: MeasureStats) -> Self {
        Group {
            dimension: dimension.to_string(),
            value,
            count: stats.count,
            numeric_count: stats.numeric_count,
            sum: stats.sum,
            average: stats.average,
            min: stats.min,
            max: stats.max,
            median: stats.median,
            std_dev: stats.std_dev,
        }
    }

    /// The filter that narrows a view down to this group.
    pub fn filter(&self) -> Filter {
        Filter::new(self.dimension.clone(), self.value.clone())
    }

    pub fn key(&self) -> ScalarKey {
        ScalarKey::from(&self.value)
    }
}

// ============================================================================
// BUCKETING (shared with the hierarchy builder)
// ============================================================================

/// Rows sharing one grouping key.
pub(crate) struct Bucket<'a> {
    pub key: ScalarKey,
    pub accumulator: MeasureAccumulator,
    pub rows: Vec<&'a Row>,
}

impl<'a> Bucket<'a> {
    pub fn into_group(self, dimension: &str) -> (Group, Vec<&'a Row>) {
        let group = Group::from_stats(dimension, self.key.to_value(), self.accumulator.finish());
        (group, self.rows)
    }
}

/// Buckets rows by the key of `dim_index`, in first-seen order.
pub(crate) fn bucket_rows<'a>(
    rows: &[&'a Row],
    dim_index: usize,
    kind: ColumnKind,
    measure_index: usize,
) -> Vec<Bucket<'a>> {
    let mut positions: FxHashMap<ScalarKey, usize> = FxHashMap::default();
    let mut buckets: Vec<Bucket<'a>> = Vec::new();

    for &row in rows {
        let key = kind.key_of(row.get(dim_index));
        let position = match positions.get(&key) {
            Some(&p) => p,
            None => {
                let p = buckets.len();
                positions.insert(key.clone(), p);
                buckets.push(Bucket {
                    key,
                    accumulator: MeasureAccumulator::new(),
                    rows: Vec::new(),
                });
                p
            }
        };
        let bucket = &mut buckets[position];
        bucket.accumulator.add(row.get(measure_index).as_number());
        bucket.rows.push(row);
    }

    buckets
}

/// Descending count, ties broken by ascending key.
pub(crate) fn compare_frequency(a_count: u64, a_key: &ScalarKey, b_count: u64, b_key: &ScalarKey) -> Ordering {
    b_count.cmp(&a_count).then_with(|| a_key.cmp(b_key))
}

/// Sorts buckets in place according to the requested order.
pub(crate) fn order_buckets(buckets: &mut [Bucket<'_>], order: &GroupOrder, kind: ColumnKind) {
    let by_frequency = |a: &Bucket<'_>, b: &Bucket<'_>| {
        compare_frequency(a.accumulator.count, &a.key, b.accumulator.count, &b.key)
    };

    match order {
        GroupOrder::Auto if kind == ColumnKind::TimeLike => {
            buckets.sort_by(|a, b| compare_chronological(&a.key, &b.key));
        }
        GroupOrder::Auto | GroupOrder::Frequency => buckets.sort_by(by_frequency),
        GroupOrder::Chronological => {
            buckets.sort_by(|a, b| compare_chronological(&a.key, &b.key));
        }
        GroupOrder::FirstSeen => {}
        GroupOrder::Explicit(values) => {
            let wanted: Vec<ScalarKey> = values.iter().map(|v| kind.key_of(v)).collect();
            let rank = |key: &ScalarKey| wanted.iter().position(|w| w == key);
            buckets.sort_by(|a, b| match (rank(&a.key), rank(&b.key)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => by_frequency(a, b),
            });
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Groups `view` by `dimension` and computes measure statistics per group.
/// Ordering: descending count (ties by ascending value), or chronological
/// when the dimension is time-like.
pub fn aggregate(view: &DatasetView, dimension: &str, measure: &str) -> Result<Vec<Group>> {
    aggregate_with(view, dimension, measure, &GroupOrder::Auto)
}

/// Like `aggregate` with an explicit group order.
pub fn aggregate_with(
    view: &DatasetView,
    dimension: &str,
    measure: &str,
    order: &GroupOrder,
) -> Result<Vec<Group>> {
    let dim_index = view
        .column_index(dimension)
        .ok_or_else(|| DrillError::UnknownDimension(dimension.to_string()))?;
    let measure_index = view
        .column_index(measure)
        .ok_or_else(|| DrillError::UnknownMeasure(measure.to_string()))?;
    if view.is_empty() {
        return Err(DrillError::EmptyView);
    }

    let kind = view.schema().kind_of(dimension).unwrap_or_default();
    let rows: Vec<&Row> = view.rows().iter().collect();

    let mut buckets = bucket_rows(&rows, dim_index, kind, measure_index);
    order_buckets(&mut buckets, order, kind);

    let groups: Vec<Group> = buckets
        .into_iter()
        .map(|bucket| bucket.into_group(dimension).0)
        .collect();

    log_debug!(
        CAT_AGG,
        "aggregate {} by {}: {} rows -> {} groups",
        measure,
        dimension,
        view.len(),
        groups.len()
    );
    Ok(groups)
}

/// A single synthetic group over every row of the view.
pub fn aggregate_total(view: &DatasetView, measure: &str) -> Result<Group> {
    let measure_index = view
        .column_index(measure)
        .ok_or_else(|| DrillError::UnknownMeasure(measure.to_string()))?;
    if view.is_empty() {
        return Err(DrillError::EmptyView);
    }
    let rows: Vec<&Row> = view.rows().iter().collect();
    Ok(total_group(&rows, measure_index))
}

pub(crate) fn total_group(rows: &[&Row], measure_index: usize) -> Group {
    let mut accumulator = MeasureAccumulator::new();
    for row in rows {
        accumulator.add(row.get(measure_index).as_number());
    }
    Group::from_stats("", ScalarValue::Empty, accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_view() -> DatasetView {
        DatasetView::builder(["brand", "year", "price"])
            .time_like("year")
            .measure("price")
            .scale(10000.0)
            .row(vec!["toyota".into(), 2020.into(), 600000.into()])
            .row(vec!["toyota".into(), 2018.into(), 800000.into()])
            .row(vec!["honda".into(), "2019".into(), 500000.into()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_groups_ordered_by_count() {
        let view = create_test_view();
        let groups = aggregate(&view, "brand", "price").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].value, ScalarValue::text("toyota"));
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].average, Some(700000.0));
        assert_eq!(groups[0].min, Some(600000.0));
        assert_eq!(groups[0].max, Some(800000.0));
        assert_eq!(groups[0].median, Some(700000.0));
        assert_eq!(groups[1].value, ScalarValue::text("honda"));
        assert_eq!(groups[1].average, Some(500000.0));
    }

    #[test]
    fn test_time_like_dimension_ordered_chronologically() {
        let view = create_test_view();
        let groups = aggregate(&view, "year", "price").unwrap();
        let years: Vec<ScalarValue> = groups.iter().map(|g| g.value.clone()).collect();
        assert_eq!(
            years,
            vec![
                ScalarValue::Number(2018.0),
                ScalarValue::Number(2019.0),
                ScalarValue::Number(2020.0)
            ]
        );
    }

    #[test]
    fn test_ties_broken_by_ascending_value() {
        let view = DatasetView::builder(["brand", "price"])
            .measure("price")
            .row(vec!["nissan".into(), 1.into()])
            .row(vec!["audi".into(), 2.into()])
            .row(vec!["bmw".into(), 3.into()])
            .build()
            .unwrap();
        let groups = aggregate(&view, "brand", "price").unwrap();
        let names: Vec<String> = groups.iter().map(|g| g.value.display_value()).collect();
        assert_eq!(names, vec!["audi", "bmw", "nissan"]);
    }

    #[test]
    fn test_missing_measure_counted_only() {
        let view = DatasetView::builder(["brand", "price"])
            .measure("price")
            .row(vec!["ford".into(), 100.into()])
            .row(vec!["ford".into(), ScalarValue::Empty])
            .row(vec!["ford".into(), "call for price".into()])
            .build()
            .unwrap();
        let groups = aggregate(&view, "brand", "price").unwrap();
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].numeric_count, 1);
        assert_eq!(groups[0].average, Some(100.0));
    }

    #[test]
    fn test_errors() {
        let view = create_test_view();
        assert_eq!(
            aggregate(&view, "colour", "price").unwrap_err(),
            DrillError::UnknownDimension("colour".to_string())
        );
        assert_eq!(
            aggregate(&view, "brand", "mileage").unwrap_err(),
            DrillError::UnknownMeasure("mileage".to_string())
        );

        let empty = view.filter_rows(|_| false);
        assert_eq!(aggregate(&empty, "brand", "price").unwrap_err(), DrillError::EmptyView);
    }

    #[test]
    fn test_explicit_order() {
        let view = create_test_view();
        let order = GroupOrder::Explicit(vec!["honda".into()]);
        let groups = aggregate_with(&view, "brand", "price", &order).unwrap();
        assert_eq!(groups[0].value, ScalarValue::text("honda"));
        assert_eq!(groups[1].value, ScalarValue::text("toyota"));
    }

    #[test]
    fn test_first_seen_order() {
        let view = create_test_view();
        let groups = aggregate_with(&view, "year", "price", &GroupOrder::FirstSeen).unwrap();
        assert_eq!(groups[0].value, ScalarValue::Number(2020.0));
        assert_eq!(groups[2].value, ScalarValue::Number(2019.0));
    }

    #[test]
    fn test_total_group() {
        let view = create_test_view();
        let total = aggregate_total(&view, "price").unwrap();
        assert_eq!(total.count, 3);
        assert_eq!(total.sum, Some(1900000.0));
        assert_eq!(total.dimension, "");
    }

    #[test]
    fn test_group_filter() {
        let view = create_test_view();
        let groups = aggregate(&view, "brand", "price").unwrap();
        assert_eq!(groups[1].filter(), Filter::new("brand", "honda"));
    }
}
