//! FILENAME: core/drilldown-engine/src/top_n.rs
//! PURPOSE: Next-level choices for the analyst.
//! CONTEXT: `top_n` lists the most frequent values of a dimension in the
//! active view; the caller shows them and pushes the picked one onto the
//! filter stack. `rank_by_average` orders groups by their mean measure.

use std::cmp::Ordering;

use dataset::{DatasetView, ScalarKey, ScalarValue};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_with, compare_frequency, Group};
use crate::definition::{Filter, GroupOrder};
use crate::error::{DrillError, Result};
use crate::logging::{log_debug, CAT_AGG};

/// One selectable value with its share of the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: ScalarValue,
    pub count: usize,
    /// count / total rows × 100
    pub percentage: f64,
}

impl Choice {
    /// The filter that selecting this choice pushes.
    pub fn filter(&self, dimension: &str) -> Filter {
        Filter::new(dimension, self.value.clone())
    }
}

/// The `n` most frequent values of `dimension`, descending count with ties
/// broken by ascending value. Fewer distinct values than `n` returns them all.
pub fn top_n(view: &DatasetView, dimension: &str, n: usize) -> Result<Vec<Choice>> {
    let dim_index = view
        .column_index(dimension)
        .ok_or_else(|| DrillError::UnknownDimension(dimension.to_string()))?;
    if view.is_empty() {
        return Err(DrillError::EmptyView);
    }

    let mut counts: FxHashMap<ScalarKey, u64> = FxHashMap::default();
    for row in view.rows() {
        *counts.entry(view.key_at(row, dim_index)).or_insert(0) += 1;
    }
    let distinct = counts.len();

    let mut ranked: Vec<(ScalarKey, u64)> = counts.into_iter().collect();
    ranked.sort_by(|(a_key, a_count), (b_key, b_count)| {
        compare_frequency(*a_count, a_key, *b_count, b_key)
    });
    ranked.truncate(n);

    let total = view.len() as f64;
    let choices: Vec<Choice> = ranked
        .into_iter()
        .map(|(key, count)| Choice {
            value: key.to_value(),
            count: count as usize,
            percentage: count as f64 / total * 100.0,
        })
        .collect();

    log_debug!(
        CAT_AGG,
        "top_n {} (n={}): {} of {} distinct values",
        dimension,
        n,
        choices.len(),
        distinct
    );
    Ok(choices)
}

/// Groups of `dimension` ordered by descending average measure, truncated to
/// `n`. Groups without any numeric measure go last. Ties keep ascending value.
pub fn rank_by_average(view: &DatasetView, dimension: &str, measure: &str, n: usize) -> Result<Vec<Group>> {
    let mut groups = aggregate_with(view, dimension, measure, &GroupOrder::FirstSeen)?;
    groups.sort_by(|a, b| {
        let by_average = match (a.average, b.average) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_average.then_with(|| a.key().cmp(&b.key()))
    });
    groups.truncate(n);
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_view() -> DatasetView {
        DatasetView::builder(["brand", "price"])
            .measure("price")
            .row(vec!["toyota".into(), 600000.into()])
            .row(vec!["toyota".into(), 800000.into()])
            .row(vec!["honda".into(), 500000.into()])
            .row(vec!["bmw".into(), 1500000.into()])
            .row(vec!["audi".into(), ScalarValue::Empty])
            .build()
            .unwrap()
    }

    #[test]
    fn test_top_n_counts_and_percentages() {
        let view = create_test_view();
        let choices = top_n(&view, "brand", 2).unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].value, ScalarValue::text("toyota"));
        assert_eq!(choices[0].count, 2);
        assert!((choices[0].percentage - 40.0).abs() < 1e-9);
        // audi, bmw and honda tie on 1; ascending value wins
        assert_eq!(choices[1].value, ScalarValue::text("audi"));
    }

    #[test]
    fn test_top_n_no_padding() {
        let view = create_test_view();
        let choices = top_n(&view, "brand", 10).unwrap();
        assert_eq!(choices.len(), 4);
        let total: f64 = choices.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_zero() {
        let view = create_test_view();
        assert!(top_n(&view, "brand", 0).unwrap().is_empty());
    }

    #[test]
    fn test_top_n_errors() {
        let view = create_test_view();
        assert_eq!(
            top_n(&view, "region", 5).unwrap_err(),
            DrillError::UnknownDimension("region".to_string())
        );
        let empty = view.filter_rows(|_| false);
        assert_eq!(top_n(&empty, "brand", 5).unwrap_err(), DrillError::EmptyView);
    }

    #[test]
    fn test_choice_filter() {
        let view = create_test_view();
        let choice = &top_n(&view, "brand", 1).unwrap()[0];
        assert_eq!(choice.filter("brand"), Filter::new("brand", "toyota"));
    }

    #[test]
    fn test_rank_by_average() {
        let view = create_test_view();
        let ranked = rank_by_average(&view, "brand", "price", 3).unwrap();
        let names: Vec<String> = ranked.iter().map(|g| g.value.display_value()).collect();
        assert_eq!(names, vec!["bmw", "toyota", "honda"]);

        let all = rank_by_average(&view, "brand", "price", 20).unwrap();
        assert_eq!(all.last().unwrap().value, ScalarValue::text("audi"));
        assert_eq!(all.last().unwrap().average, None);
    }
}
