//! FILENAME: tests/test_session.rs
//! Integration tests for an interactive drill-down session: choose, push,
//! navigate back, and read every chart's data from the active view.

mod common;

use common::{assert_close, choice_labels, group_labels, VehicleFixture};
use dataset::{DatasetView, ScalarValue};
use drilldown_engine::{DrillConfig, DrillError, DrillSession, Filter};

fn create_session() -> DrillSession {
    DrillSession::new(VehicleFixture::view(), DrillConfig::default()).unwrap()
}

// ============================================================================
// TWO-STEP SELECTION PROTOCOL
// ============================================================================

#[test]
fn test_choose_then_push_loop() {
    let mut session = create_session();

    let brands = session.choices("brand").unwrap();
    assert_eq!(choice_labels(&brands), vec!["toyota", "honda", "bmw", "nissan"]);
    assert_close(brands[0].percentage, 40.0);

    session.select("brand", brands[0].value.clone()).unwrap();
    let series = session.choices("series").unwrap();
    assert_eq!(choice_labels(&series), vec!["altis", "camry", "rav4"]);
    assert_close(series[0].percentage, 50.0);

    session.select("series", "altis").unwrap();
    assert_eq!(session.active_view().unwrap().len(), 2);

    let crumbs = session.breadcrumbs();
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[1].label, "series: altis");
}

#[test]
fn test_breadcrumb_jump_keeps_the_clicked_crumb() {
    let mut session = create_session();
    session.select("region", "taipei").unwrap();
    session.select("brand", "toyota").unwrap();
    session.select("fuel", "hybrid").unwrap();

    let clicked = session.breadcrumbs()[0].clone();
    session.jump(clicked.depth).unwrap();
    assert_eq!(session.breadcrumbs(), vec![clicked]);
    assert_eq!(session.active_view().unwrap().len(), 5);
}

#[test]
fn test_back_and_reset() {
    let mut session = create_session();
    assert_eq!(session.back(), None);

    session.select("brand", "honda").unwrap();
    session.select("region", "taipei").unwrap();
    assert_eq!(session.back(), Some(Filter::new("region", "taipei")));
    assert_eq!(session.active_view().unwrap().len(), 3);

    session.reset();
    assert!(session.stack().is_empty());
    assert_eq!(session.active_view().unwrap().len(), 10);
}

#[test]
fn test_reselecting_a_dimension_discards_deeper_choices() {
    let mut session = create_session();
    session.select("brand", "toyota").unwrap();
    session.select("series", "altis").unwrap();
    session.select("brand", "bmw").unwrap();

    assert_eq!(session.breadcrumbs().len(), 1);
    assert_eq!(session.active_view().unwrap().len(), 2);
}

#[test]
fn test_invalid_selection_reported() {
    let mut session = create_session();
    let err = session.select("transmission", "auto").unwrap_err();
    assert!(err.is_invalid_selection());
    let err = session.jump(3).unwrap_err();
    assert_eq!(err, DrillError::IndexOutOfRange { index: 3, depth: 0 });
}

#[test]
fn test_no_data_state() {
    let mut session = create_session();
    session.select("brand", "nissan").unwrap();
    session.select("region", "taipei").unwrap();

    assert!(session.choices("series").unwrap_err().is_no_data());
    assert!(session.aggregate("series").unwrap_err().is_no_data());
    assert!(session.default_hierarchy().unwrap_err().is_no_data());

    let summary = session.summary().unwrap();
    assert_eq!(summary.total_rows, 0);
}

// ============================================================================
// CHART DATA
// ============================================================================

#[test]
fn test_aggregate_memo_invalidated_on_every_mutation() {
    let mut session = create_session();
    session.aggregate("region").unwrap();
    session.aggregate("region").unwrap();
    assert_eq!(session.memo().hits(), 1);

    session.select("brand", "toyota").unwrap();
    assert!(session.memo().is_empty());
    let groups = session.aggregate("region").unwrap();
    assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), 4);

    session.back();
    assert!(session.memo().is_empty());
    session.aggregate("region").unwrap();

    session.jump(0).unwrap();
    assert!(session.memo().is_empty());
    session.aggregate("region").unwrap();

    session.reset();
    assert!(session.memo().is_empty());
}

#[test]
fn test_memo_results_match_recomputation() {
    let mut session = create_session();
    session.select("region", "taipei").unwrap();
    let first = session.aggregate("brand").unwrap();
    let cached = session.aggregate("brand").unwrap();
    let fresh = drilldown_engine::aggregate(&session.active_view().unwrap(), "brand", "price_ntd").unwrap();
    assert_eq!(first, cached);
    assert_eq!(cached, fresh);
}

#[test]
fn test_ranking_and_display_scale() {
    let session = create_session();
    let ranked = session.ranking("brand").unwrap();
    assert_eq!(group_labels(&ranked), vec!["bmw", "toyota", "honda", "nissan"]);

    let scale = session.display_scale().unwrap();
    let bmw = ranked[0].scaled(scale);
    assert_close(bmw.average.unwrap(), 137.5);
}

#[test]
fn test_default_hierarchy_and_level_cap() {
    let session = create_session();
    let root = session.default_hierarchy().unwrap();
    assert_eq!(root.children.len(), 4);
    assert_eq!(root.leaves().len(), 8);

    let capped = session
        .hierarchy(&["brand", "series", "region", "fuel"])
        .unwrap();
    assert!(capped.leaves().iter().all(|leaf| leaf.depth == 3));
}

#[test]
fn test_summary_and_categories() {
    let session = create_session();
    let summary = session.summary().unwrap();
    assert_eq!(summary.total_rows, 10);
    assert_eq!(summary.column_means.len(), 2);
    assert_close(summary.column_means[1].mean.unwrap(), 44400.0);

    let names: Vec<String> = session.categories().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Brand", "Region", "Year", "Price", "Fuel"]);
}

#[test]
fn test_config_from_json() {
    let config = DrillConfig::from_json(
        r#"{
            "top_n": 2,
            "time_dimensions": ["model_year"],
            "hierarchy_levels": ["model_year"]
        }"#,
    )
    .unwrap();

    let view = DatasetView::builder(["model_year", "price"])
        .measure("price")
        .row(vec!["2021".into(), 1.into()])
        .row(vec![2020.into(), 2.into()])
        .row(vec!["2020.0".into(), 3.into()])
        .build()
        .unwrap();
    let mut session = DrillSession::new(view, config).unwrap();

    assert!(session.base().is_time_like("model_year"));
    let root = session.default_hierarchy().unwrap();
    let years: Vec<ScalarValue> = root
        .children
        .iter()
        .map(|n| n.group.as_ref().unwrap().value.clone())
        .collect();
    assert_eq!(years, vec![ScalarValue::Number(2020.0), ScalarValue::Number(2021.0)]);

    session.select("model_year", "2020").unwrap();
    assert_eq!(session.active_view().unwrap().len(), 2);
}

#[test]
fn test_drill_through_current_trail() {
    let mut session = create_session();
    session.select("brand", "bmw").unwrap();
    let result = session.drill_through(1).unwrap();
    assert_eq!(result.total_count, 2);
    assert_eq!(result.source_rows, vec![8]);
    assert!(result.is_truncated);
}
