//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for drill-down integration tests.

#![allow(dead_code)]

use dataset::{DatasetView, ScalarValue};
use drilldown_engine::{Choice, Group};

// ============================================================================
// FIXTURES
// ============================================================================

/// A small used-car listing set. Years arrive both as numbers and as text,
/// and one listing has no price.
pub struct VehicleFixture;

impl VehicleFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["brand", "series", "model", "region", "year", "price_ntd", "mileage_km", "fuel"]
    }

    #[allow(clippy::type_complexity)]
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, ScalarValue, ScalarValue, f64, &'static str)> {
        vec![
            ("toyota", "altis", "altis 1.8", "taipei", 2019.into(), 600000.into(), 45000.0, "gasoline"),
            ("toyota", "altis", "altis 1.8", "taichung", "2020".into(), 680000.into(), 30000.0, "gasoline"),
            ("toyota", "camry", "camry hybrid", "taipei", 2021.into(), 1050000.into(), 15000.0, "hybrid"),
            ("toyota", "rav4", "rav4 2.0", "tainan", "2019.0".into(), 820000.into(), 52000.0, "gasoline"),
            ("honda", "fit", "fit 1.5", "taipei", 2018.into(), 420000.into(), 61000.0, "gasoline"),
            ("honda", "crv", "crv 1.5t", "kaohsiung", 2020.into(), 900000.into(), 28000.0, "gasoline"),
            ("honda", "fit", "fit 1.5", "tainan", " 2018 ".into(), ScalarValue::Empty, 70000.0, "gasoline"),
            ("nissan", "sentra", "sentra 1.8", "taichung", 2017.into(), 380000.into(), 88000.0, "gasoline"),
            ("bmw", "3 series", "320i", "taipei", 2020.into(), 1450000.into(), 20000.0, "gasoline"),
            ("bmw", "x1", "x1 sdrive18i", "taipei", ScalarValue::Empty, 1300000.into(), 35000.0, "gasoline"),
        ]
    }

    /// The fixture as a view: year is time-like, price is the measure,
    /// displayed in units of 10 000.
    pub fn view() -> DatasetView {
        let mut builder = DatasetView::builder(Self::headers())
            .time_like("year")
            .numeric("mileage_km")
            .measure("price_ntd")
            .scale(10000.0);
        for (brand, series, model, region, year, price, mileage, fuel) in Self::data() {
            builder = builder.row(vec![
                brand.into(),
                series.into(),
                model.into(),
                region.into(),
                year,
                price,
                mileage.into(),
                fuel.into(),
            ]);
        }
        builder.build().unwrap()
    }

    /// The three-row view used throughout the engine's documentation.
    pub fn toyota_honda() -> DatasetView {
        DatasetView::builder(["brand", "year", "price"])
            .time_like("year")
            .measure("price")
            .scale(10000.0)
            .row(vec!["toyota".into(), 2020.into(), 600000.into()])
            .row(vec!["toyota".into(), 2018.into(), 800000.into()])
            .row(vec!["honda".into(), 2019.into(), 500000.into()])
            .build()
            .unwrap()
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9 * expected.abs().max(1.0),
        "expected {} but got {}",
        expected,
        actual
    );
}

pub fn group_labels(groups: &[Group]) -> Vec<String> {
    groups.iter().map(|g| g.value.display_value()).collect()
}

pub fn choice_labels(choices: &[Choice]) -> Vec<String> {
    choices.iter().map(|c| c.value.display_value()).collect()
}

/// Assert that a group carries the expected count and average measure.
pub fn assert_group(group: &Group, value: &str, count: usize, average: Option<f64>) {
    assert_eq!(group.value.display_value(), value, "group value");
    assert_eq!(group.count, count, "count of group {}", value);
    match (group.average, average) {
        (Some(actual), Some(expected)) => assert_close(actual, expected),
        (actual, expected) => assert_eq!(actual, expected, "average of group {}", value),
    }
}
