//! FILENAME: core/drilldown-engine/src/units.rs
//! Unit conversion between raw measure values and display-scaled values.
//!
//! Aggregation never scales. A consumer that shows a group's numbers scales
//! them exactly once through `Group::scaled`, which yields a `ScaledGroup`
//! that has no way to be scaled again.

use dataset::{DatasetView, ScalarValue};
use serde::{Deserialize, Serialize};

use crate::aggregate::Group;
use crate::error::{DrillError, Result};

fn check_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(DrillError::InvalidScale(scale))
    }
}

/// raw / scale
pub fn to_display(raw_value: f64, scale: f64) -> Result<f64> {
    check_scale(scale)?;
    Ok(raw_value / scale)
}

/// display * scale
pub fn to_raw(display_value: f64, scale: f64) -> Result<f64> {
    check_scale(scale)?;
    Ok(display_value * scale)
}

/// A validated scale factor (finite, > 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayScale(f64);

impl DisplayScale {
    pub fn new(scale: f64) -> Result<Self> {
        check_scale(scale)?;
        Ok(DisplayScale(scale))
    }

    /// The scale declared on a view.
    pub fn of_view(view: &DatasetView) -> Result<Self> {
        DisplayScale::new(view.scale())
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn to_display(&self, raw_value: f64) -> f64 {
        raw_value / self.0
    }

    pub fn to_raw(&self, display_value: f64) -> f64 {
        display_value * self.0
    }
}

/// A group whose numeric fields are already in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledGroup {
    pub dimension: String,
    pub value: ScalarValue,
    pub count: usize,
    pub sum: Option<f64>,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    /// The factor the raw values were divided by.
    pub scale: f64,
}

impl Group {
    /// Converts the numeric fields to display units. Counts are never scaled.
    pub fn scaled(&self, scale: DisplayScale) -> ScaledGroup {
        let convert = |v: Option<f64>| v.map(|raw| scale.to_display(raw));
        ScaledGroup {
            dimension: self.dimension.clone(),
            value: self.value.clone(),
            count: self.count,
            sum: convert(self.sum),
            average: convert(self.average),
            min: convert(self.min),
            max: convert(self.max),
            median: convert(self.median),
            std_dev: convert(self.std_dev),
            scale: scale.factor(),
        }
    }
}
