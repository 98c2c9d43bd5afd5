//! FILENAME: core/drilldown-engine/src/accumulator.rs
//! Measure accumulation for one group of rows.
//!
//! Rows are fed one at a time. Rows without a numeric measure still count
//! towards the group's cardinality but not towards any numeric statistic.

use serde::{Deserialize, Serialize};

/// Incremental state for count/sum/min/max/mean/variance/median.
#[derive(Debug, Clone, Default)]
pub struct MeasureAccumulator {
    pub count: u64,
    pub count_numbers: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// For variance/stddev: sum of squared differences from mean.
    /// Using Welford's algorithm for numerical stability.
    pub m2: f64,
    pub mean: f64,
    /// Kept for the median.
    values: Vec<f64>,
}

impl MeasureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row carrying a numeric measure.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.count_numbers += 1;

        self.sum += value;

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        // Welford's algorithm for variance
        let delta = value - self.mean;
        self.mean += delta / (self.count_numbers as f64);
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.values.push(value);
    }

    /// Adds a row without a numeric measure (only increments count).
    pub fn add_missing(&mut self) {
        self.count += 1;
    }

    /// Adds a row given its (optional) measure.
    pub fn add(&mut self, value: Option<f64>) {
        match value {
            Some(v) => self.add_number(v),
            None => self.add_missing(),
        }
    }

    /// Merges another accumulator into this one.
    pub fn merge(&mut self, other: &MeasureAccumulator) {
        if other.count == 0 {
            return;
        }

        let combined_count = self.count_numbers + other.count_numbers;

        // Parallel Welford merge
        if self.count_numbers > 0 && other.count_numbers > 0 {
            let delta = other.mean - self.mean;
            let new_mean =
                self.mean + delta * (other.count_numbers as f64) / (combined_count as f64);
            self.m2 = self.m2
                + other.m2
                + delta * delta * (self.count_numbers as f64) * (other.count_numbers as f64)
                    / (combined_count as f64);
            self.mean = new_mean;
        } else if other.count_numbers > 0 {
            self.mean = other.mean;
            self.m2 = other.m2;
        }

        self.sum += other.sum;
        self.count += other.count;
        self.count_numbers = combined_count;

        if let Some(other_min) = other.min {
            self.min = Some(self.min.map_or(other_min, |m| m.min(other_min)));
        }
        if let Some(other_max) = other.max {
            self.max = Some(self.max.map_or(other_max, |m| m.max(other_max)));
        }

        self.values.extend_from_slice(&other.values);
    }

    /// Computes the final statistics.
    pub fn finish(&self) -> MeasureStats {
        let has_numbers = self.count_numbers > 0;
        MeasureStats {
            count: self.count as usize,
            numeric_count: self.count_numbers as usize,
            sum: has_numbers.then_some(self.sum),
            average: has_numbers.then(|| self.sum / (self.count_numbers as f64)),
            min: self.min,
            max: self.max,
            median: median(&self.values),
            std_dev: (self.count_numbers > 1)
                .then(|| (self.m2 / ((self.count_numbers - 1) as f64)).sqrt()),
        }
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Summary statistics of the measure over a set of rows.
/// Numeric fields are None when no row carried a numeric measure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasureStats {
    /// All rows, including those without a measure.
    pub count: usize,
    /// Rows that contributed to the numeric statistics.
    pub numeric_count: usize,
    pub sum: Option<f64>,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation; None below two values.
    pub std_dev: Option<f64>,
}
