//! FILENAME: core/dataset/src/scalar.rs
//! PURPOSE: Cell values and the hashable keys used to group them.
//! CONTEXT: `ScalarValue` is what a loader puts into a row. `ScalarKey` is the
//! normalized, hashable form used by filters, aggregation and hierarchy
//! building. Every key is opaque: equality only, no fuzzy matching.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// CELL VALUE
// ============================================================================

/// A single cell of a dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl ScalarValue {
    pub fn text(s: impl Into<String>) -> Self {
        ScalarValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScalarValue::Empty)
    }

    /// Returns the numeric payload, or None for anything that is not a real number.
    /// NaN counts as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as a display string.
    pub fn display_value(&self) -> String {
        match self {
            ScalarValue::Empty => String::new(),
            ScalarValue::Number(n) => format_number(*n),
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        ScalarValue::Empty
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(value as f64)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Number(value as f64)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Empty, Into::into)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

/// Formats without unnecessary decimal places.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq, Ord and Hash for use as map keys.
/// NaN values are equal to each other and sort after every other number;
/// 0.0 and -0.0 are the same key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// GROUPING KEY
// ============================================================================

/// A normalized, hashable representation of a cell value.
/// Ordering: Empty < Number < Text < Date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKey {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Date(NaiveDate),
}

impl ScalarKey {
    pub fn number(n: f64) -> Self {
        ScalarKey::Number(OrderedFloat(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        ScalarKey::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScalarKey::Empty)
    }

    /// Converts the key back into a plain cell value for output records.
    pub fn to_value(&self) -> ScalarValue {
        match self {
            ScalarKey::Empty => ScalarValue::Empty,
            ScalarKey::Number(n) => ScalarValue::Number(n.0),
            ScalarKey::Text(s) => ScalarValue::Text(s.clone()),
            ScalarKey::Date(d) => ScalarValue::Date(*d),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ScalarKey::Empty => 0,
            ScalarKey::Number(_) => 1,
            ScalarKey::Text(_) => 2,
            ScalarKey::Date(_) => 3,
        }
    }
}

impl From<&ScalarValue> for ScalarKey {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::Empty => ScalarKey::Empty,
            ScalarValue::Number(n) => ScalarKey::Number(OrderedFloat(*n)),
            ScalarValue::Text(s) => ScalarKey::Text(s.clone()),
            ScalarValue::Date(d) => ScalarKey::Date(*d),
        }
    }
}

impl From<ScalarValue> for ScalarKey {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Text(s) => ScalarKey::Text(s),
            other => ScalarKey::from(&other),
        }
    }
}

impl From<&ScalarKey> for ScalarValue {
    fn from(key: &ScalarKey) -> Self {
        key.to_value()
    }
}

impl Ord for ScalarKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarKey::Number(a), ScalarKey::Number(b)) => a.cmp(b),
            (ScalarKey::Text(a), ScalarKey::Text(b)) => a.cmp(b),
            (ScalarKey::Date(a), ScalarKey::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ScalarKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScalarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKey::Empty => Ok(()),
            ScalarKey::Number(n) => f.write_str(&format_number(n.0)),
            ScalarKey::Text(s) => f.write_str(s),
            ScalarKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// ============================================================================
// TIME NORMALIZATION
// ============================================================================

/// Normalizes a time-like cell to a canonical key so that "2019", "2019.0",
/// " 2019 " and 2019.0 all land in the same group.
/// ISO dates in text become Date keys. Blank text and NaN become Empty.
pub fn normalize_time(value: &ScalarValue) -> ScalarKey {
    match value {
        ScalarValue::Empty => ScalarKey::Empty,
        ScalarValue::Number(n) if n.is_nan() => ScalarKey::Empty,
        ScalarValue::Number(n) => ScalarKey::number(*n),
        ScalarValue::Date(d) => ScalarKey::Date(*d),
        ScalarValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return ScalarKey::Empty;
            }
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return ScalarKey::number(n);
                }
            }
            if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return ScalarKey::Date(d);
            }
            ScalarKey::Text(trimmed.to_string())
        }
    }
}

/// Chronological comparison of normalized time keys.
/// A bare number is read as a year, so 2019 sorts just before 2019-05-01.
/// Unparseable text comes after every time value, Empty comes last.
pub fn compare_chronological(a: &ScalarKey, b: &ScalarKey) -> Ordering {
    fn bucket(key: &ScalarKey) -> u8 {
        match key {
            ScalarKey::Number(_) | ScalarKey::Date(_) => 0,
            ScalarKey::Text(_) => 1,
            ScalarKey::Empty => 2,
        }
    }

    match (a, b) {
        (ScalarKey::Number(x), ScalarKey::Number(y)) => x.cmp(y),
        (ScalarKey::Date(x), ScalarKey::Date(y)) => x.cmp(y),
        (ScalarKey::Number(x), ScalarKey::Date(d)) => OrderedFloat(x.0)
            .cmp(&OrderedFloat(d.year() as f64))
            .then(Ordering::Less),
        (ScalarKey::Date(d), ScalarKey::Number(y)) => OrderedFloat(d.year() as f64)
            .cmp(y)
            .then(Ordering::Greater),
        (ScalarKey::Text(x), ScalarKey::Text(y)) => x.cmp(y),
        _ => bucket(a).cmp(&bucket(b)),
    }
}
