//! Spreadsheet cell to string coercion.
//!
//! The importer compares and stores text only, so every cell is rendered
//! to a string first. Plain values and formula results follow different
//! rules: a formula that evaluated to a number keeps its decimal point
//! (`5.0`), while a plain numeric cell drops it (`5`).

use calamine::{Data, ExcelDateTime};
use chrono::Timelike;

/// 2^63: the first float outside the `i64` range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A cell as seen by the importer.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    /// No cell at this position.
    Absent,
    /// A literal value.
    Value(&'a Data),
    /// A formula; the payload is its cached result.
    Formula(&'a Data),
}

impl Cell<'_> {
    /// Render the cell to text. Never fails; unreadable cells become "".
    #[must_use]
    pub fn to_text(self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Value(data) => value_to_string(data),
            Self::Formula(data) => formula_result_to_string(data),
        }
    }
}

/// Render a literal cell value.
#[must_use]
pub fn value_to_string(data: &Data) -> String {
    match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => number_to_string(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => datetime_to_string(dt),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Render the cached result of a formula cell.
///
/// Text results are used as-is, numeric results are rendered as decimals,
/// and anything else (errors, booleans, no cached value) is "".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn formula_result_to_string(data: &Data) -> String {
    match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => decimal_to_string(*f),
        Data::Int(i) => decimal_to_string(*i as f64),
        Data::DateTime(dt) => decimal_to_string(dt.as_f64()),
        Data::Bool(_) | Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Integral values print without a fractional part, others in full.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn number_to_string(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < I64_BOUND {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Always keeps a decimal point for finite values: `5` -> "5.0".
#[must_use]
pub fn decimal_to_string(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text + ".0"
    } else {
        text
    }
}

fn datetime_to_string(dt: &ExcelDateTime) -> String {
    if dt.is_datetime() {
        if let Some(value) = dt.as_datetime() {
            let format = if value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0 {
                "%Y-%m-%d"
            } else {
                "%Y-%m-%d %H:%M:%S"
            };
            return value.format(format).to_string();
        }
    }
    number_to_string(dt.as_f64())
}
