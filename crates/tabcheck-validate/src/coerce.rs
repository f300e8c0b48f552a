//! Best-effort column coercion
//!
//! Converts every cell of a column to a target type. Cells that cannot be
//! converted become `None` and are counted instead of aborting the pass.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tabcheck_ir::{ColumnData, ColumnType, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A type column cells can be coerced into
pub trait Coercible: Sized {
    /// Storage type that already holds values of this type
    const COLUMN_TYPE: ColumnType;

    fn coerce_value(value: &Value) -> Option<Self>;
}

impl Coercible for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Numeric;

    fn coerce_value(value: &Value) -> Option<Self> {
        let n = match value {
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl Coercible for NaiveDateTime {
    const COLUMN_TYPE: ColumnType = ColumnType::Timestamp;

    fn coerce_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl Coercible for String {
    const COLUMN_TYPE: ColumnType = ColumnType::Text;

    fn coerce_value(value: &Value) -> Option<Self> {
        Some(value.to_string())
    }
}

/// Parse the timestamp layouts accepted in ingested files
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Result of coercing one column
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub values: Vec<Option<T>>,
    /// Cells that were null (or blank text) before coercion
    pub nulls: usize,
    /// Non-null cells that could not be converted
    pub failures: usize,
}

impl<T> Coerced<T> {
    pub fn converted(&self) -> usize {
        self.values.len() - self.nulls - self.failures
    }

    /// Nothing converted although there was something to convert
    pub fn failed_entirely(&self) -> bool {
        self.failures > 0 && self.converted() == 0
    }

    /// Cells missing after coercion
    pub fn missing(&self) -> usize {
        self.nulls + self.failures
    }

    /// Converted values only
    pub fn present(&self) -> impl Iterator<Item = &T> {
        self.values.iter().flatten()
    }
}

/// Coerce every cell of `data` to `T`, counting nulls and failures
pub fn coerce<T: Coercible>(data: &ColumnData) -> Coerced<T> {
    let mut coerced = Coerced {
        values: Vec::with_capacity(data.len()),
        nulls: 0,
        failures: 0,
    };

    for value in data.values() {
        if is_blank(&value) {
            coerced.nulls += 1;
            coerced.values.push(None);
            continue;
        }
        match T::coerce_value(&value) {
            Some(v) => coerced.values.push(Some(v)),
            None => {
                coerced.failures += 1;
                coerced.values.push(None);
            }
        }
    }

    coerced
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        _ => false,
    }
}
