//! In-memory tables and the `TableSource` trait the validator reads through

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Input that cannot be treated as a table at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Input is not tabular: {0}")]
    NotTabular(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' is listed but has no data")]
    MissingColumnData(String),
}

/// A single raw cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

/// Physical storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Numeric,
    Timestamp,
    Mixed,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Numeric => "numeric",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Typed column storage. `None` / `Value::Null` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
    Timestamp(Vec<Option<NaiveDateTime>>),
    Mixed(Vec<Value>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::Numeric(_) => ColumnType::Numeric,
            ColumnData::Timestamp(_) => ColumnType::Timestamp,
            ColumnData::Mixed(_) => ColumnType::Mixed,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Timestamp(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Mixed(v) => v.iter().filter(|c| c.is_null()).count(),
        }
    }

    /// Cell at `row` as a raw value, `None` when out of bounds
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::Text(v) => v
                .get(row)
                .map(|c| c.clone().map_or(Value::Null, Value::Text)),
            ColumnData::Numeric(v) => v.get(row).map(|c| c.map_or(Value::Null, Value::Number)),
            ColumnData::Timestamp(v) => v
                .get(row)
                .map(|c| c.map_or(Value::Null, Value::Timestamp)),
            ColumnData::Mixed(v) => v.get(row).cloned(),
        }
    }

    /// All cells as raw values
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|row| self.get(row)).collect()
    }

    /// Build the narrowest storage for a list of raw values.
    ///
    /// All-number → `Numeric`, all-text → `Text`, all-timestamp → `Timestamp`,
    /// otherwise (including all-null) `Mixed`.
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut kinds = values.iter().filter(|v| !v.is_null()).map(|v| match v {
            Value::Number(_) => ColumnType::Numeric,
            Value::Text(_) => ColumnType::Text,
            Value::Timestamp(_) => ColumnType::Timestamp,
            _ => ColumnType::Mixed,
        });

        let first = match kinds.next() {
            Some(kind) => kind,
            None => return ColumnData::Mixed(values),
        };
        if !kinds.all(|k| k == first) {
            return ColumnData::Mixed(values);
        }

        match first {
            ColumnType::Numeric => ColumnData::Numeric(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::Number(n) => Some(n),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnType::Text => ColumnData::Text(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::Text(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnType::Timestamp => ColumnData::Timestamp(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::Timestamp(ts) => Some(ts),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnType::Mixed => ColumnData::Mixed(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn timestamp(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self::new(name, ColumnData::Timestamp(values))
    }

    pub fn mixed(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(name, ColumnData::Mixed(values))
    }
}

/// Named-column, row-addressable tabular data
pub trait TableSource {
    /// Column names in table order
    fn column_names(&self) -> Vec<&str>;

    /// Data for a column by name
    fn column(&self, name: &str) -> Option<&ColumnData>;

    /// Number of rows every column must have
    fn row_count(&self) -> usize;

    /// Verify the source can be read as a table: unique names, every listed
    /// column readable, uniform row count.
    fn check_structure(&self) -> Result<(), StructuralError> {
        let expected = self.row_count();
        let mut seen = HashSet::new();

        for name in self.column_names() {
            if !seen.insert(name) {
                return Err(StructuralError::DuplicateColumn(name.to_string()));
            }
            let data = self
                .column(name)
                .ok_or_else(|| StructuralError::MissingColumnData(name.to_string()))?;
            if data.len() != expected {
                return Err(StructuralError::RaggedColumn {
                    column: name.to_string(),
                    expected,
                    actual: data.len(),
                });
            }
        }

        Ok(())
    }
}

/// Owned in-memory table with a uniform row count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, StructuralError> {
        let row_count = columns.first().map_or(0, |c| c.data.len());
        let table = Self { columns, row_count };
        table.check_structure()?;
        Ok(table)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Convert a JSON document into a table.
    ///
    /// Accepts a columnar object (`{"col": [..], ..}`) or an array of row
    /// objects (`[{"col": v, ..}, ..]`). Columnar objects keep document
    /// order; row arrays take column order from first appearance. Keys absent
    /// from a row become nulls.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, StructuralError> {
        match value {
            serde_json::Value::Object(map) => {
                let mut columns = Vec::with_capacity(map.len());
                for (name, cells) in map {
                    let cells = cells.as_array().ok_or_else(|| {
                        StructuralError::NotTabular(format!("column '{}' is not an array", name))
                    })?;
                    let values = cells.iter().map(json_to_value).collect();
                    columns.push(Column::new(name.clone(), ColumnData::from_values(values)));
                }
                Self::new(columns)
            }
            serde_json::Value::Array(rows) => {
                let mut names: Vec<&str> = Vec::new();
                for (idx, row) in rows.iter().enumerate() {
                    let row = row.as_object().ok_or_else(|| {
                        StructuralError::NotTabular(format!("row {} is not an object", idx))
                    })?;
                    for key in row.keys() {
                        if !names.contains(&key.as_str()) {
                            names.push(key);
                        }
                    }
                }

                let columns = names
                    .iter()
                    .map(|name| {
                        let values = rows
                            .iter()
                            .map(|row| row.get(*name).map_or(Value::Null, json_to_value))
                            .collect();
                        Column::new(*name, ColumnData::from_values(values))
                    })
                    .collect();
                Self::new(columns)
            }
            other => Err(StructuralError::NotTabular(format!(
                "expected an object or array, got {}",
                json_kind(other)
            ))),
        }
    }
}

impl TableSource for Table {
    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    fn row_count(&self) -> usize {
        self.row_count
    }
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        // Nested values are kept as their JSON text
        other => Value::Text(other.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Table::new(vec![
            Column::numeric("amount", vec![Some(1.0), Some(2.0)]),
            Column::text("partner", vec![Some("acme")]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            StructuralError::RaggedColumn {
                column: "partner".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::new(vec![
            Column::numeric("amount", vec![]),
            Column::numeric("amount", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, StructuralError::DuplicateColumn("amount".to_string()));
    }

    #[test]
    fn test_from_json_columnar() {
        let table = Table::from_json(&json!({
            "amount": [1, 2.5, null],
            "partner": ["a", "b", "c"],
            "mixed": [1, "x", true]
        }))
        .unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_names(), vec!["amount", "partner", "mixed"]);
        assert_eq!(table.column("amount").unwrap().column_type(), ColumnType::Numeric);
        assert_eq!(table.column("amount").unwrap().null_count(), 1);
        assert_eq!(table.column("partner").unwrap().column_type(), ColumnType::Text);
        assert_eq!(table.column("mixed").unwrap().column_type(), ColumnType::Mixed);
    }

    #[test]
    fn test_from_json_rows_fill_missing_keys() {
        let table = Table::from_json(&json!([
            {"date": "2024-01-01", "amount": 3},
            {"amount": 4, "partner": "acme"}
        ]))
        .unwrap();

        assert_eq!(table.column_names(), vec!["date", "amount", "partner"]);
        assert_eq!(table.column("date").unwrap().null_count(), 1);
        assert_eq!(table.column("partner").unwrap().get(0), Some(Value::Null));
    }

    #[test]
    fn test_from_json_scalar_is_structural_error() {
        for input in [json!(null), json!(42), json!("table")] {
            assert!(matches!(
                Table::from_json(&input),
                Err(StructuralError::NotTabular(_))
            ));
        }
        assert!(matches!(
            Table::from_json(&json!([1, 2])),
            Err(StructuralError::NotTabular(_))
        ));
    }

    #[test]
    fn test_all_null_values_are_mixed() {
        let data = ColumnData::from_values(vec![Value::Null, Value::Null]);
        assert_eq!(data.column_type(), ColumnType::Mixed);
        assert_eq!(data.null_count(), 2);
    }
}
