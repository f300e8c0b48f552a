//! Basic quality summary of a table: rows, missing cells, duplicate rows

use serde::Serialize;
use std::collections::HashSet;
use tabcheck_ir::{StructuralError, TableSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableProfile {
    pub n_rows: usize,
    /// Null cells per column, in table column order
    pub n_missing: Vec<MissingCount>,
    /// Rows identical to an earlier row in every column
    pub n_duplicates: usize,
}

impl TableProfile {
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.n_missing
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.count)
    }
}

pub fn profile<T: TableSource + ?Sized>(table: &T) -> Result<TableProfile, StructuralError> {
    table.check_structure()?;

    let names = table.column_names();
    let columns: Vec<_> = names
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| StructuralError::MissingColumnData(name.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let n_missing = names
        .iter()
        .zip(&columns)
        .map(|(name, data)| MissingCount {
            column: name.to_string(),
            count: data.null_count(),
        })
        .collect();

    // Debug output keeps the cell's type, so "1" and 1 stay distinct
    let mut seen = HashSet::new();
    let mut n_duplicates = 0;
    for row in 0..table.row_count() {
        let key: Vec<String> = columns
            .iter()
            .map(|data| format!("{:?}", data.get(row)))
            .collect();
        if !seen.insert(key) {
            n_duplicates += 1;
        }
    }

    Ok(TableProfile {
        n_rows: table.row_count(),
        n_missing,
        n_duplicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabcheck_ir::{Column, Table, Value};

    #[test]
    fn test_profile_counts() {
        let table = Table::new(vec![
            Column::text("partner", vec![Some("a"), Some("a"), None, Some("a")]),
            Column::numeric("amount", vec![Some(1.0), Some(1.0), None, Some(2.0)]),
        ])
        .unwrap();

        let profile = profile(&table).unwrap();
        assert_eq!(profile.n_rows, 4);
        assert_eq!(profile.missing_in("partner"), Some(1));
        assert_eq!(profile.missing_in("amount"), Some(1));
        assert_eq!(profile.n_duplicates, 1);
    }

    #[test]
    fn test_duplicates_respect_cell_types() {
        let table = Table::new(vec![Column::mixed(
            "id",
            vec![Value::Text("1".to_string()), Value::Number(1.0), Value::Null, Value::Null],
        )])
        .unwrap();

        let profile = profile(&table).unwrap();
        assert_eq!(profile.n_duplicates, 1);
        assert_eq!(profile.missing_in("id"), Some(2));
    }

    #[test]
    fn test_empty_table() {
        let profile = profile(&Table::default()).unwrap();
        assert_eq!(profile.n_rows, 0);
        assert!(profile.n_missing.is_empty());
        assert_eq!(profile.n_duplicates, 0);
    }
}
