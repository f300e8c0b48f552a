//! CSV loader producing tables for validation

use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tabcheck_ir::{Column, ColumnData, StructuralError, Table, TableSource};
use tabcheck_validate::coerce::coerce;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed table: {0}")]
    Structural(#[from] StructuralError),
}

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
    /// Store columns whose non-empty cells all parse as numbers as numeric
    pub infer_numeric: bool,
    /// Columns to parse eagerly as timestamps
    pub parse_dates: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            infer_numeric: true,
            parse_dates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    options: CsvOptions,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Table, IngestError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening csv");
        let file = File::open(path)?;
        self.load_reader(file)
    }

    /// Read a whole CSV stream into a table. Empty cells become missing.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Table, IngestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_headers)
            .from_reader(reader);

        let mut names: Vec<String> = if self.options.has_headers {
            rdr.headers()?.iter().map(|h| h.trim().to_string()).collect()
        } else {
            Vec::new()
        };
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

        for record in rdr.records() {
            let record = record?;
            if names.is_empty() && !self.options.has_headers {
                names = (1..=record.len()).map(|i| format!("column_{}", i)).collect();
                cells = vec![Vec::new(); names.len()];
            }
            for (idx, field) in record.iter().enumerate() {
                if let Some(column) = cells.get_mut(idx) {
                    let field = field.trim();
                    column.push((!field.is_empty()).then(|| field.to_string()));
                }
            }
        }

        for wanted in &self.options.parse_dates {
            if !names.contains(wanted) {
                warn!(column = %wanted, "parse_dates column not present in input");
            }
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let data = self.build_column(&name, values);
                Column::new(name, data)
            })
            .collect();

        let table = Table::new(columns)?;
        info!(
            rows = table.row_count(),
            columns = table.columns().len(),
            "loaded csv"
        );
        Ok(table)
    }

    fn build_column(&self, name: &str, values: Vec<Option<String>>) -> ColumnData {
        let text = ColumnData::Text(values);

        if self.options.parse_dates.iter().any(|c| c == name) {
            let parsed = coerce::<NaiveDateTime>(&text);
            if parsed.failures == 0 {
                return ColumnData::Timestamp(parsed.values);
            }
            warn!(
                column = %name,
                failures = parsed.failures,
                "could not parse every date, keeping column as text"
            );
            return text;
        }

        if self.options.infer_numeric {
            let parsed = coerce::<f64>(&text);
            if parsed.failures == 0 {
                return ColumnData::Numeric(parsed.values);
            }
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabcheck_ir::ColumnType;

    const SAMPLE: &str = "date,partner,amount\n\
                          2024-01-01,acme,10\n\
                          2024-01-02,globex,\n\
                          not-a-date,initech,-3.5\n";

    #[test]
    fn test_load_infers_numeric() -> Result<(), Box<dyn std::error::Error>> {
        let table = CsvLoader::new().load_reader(SAMPLE.as_bytes())?;

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_names(), vec!["date", "partner", "amount"]);

        let amount = table.column("amount").unwrap();
        assert_eq!(amount.column_type(), ColumnType::Numeric);
        assert_eq!(amount.null_count(), 1);
        assert_eq!(table.column("date").unwrap().column_type(), ColumnType::Text);
        Ok(())
    }

    #[test]
    fn test_parse_dates_falls_back_to_text() -> Result<(), Box<dyn std::error::Error>> {
        let loader = CsvLoader::with_options(CsvOptions {
            parse_dates: vec!["date".to_string()],
            ..CsvOptions::default()
        });

        let table = loader.load_reader(SAMPLE.as_bytes())?;
        assert_eq!(table.column("date").unwrap().column_type(), ColumnType::Text);

        let clean = "date,amount\n2024-01-01,1\n2024-01-02 08:00:00,2\n";
        let table = loader.load_reader(clean.as_bytes())?;
        assert_eq!(table.column("date").unwrap().column_type(), ColumnType::Timestamp);
        Ok(())
    }

    #[test]
    fn test_text_amounts_stay_text() -> Result<(), Box<dyn std::error::Error>> {
        let table = CsvLoader::new().load_reader("amount\n10\nabc\n-3\n".as_bytes())?;
        assert_eq!(table.column("amount").unwrap().column_type(), ColumnType::Text);
        Ok(())
    }

    #[test]
    fn test_headerless_and_delimiter() -> Result<(), Box<dyn std::error::Error>> {
        let loader = CsvLoader::with_options(CsvOptions {
            delimiter: b';',
            has_headers: false,
            ..CsvOptions::default()
        });

        let table = loader.load_reader("a;1\nb;2\n".as_bytes())?;
        assert_eq!(table.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(table.column("column_2").unwrap().column_type(), ColumnType::Numeric);
        Ok(())
    }

    #[test]
    fn test_ragged_rows_are_errors() {
        let result = CsvLoader::new().load_reader("a,b\n1,2\n3\n".as_bytes());
        assert!(matches!(result, Err(IngestError::Csv(_))));
    }

    #[test]
    fn test_duplicate_headers_are_structural() {
        let result = CsvLoader::new().load_reader("amount,amount\n1,2\n".as_bytes());
        assert!(matches!(
            result,
            Err(IngestError::Structural(StructuralError::DuplicateColumn(_)))
        ));
    }
}
