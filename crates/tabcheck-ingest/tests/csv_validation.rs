//! Load CSV files from disk and validate them against the canonical schema

use std::fs;
use std::path::PathBuf;
use tabcheck_ingest::{CsvLoader, CsvOptions};
use tabcheck_ir::Schema;
use tabcheck_validate::{profile, validate, Diagnostic, DiagnosticKind};

fn write_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tabcheck_ingest_{}.csv", name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_clean_file_is_valid() {
    let path = write_csv(
        "clean",
        "date,partner,amount\n2024-01-01,acme,10\n2024-01-02,globex,0\n",
    );

    let table = CsvLoader::new().load_path(&path).unwrap();
    let report = validate(&table, &Schema::canonical()).unwrap();
    assert!(report.is_valid(), "unexpected: {:?}", report.messages());

    fs::remove_file(path).ok();
}

#[test]
fn test_text_amounts_report_unparseable_and_negative() {
    let path = write_csv(
        "mixed_amounts",
        "date,partner,amount\n2024-01-01,acme,10\n2024-01-02,acme,abc\n2024-01-03,acme,-3\n",
    );

    let table = CsvLoader::new().load_path(&path).unwrap();
    let report = validate(&table, &Schema::canonical()).unwrap();
    assert_eq!(
        report.diagnostics(),
        &[
            Diagnostic::NullValues {
                column: "amount".to_string(),
                count: 1,
                unparseable: 1,
            },
            Diagnostic::NegativeValues {
                column: "amount".to_string(),
                count: 1,
            },
        ]
    );

    fs::remove_file(path).ok();
}

#[test]
fn test_parsed_dates_count_only_nulls() {
    let path = write_csv(
        "parsed_dates",
        "date,partner,amount\n2024-01-01,acme,1\n,acme,2\n2024-01-01,acme,1\n",
    );

    let loader = CsvLoader::with_options(CsvOptions {
        parse_dates: vec!["date".to_string()],
        ..CsvOptions::default()
    });
    let table = loader.load_path(&path).unwrap();

    let report = validate(&table, &Schema::canonical()).unwrap();
    assert_eq!(report.messages(), vec!["Column 'date' has 1 null value(s)"]);

    let summary = profile(&table).unwrap();
    assert_eq!(summary.n_rows, 3);
    assert_eq!(summary.missing_in("date"), Some(1));
    assert_eq!(summary.n_duplicates, 1);

    fs::remove_file(path).ok();
}

#[test]
fn test_missing_columns_from_heterogeneous_export() {
    let path = write_csv("export", "fecha;socio;importe\n2024-01-01;acme;5\n");

    let loader = CsvLoader::with_options(CsvOptions {
        delimiter: b';',
        ..CsvOptions::default()
    });
    let table = loader.load_path(&path).unwrap();

    let report = validate(&table, &Schema::canonical()).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.count_of(DiagnosticKind::MissingColumns), 1);
    assert_eq!(
        report.messages()[0],
        "Missing required columns: amount, date, partner"
    );

    fs::remove_file(path).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let result = CsvLoader::new().load_path("/nonexistent/tabcheck/input.csv");
    assert!(matches!(result, Err(tabcheck_ingest::IngestError::Io(_))));
}
