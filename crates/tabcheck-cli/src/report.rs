//! Rendering validation results for the terminal or as JSON

use serde::Serialize;
use std::fmt::Write as _;
use tabcheck_validate::{Diagnostic, DiagnosticKind, TableProfile, ValidationReport};

/// Outcome of checking one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub schema: String,
    pub schema_fingerprint: String,
    pub valid: bool,
    pub diagnostics: Vec<DiagnosticOutput>,
    pub report_fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<TableProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticOutput {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticOutput {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            kind: diagnostic.kind(),
            column: diagnostic.column().map(str::to_string),
            count: diagnostic.count(),
            message: diagnostic.to_string(),
        }
    }
}

impl FileReport {
    pub fn new(
        file: impl Into<String>,
        schema: &tabcheck_ir::Schema,
        report: &ValidationReport,
        profile: Option<TableProfile>,
    ) -> Self {
        Self {
            file: file.into(),
            schema: schema.name.clone(),
            schema_fingerprint: schema.fingerprint(),
            valid: report.is_valid(),
            diagnostics: report.iter().map(DiagnosticOutput::from).collect(),
            report_fingerprint: report.fingerprint(),
            profile,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} (schema: {})", self.file, self.schema);

        if let Some(profile) = &self.profile {
            let missing: Vec<String> = profile
                .n_missing
                .iter()
                .map(|m| format!("{}={}", m.column, m.count))
                .collect();
            let _ = writeln!(
                out,
                "   rows: {}, duplicates: {}, missing: [{}]",
                profile.n_rows,
                profile.n_duplicates,
                missing.join(", ")
            );
        }

        if self.valid {
            let _ = writeln!(out, "   OK: no issues found");
        } else {
            for diagnostic in &self.diagnostics {
                let _ = writeln!(out, "   - {}", diagnostic.message);
            }
        }
        out
    }
}

pub fn render_json(reports: &[FileReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabcheck_ir::{Column, Schema, Table};
    use tabcheck_validate::{profile, validate};

    fn sample() -> (Schema, Table) {
        let table = Table::new(vec![
            Column::text("partner", vec![Some("acme"), Some("acme")]),
            Column::text("amount", vec![Some("10"), Some("-3")]),
        ])
        .unwrap();
        (Schema::canonical(), table)
    }

    #[test]
    fn test_text_rendering() {
        let (schema, table) = sample();
        let report = validate(&table, &schema).unwrap();
        let file_report = FileReport::new("payouts.csv", &schema, &report, Some(profile(&table).unwrap()));

        let text = file_report.render_text();
        assert!(text.starts_with("== payouts.csv (schema: transactions)\n"));
        assert!(text.contains("rows: 2, duplicates: 0, missing: [partner=0, amount=0]"));
        assert!(text.contains("   - Missing required columns: date\n"));
        assert!(text.contains("   - Column 'amount' has 1 negative value(s)\n"));
    }

    #[test]
    fn test_json_rendering() {
        let (schema, table) = sample();
        let report = validate(&table, &schema).unwrap();
        let file_report = FileReport::new("payouts.csv", &schema, &report, None);

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&[file_report]).unwrap()).unwrap();
        let entry = &json[0];
        assert_eq!(entry["valid"], false);
        assert_eq!(entry["diagnostics"][0]["kind"], "missing_columns");
        assert_eq!(entry["diagnostics"][1]["kind"], "negative_values");
        assert_eq!(entry["diagnostics"][1]["count"], 1);
        assert_eq!(entry["diagnostics"][1]["column"], "amount");
        assert!(entry.get("profile").is_none());
    }
}
