//! Schema validator
//!
//! Checks a table against a schema and collects every data-quality problem
//! into a [`ValidationReport`]. Only structurally broken input is an error.
//!
//! Report order:
//! 1. missing required columns (one diagnostic, names sorted)
//! 2. per-field diagnostics in schema declaration order
//! 3. within a field: type, then null/unparseable count, then constraints

use chrono::NaiveDateTime;
use std::collections::HashSet;
use tabcheck_ir::{ColumnData, Constraint, DataType, FieldSpec, Schema, StructuralError, TableSource};
use tracing::{debug, info};

use crate::coerce::{coerce, Coerced, Coercible};
use crate::diagnostic::{Diagnostic, ValidationReport};

/// Validator bound to one schema. Holds no per-run state.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Validator for [`Schema::canonical`]
    pub fn canonical() -> Self {
        Self::new(Schema::canonical())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate a table, returning every diagnostic found
    pub fn validate<T: TableSource + ?Sized>(
        &self,
        table: &T,
    ) -> Result<ValidationReport, StructuralError> {
        table.check_structure()?;

        let mut report = ValidationReport::new();
        self.check_missing_columns(table, &mut report);

        for field in &self.schema.fields {
            let Some(data) = table.column(&field.name) else {
                continue;
            };
            check_field(field, data, &mut report);
        }

        info!(
            schema = %self.schema.name,
            rows = table.row_count(),
            diagnostics = report.len(),
            "validation finished"
        );

        Ok(report)
    }

    /// Convert a JSON document to a table and validate it
    pub fn validate_json(
        &self,
        value: &serde_json::Value,
    ) -> Result<ValidationReport, StructuralError> {
        let table = tabcheck_ir::Table::from_json(value)?;
        self.validate(&table)
    }

    fn check_missing_columns<T: TableSource + ?Sized>(&self, table: &T, report: &mut ValidationReport) {
        let present: HashSet<&str> = table.column_names().into_iter().collect();
        let mut missing: Vec<String> = self
            .schema
            .field_names()
            .filter(|name| !present.contains(name))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            debug!(missing = ?missing, "required columns absent");
            report.push(Diagnostic::MissingColumns { columns: missing });
        }
    }

}

fn check_field(field: &FieldSpec, data: &ColumnData, report: &mut ValidationReport) {
    match field.data_type {
        // Presence is all that is required of identifiers
        DataType::Identifier => {}
        DataType::Text => {
            check_typed::<String>(field, data, report);
        }
        DataType::Timestamp => {
            check_typed::<NaiveDateTime>(field, data, report);
        }
        DataType::Numeric => {
            let coerced = check_typed::<f64>(field, data, report);
            check_constraints(field, &coerced, report);
        }
    }
}

/// Type and null checks shared by every coercible field type.
///
/// Columns already stored as `T` skip the type check; their missing count
/// is plain nulls.
fn check_typed<T: Coercible>(
    field: &FieldSpec,
    data: &ColumnData,
    report: &mut ValidationReport,
) -> Coerced<T> {
    let actual = data.column_type();
    let already_typed = actual == T::COLUMN_TYPE;
    let coerced = coerce::<T>(data);

    debug!(
        column = %field.name,
        expected = %field.data_type,
        actual = %actual,
        nulls = coerced.nulls,
        failures = coerced.failures,
        "coerced column"
    );

    if !already_typed && coerced.failed_entirely() {
        report.push(Diagnostic::TypeMismatch {
            column: field.name.clone(),
            expected: field.data_type,
            actual,
        });
    }

    if !field.nullable {
        let count = coerced.missing();
        if count > 0 {
            report.push(Diagnostic::NullValues {
                column: field.name.clone(),
                count,
                unparseable: coerced.failures,
            });
        }
    } else if coerced.failures > 0 {
        report.push(Diagnostic::UnparseableValues {
            column: field.name.clone(),
            count: coerced.failures,
        });
    }

    coerced
}

/// Domain checks over the values that coerced; unparseable cells are skipped
fn check_constraints(field: &FieldSpec, coerced: &Coerced<f64>, report: &mut ValidationReport) {
    for constraint in &field.constraints {
        match constraint {
            Constraint::NonNegative => {
                let count = coerced.present().filter(|v| **v < 0.0).count();
                if count > 0 {
                    report.push(Diagnostic::NegativeValues {
                        column: field.name.clone(),
                        count,
                    });
                }
            }
            Constraint::Range { min, max } => {
                let count = coerced
                    .present()
                    .filter(|v| min.is_some_and(|lo| **v < lo) || max.is_some_and(|hi| **v > hi))
                    .count();
                if count > 0 {
                    report.push(Diagnostic::OutOfRange {
                        column: field.name.clone(),
                        count,
                        min: *min,
                        max: *max,
                    });
                }
            }
        }
    }
}
