//! tabcheck validation engine
//!
//! Validates tables against a schema:
//! - Required column presence
//! - Type conformance (with best-effort coercion)
//! - Null / unparseable value counts
//! - Value-domain constraints
//!
//! Data-quality problems are collected as [`Diagnostic`]s; only input that
//! is not a table at all fails with a [`StructuralError`].

pub mod coerce;
pub mod diagnostic;
pub mod profile;
pub mod validator;

pub use diagnostic::{Diagnostic, DiagnosticKind, ValidationReport};
pub use profile::{profile, MissingCount, TableProfile};
pub use tabcheck_ir::StructuralError;
pub use validator::Validator;

use tabcheck_ir::{Schema, TableSource};

/// Validate `table` against `schema`
pub fn validate<T: TableSource + ?Sized>(
    table: &T,
    schema: &Schema,
) -> Result<ValidationReport, StructuralError> {
    Validator::new(schema.clone()).validate(table)
}

/// Validate a JSON document (columnar object or array of rows) against `schema`
pub fn validate_json(
    value: &serde_json::Value,
    schema: &Schema,
) -> Result<ValidationReport, StructuralError> {
    Validator::new(schema.clone()).validate_json(value)
}
