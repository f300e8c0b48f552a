//! Diagnostics and the validation report

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use tabcheck_ir::{ColumnType, DataType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingColumns,
    TypeMismatch,
    NullValues,
    UnparseableValues,
    NegativeValues,
    OutOfRange,
}

/// One data-quality violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Required columns absent from the table, sorted by name
    MissingColumns { columns: Vec<String> },

    /// Column could not be read as the expected type at all
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: ColumnType,
    },

    /// Non-nullable column has missing cells. `unparseable` is the share of
    /// `count` that was present but failed coercion.
    NullValues {
        column: String,
        count: usize,
        unparseable: usize,
    },

    /// Nullable column has present cells that failed coercion
    UnparseableValues { column: String, count: usize },

    NegativeValues { column: String, count: usize },

    OutOfRange {
        column: String,
        count: usize,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MissingColumns { .. } => DiagnosticKind::MissingColumns,
            Diagnostic::TypeMismatch { .. } => DiagnosticKind::TypeMismatch,
            Diagnostic::NullValues { .. } => DiagnosticKind::NullValues,
            Diagnostic::UnparseableValues { .. } => DiagnosticKind::UnparseableValues,
            Diagnostic::NegativeValues { .. } => DiagnosticKind::NegativeValues,
            Diagnostic::OutOfRange { .. } => DiagnosticKind::OutOfRange,
        }
    }

    /// Column the diagnostic is about; `None` for table-level diagnostics
    pub fn column(&self) -> Option<&str> {
        match self {
            Diagnostic::MissingColumns { .. } => None,
            Diagnostic::TypeMismatch { column, .. }
            | Diagnostic::NullValues { column, .. }
            | Diagnostic::UnparseableValues { column, .. }
            | Diagnostic::NegativeValues { column, .. }
            | Diagnostic::OutOfRange { column, .. } => Some(column.as_str()),
        }
    }

    /// Number of offending cells, for count-based diagnostics
    pub fn count(&self) -> Option<usize> {
        match self {
            Diagnostic::MissingColumns { .. } | Diagnostic::TypeMismatch { .. } => None,
            Diagnostic::NullValues { count, .. }
            | Diagnostic::UnparseableValues { count, .. }
            | Diagnostic::NegativeValues { count, .. }
            | Diagnostic::OutOfRange { count, .. } => Some(*count),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingColumns { columns } => {
                write!(f, "Missing required columns: {}", columns.join(", "))
            }
            Diagnostic::TypeMismatch {
                column,
                expected,
                actual,
            } => match expected {
                DataType::Timestamp => write!(
                    f,
                    "Column '{}' is not a timestamp type (found {})",
                    column, actual
                ),
                DataType::Numeric => {
                    write!(f, "Column '{}' is not numeric (found {})", column, actual)
                }
                other => write!(
                    f,
                    "Column '{}' is not of type {} (found {})",
                    column, other, actual
                ),
            },
            Diagnostic::NullValues {
                column,
                count,
                unparseable,
            } => {
                if *unparseable > 0 {
                    write!(
                        f,
                        "Column '{}' has {} null or unparseable value(s)",
                        column, count
                    )
                } else {
                    write!(f, "Column '{}' has {} null value(s)", column, count)
                }
            }
            Diagnostic::UnparseableValues { column, count } => {
                write!(f, "Column '{}' has {} unparseable value(s)", column, count)
            }
            Diagnostic::NegativeValues { column, count } => {
                write!(f, "Column '{}' has {} negative value(s)", column, count)
            }
            Diagnostic::OutOfRange {
                column,
                count,
                min,
                max,
            } => {
                let lo = min.map_or_else(|| "-inf".to_string(), |v| v.to_string());
                let hi = max.map_or_else(|| "inf".to_string(), |v| v.to_string());
                write!(
                    f,
                    "Column '{}' has {} value(s) outside [{}, {}]",
                    column, count, lo, hi
                )
            }
        }
    }
}

/// Ordered diagnostics from one validation run. Empty means valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Human-readable messages in report order
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind() == kind).count()
    }

    /// First diagnostic of `kind` for `column`
    pub fn find(&self, kind: DiagnosticKind, column: &str) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.kind() == kind && d.column() == Some(column))
    }

    /// SHA-256 over the serialized diagnostics, for comparing runs
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(&self.diagnostics).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, diagnostic) in self.diagnostics.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
