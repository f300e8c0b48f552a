//! Schema types: semantic column types, constraints and field specs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type a schema expects a column to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Date/time values
    Timestamp,
    /// Floating point numbers
    Numeric,
    /// Free text
    Text,
    /// Opaque identifier, checked for presence only
    Identifier,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Timestamp => "timestamp",
            DataType::Numeric => "numeric",
            DataType::Text => "text",
            DataType::Identifier => "identifier",
        };
        f.write_str(name)
    }
}

/// Value-domain constraint on a numeric field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Values must be `>= 0`
    NonNegative,
    /// Values must fall within the inclusive bounds
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            constraints: Vec::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Ordered set of required fields. Declaration order drives report order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The canonical ingestion schema: `date`, `partner`, `amount`
    pub fn canonical() -> Self {
        Self::new(
            "transactions",
            vec![
                FieldSpec::new("date", DataType::Timestamp),
                FieldSpec::new("partner", DataType::Identifier),
                FieldSpec::new("amount", DataType::Numeric).with_constraint(Constraint::NonNegative),
            ],
        )
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let schema = Schema::canonical();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["date", "partner", "amount"]);

        let amount = schema.find_field("amount").unwrap();
        assert!(!amount.nullable);
        assert_eq!(amount.constraints, vec![Constraint::NonNegative]);
        assert!(schema.find_field("missing").is_none());
    }

    #[test]
    fn test_field_spec_yaml_shape() {
        let json = serde_json::json!({
            "name": "amount",
            "type": "numeric",
            "constraints": ["non_negative", {"range": {"max": 100.0}}]
        });
        let field: FieldSpec = serde_json::from_value(json).unwrap();
        assert_eq!(field.data_type, DataType::Numeric);
        assert!(!field.nullable);
        assert_eq!(
            field.constraints,
            vec![
                Constraint::NonNegative,
                Constraint::Range { min: None, max: Some(100.0) }
            ]
        );
    }
}
