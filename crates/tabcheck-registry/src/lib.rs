//! Schema registry and YAML schema definitions

use std::collections::HashMap;
use std::path::Path;
use tabcheck_ir::Schema;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Invalid schema {schema}: {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse schema YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Name of the built-in canonical schema
pub const CANONICAL_SCHEMA: &str = "transactions";

pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            schemas: HashMap::new(),
        };
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.schemas
            .insert(CANONICAL_SCHEMA.to_string(), Schema::canonical());
    }

    /// Register a schema under `name`, replacing any previous definition
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> Result<(), RegistryError> {
        let name = name.into();
        check_schema(&name, &schema)?;
        debug!(schema = %name, fields = schema.fields.len(), "registered schema");
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Load a YAML schema file and register it under its declared name
    /// (or the file stem when the file leaves `name` empty).
    pub fn register_file<P: AsRef<Path>>(&mut self, path: P) -> Result<String, RegistryError> {
        let path = path.as_ref();
        let mut schema = load_schema_file(path)?;
        if schema.name.is_empty() {
            schema.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        let name = schema.name.clone();
        self.register(name.clone(), schema)?;
        Ok(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Schema, RegistryError> {
        self.schemas
            .get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))
    }

    /// Registered schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a schema definition from YAML.
///
/// Constraints are written as plain maps (`{ range: { max: 10 } }`) or bare
/// names (`non_negative`), not as YAML tags.
pub fn parse_schema_yaml(contents: &str) -> Result<Schema, RegistryError> {
    let schema: Schema = serde_yaml::with::singleton_map_recursive::deserialize(
        serde_yaml::Deserializer::from_str(contents),
    )?;
    check_schema(&schema.name, &schema)?;
    Ok(schema)
}

/// Read and parse a YAML schema file
pub fn load_schema_file<P: AsRef<Path>>(path: P) -> Result<Schema, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    parse_schema_yaml(&contents)
}

fn check_schema(name: &str, schema: &Schema) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidSchema {
        schema: name.to_string(),
        reason,
    };

    if schema.fields.is_empty() {
        return Err(invalid("no fields defined".to_string()));
    }

    let mut seen = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(invalid("field with empty name".to_string()));
        }
        if seen.contains(&field.name.as_str()) {
            return Err(invalid(format!("duplicate field '{}'", field.name)));
        }
        seen.push(field.name.as_str());
    }

    Ok(())
}
