//! Configuration for the tabcheck CLI
//!
//! Loads configuration from:
//! 1. tabcheck.yaml - validation, ingestion, output and logging settings
//! 2. .env file / process environment - overrides
//!
//! Environment variables always override tabcheck.yaml values; command-line
//! flags override both.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabcheck_ingest::CsvOptions;
use tabcheck_registry::CANONICAL_SCHEMA;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Which schema to validate against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Registered schema name
    pub schema: String,

    /// YAML schema definition; takes precedence over `schema`
    pub schema_file: Option<PathBuf>,

    /// Exit non-zero when any diagnostics are reported
    pub fail_on_diagnostics: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            schema: CANONICAL_SCHEMA.to_string(),
            schema_file: None,
            fail_on_diagnostics: true,
        }
    }
}

/// CSV reader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub delimiter: String,
    pub has_headers: bool,
    pub infer_numeric: bool,
    pub parse_dates: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            has_headers: true,
            infer_numeric: true,
            parse_dates: Vec::new(),
        }
    }
}

impl IngestConfig {
    pub fn csv_options(&self) -> Result<CsvOptions, ConfigError> {
        let delimiter = match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "ingest.delimiter".to_string(),
                    reason: format!("expected a single ASCII character, got {:?}", self.delimiter),
                })
            }
        };

        Ok(CsvOptions {
            delimiter,
            has_headers: self.has_headers,
            infer_numeric: self.infer_numeric,
            parse_dates: self.parse_dates.clone(),
        })
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Include row/missing/duplicate counts with each report
    pub profile: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            profile: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stderr, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            output: "stderr".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub ingest: IngestConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(schema) = std::env::var("TABCHECK_SCHEMA") {
            self.validation.schema = schema;
        }
        if let Ok(path) = std::env::var("TABCHECK_SCHEMA_FILE") {
            self.validation.schema_file = Some(PathBuf::from(path));
        }
        if let Ok(format) = std::env::var("TABCHECK_OUTPUT_FORMAT") {
            self.output.format =
                OutputFormat::from_str(&format, true).map_err(|reason| ConfigError::Invalid {
                    key: "TABCHECK_OUTPUT_FORMAT".to_string(),
                    reason,
                })?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }

        Ok(())
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.validation.schema, "transactions");
        assert!(config.validation.fail_on_diagnostics);
        assert_eq!(config.ingest.delimiter, ",");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn test_partial_yaml_and_env_override() {
        std::env::set_var("TABCHECK_OUTPUT_FORMAT", "json");

        let config_yaml = r#"
validation:
  schema: payouts
ingest:
  delimiter: ";"
  parse_dates: [date]
"#;
        let temp_file = std::env::temp_dir().join("tabcheck_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.validation.schema, "payouts");
        assert_eq!(config.output.format, OutputFormat::Json); // Overridden
        assert!(!config.output.profile);

        let options = config.ingest.csv_options().unwrap();
        assert_eq!(options.delimiter, b';');
        assert_eq!(options.parse_dates, vec!["date".to_string()]);

        std::env::remove_var("TABCHECK_OUTPUT_FORMAT");
        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_invalid_delimiter() {
        let ingest = IngestConfig {
            delimiter: "||".to_string(),
            ..IngestConfig::default()
        };
        assert!(matches!(
            ingest.csv_options(),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
