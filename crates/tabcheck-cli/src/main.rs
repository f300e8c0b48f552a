//! tabcheck - validate ingested CSV files against a canonical schema
//!
//! Loads each input file, validates it, and prints one report per file.
//! Exit codes: 0 when every file is valid, 1 when diagnostics were found,
//! 2 on fatal errors (unreadable input, malformed table, bad config).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tabcheck_ingest::CsvLoader;
use tabcheck_ir::Schema;
use tabcheck_registry::SchemaRegistry;
use tabcheck_validate::{profile, Validator};
use tracing::info;

mod config;
mod logging;
mod report;

use config::{Config, OutputFormat};
use report::FileReport;

const DEFAULT_CONFIG: &str = "tabcheck.yaml";

#[derive(Parser, Debug)]
#[command(name = "tabcheck")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./tabcheck.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registered schema to validate against
    #[arg(long)]
    schema: Option<String>,

    /// YAML schema definition to validate against
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Include row, missing-cell and duplicate-row counts
    #[arg(long)]
    profile: bool,

    /// Columns to parse as timestamps while loading (comma separated)
    #[arg(long, value_delimiter = ',')]
    parse_dates: Vec<String>,

    /// CSV files to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns `false` when diagnostics should fail the run
fn run(cli: Cli) -> Result<bool> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_flags(&mut config, &cli);

    config.apply_logging_env();
    logging::init();

    let schema = resolve_schema(&config)?;
    let loader = CsvLoader::with_options(config.ingest.csv_options()?);
    let validator = Validator::new(schema);

    info!(
        schema = %validator.schema().name,
        files = cli.files.len(),
        "starting validation"
    );

    let mut reports = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let file_report = check_file(&loader, &validator, path, config.output.profile)?;
        if config.output.format == OutputFormat::Text {
            print!("{}", file_report.render_text());
        }
        reports.push(file_report);
    }

    if config.output.format == OutputFormat::Json {
        println!("{}", report::render_json(&reports)?);
    }

    let all_valid = reports.iter().all(|r| r.valid);
    Ok(all_valid || !config.validation.fail_on_diagnostics)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Config::load(DEFAULT_CONFIG).context("failed to load tabcheck.yaml")
        }
        None => Ok(Config::from_env()?),
    }
}

fn apply_flags(config: &mut Config, cli: &Cli) {
    if let Some(schema) = &cli.schema {
        config.validation.schema = schema.clone();
        // An explicit name beats a schema file from config or env
        config.validation.schema_file = None;
    }
    if let Some(path) = &cli.schema_file {
        config.validation.schema_file = Some(path.clone());
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.profile {
        config.output.profile = true;
    }
    if !cli.parse_dates.is_empty() {
        config.ingest.parse_dates = cli.parse_dates.clone();
    }
}

fn resolve_schema(config: &Config) -> Result<Schema> {
    let mut registry = SchemaRegistry::new();

    let name = match &config.validation.schema_file {
        Some(path) => registry
            .register_file(path)
            .with_context(|| format!("failed to load schema file {}", path.display()))?,
        None => config.validation.schema.clone(),
    };

    let schema = registry.lookup(&name).with_context(|| {
        format!("available schemas: {}", registry.names().join(", "))
    })?;
    Ok(schema.clone())
}

fn check_file(
    loader: &CsvLoader,
    validator: &Validator,
    path: &Path,
    with_profile: bool,
) -> Result<FileReport> {
    let table = loader
        .load_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let report = validator
        .validate(&table)
        .with_context(|| format!("{} is not a valid table", path.display()))?;
    let table_profile = if with_profile {
        Some(profile(&table)?)
    } else {
        None
    };

    log_event!(
        level: tracing::Level::INFO,
        event: "file_validated",
        file: path.display().to_string(),
        diagnostics: report.len(),
    );

    Ok(FileReport::new(
        path.display().to_string(),
        validator.schema(),
        &report,
        table_profile,
    ))
}
