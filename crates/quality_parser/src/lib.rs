//! Parser for data quality suite definitions and settings (YAML/TOML/JSON).
//!
//! This module turns the files an operator writes into strongly-typed
//! values: [`SuiteDefinition`]s, which build into persisted suites, and
//! [`Settings`], which describe where suites and results live.
//!
//! # Example
//!
//! ```rust
//! use quality_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: dataframe_validation_suite
//! rules:
//!   - kind: row_count_between
//!     min_value: 10000
//!     max_value: 50000
//!   - kind: ordered_columns_match
//!     column_list: [col1, col2, col3, col4, dt]
//!   - kind: columns_match
//!     column_set: [col1, col2, col3, col4, dt]
//!     exact_match: false
//! "#;
//!
//! let definition = parse_yaml(yaml).expect("Failed to parse definition");
//! let suite = definition.build().expect("Failed to build suite");
//! assert_eq!(suite.rules().len(), 3);
//! ```

mod definition;
mod settings;

pub use definition::*;
pub use settings::*;

use quality_core::{QualityError, Suite};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Parsed content does not make a valid rule, suite or configuration
    #[error(transparent)]
    Rule(#[from] QualityError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

fn parse_as<T: DeserializeOwned>(format: FileFormat, content: &str) -> Result<T> {
    match format {
        FileFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        FileFormat::Toml => toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string())),
        FileFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Parse a suite definition from a YAML string.
pub fn parse_yaml(content: &str) -> Result<SuiteDefinition> {
    parse_as(FileFormat::Yaml, content)
}

/// Parse a suite definition from a TOML string.
///
/// # Example
///
/// ```rust
/// use quality_parser::parse_toml;
///
/// let toml = r#"
/// name = "orders_suite"
///
/// [[rules]]
/// kind = "values_not_null"
/// column = "order_id"
///
/// [[rules]]
/// kind = "column_type_match"
/// column = "order_id"
/// type = "LongType"
/// "#;
///
/// let definition = parse_toml(toml).unwrap();
/// assert_eq!(definition.rules.len(), 2);
/// ```
pub fn parse_toml(content: &str) -> Result<SuiteDefinition> {
    parse_as(FileFormat::Toml, content)
}

/// Parse a suite definition from a JSON string.
pub fn parse_json(content: &str) -> Result<SuiteDefinition> {
    parse_as(FileFormat::Json, content)
}

/// Detect the file format from a path based on its extension.
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a suite definition from a file with automatic format detection.
///
/// ```no_run
/// use quality_parser::parse_file;
/// use std::path::Path;
///
/// let definition = parse_file(Path::new("suites/custom_table.yml")).unwrap();
/// println!("Loaded definition: {}", definition.name);
/// ```
pub fn parse_file(path: &Path) -> Result<SuiteDefinition> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "Parsing suite definition");
    parse_as(format, &content)
}

/// Parse a definition file and build its suite.
pub fn load_suite(path: &Path) -> Result<Suite> {
    parse_file(path)?.build()
}

/// Parse and validate a settings file (YAML, TOML or JSON).
pub fn parse_settings(path: &Path) -> Result<Settings> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = parse_as(format, &content)?;
    settings.validate()?;
    Ok(settings)
}
