//! Configuration validation.

use super::Config;
use crate::core::catalog::EncodingHints;
use crate::error::{ReverseError, Result};

const KNOWN_BACKENDS: &[&str] = &["mssql", "sqlserver", "sql_server", "pervasive", "psql"];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(ReverseError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(ReverseError::Config("source.database is required".into()));
    }
    if !KNOWN_BACKENDS.contains(&config.source.r#type.as_str()) {
        return Err(ReverseError::Config(format!(
            "source.type must be 'mssql' or 'pervasive', got '{}'",
            config.source.r#type
        )));
    }
    if let Some(0) = config.source.port {
        return Err(ReverseError::Config("source.port must not be 0".into()));
    }

    // Reverse options validation
    let separator = &config.reverse.separator;
    if separator.chars().count() > 1 || separator.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ReverseError::Config(format!(
            "reverse.separator must be empty or a single non-alphanumeric character, got '{}'",
            separator
        )));
    }
    if config.reverse.migration_table.is_empty() {
        return Err(ReverseError::Config(
            "reverse.migration_table must not be empty".into(),
        ));
    }
    EncodingHints::from_labels(&config.reverse.encodings)?;

    Ok(())
}
