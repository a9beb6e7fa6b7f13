//! Error types for the reverse-engineering library.

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, invalid arguments).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for catalog query and connection failures.
pub const EXIT_CATALOG_ERROR: u8 = 2;
/// Exit code for schema model integrity violations.
pub const EXIT_SCHEMA_ERROR: u8 = 3;
/// Exit code for SQL text that could not be rewritten.
pub const EXIT_REWRITE_ERROR: u8 = 4;
/// Exit code for file system failures.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for reverse engineering and dialect operations.
#[derive(Error, Debug)]
pub enum ReverseError {
    /// Configuration error (invalid YAML, nullable identity column, bad limit arguments)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A catalog query failed.
    #[error("Catalog query failed: {message}\n  Query: {query}")]
    Catalog { query: String, message: String },

    /// SQL Server driver error
    #[cfg(feature = "mssql")]
    #[error("Source database error: {0}")]
    Source(#[from] tiberius::error::Error),

    /// The schema model was used out of order or references something missing.
    #[error("Schema integrity violation: {0}")]
    SchemaIntegrity(String),

    /// SQL text did not have the shape required for rewriting
    #[error("Cannot rewrite statement: {0}")]
    Rewrite(String),

    /// The platform cannot express the requested operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// IO error (file operations, LOB streams)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReverseError {
    /// Create a Catalog error for a failed query.
    pub fn catalog(query: impl Into<String>, message: impl Into<String>) -> Self {
        ReverseError::Catalog {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a SchemaIntegrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        ReverseError::SchemaIntegrity(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReverseError::Config(_) | ReverseError::Yaml(_) | ReverseError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            ReverseError::Catalog { .. } => EXIT_CATALOG_ERROR,
            #[cfg(feature = "mssql")]
            ReverseError::Source(_) => EXIT_CATALOG_ERROR,
            ReverseError::SchemaIntegrity(_) => EXIT_SCHEMA_ERROR,
            ReverseError::Rewrite(_) | ReverseError::Unsupported(_) => EXIT_REWRITE_ERROR,
            ReverseError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reverse-engineering operations.
pub type Result<T> = std::result::Result<T, ReverseError>;
