//! Configuration type definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::schema::IdMethod;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog connection.
    pub source: SourceConfig,

    /// Reverse-engineering behavior.
    #[serde(default)]
    pub reverse: ReverseOptions,
}

/// Catalog connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Backend type: "mssql" or "pervasive".
    #[serde(default = "default_mssql")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 1433 for mssql, 1583 for pervasive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Encrypt connection (default: false).
    #[serde(default)]
    pub encrypt: bool,

    /// Trust server certificate (default: false).
    #[serde(default)]
    pub trust_server_cert: bool,

    /// ODBC driver name used for Pervasive connections.
    #[serde(default = "default_odbc_driver")]
    pub odbc_driver: String,
}

impl SourceConfig {
    /// Configured port, or the backend's well-known one.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.r#type.as_str() {
            "pervasive" | "psql" => 1583,
            _ => 1433,
        })
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.effective_port())
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("encrypt", &self.encrypt)
            .field("trust_server_cert", &self.trust_server_cert)
            .field("odbc_driver", &self.odbc_driver)
            .finish()
    }
}

/// Per-run reverse-engineering options handed to the parsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseOptions {
    /// Keep raw catalog names as logical names instead of sanitizing them.
    #[serde(default)]
    pub same_name: bool,

    /// Migration-tracking table excluded from discovery.
    #[serde(default = "default_migration_table")]
    pub migration_table: String,

    /// Id method assigned to discovered tables.
    #[serde(default)]
    pub default_id_method: IdMethod,

    /// Separator between tokens of sanitized names (Pervasive).
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Encoding labels for undecoded catalog fields, keyed by field name,
    /// 0-based field index or "*".
    #[serde(default)]
    pub encodings: BTreeMap<String, String>,
}

impl Default for ReverseOptions {
    fn default() -> Self {
        Self {
            same_name: false,
            migration_table: default_migration_table(),
            default_id_method: IdMethod::default(),
            separator: default_separator(),
            encodings: BTreeMap::new(),
        }
    }
}

// Default value functions for serde
fn default_mssql() -> String {
    "mssql".to_string()
}

fn default_odbc_driver() -> String {
    "Pervasive ODBC Interface".to_string()
}

fn default_migration_table() -> String {
    "schema_migration".to_string()
}

fn default_separator() -> String {
    "_".to_string()
}
