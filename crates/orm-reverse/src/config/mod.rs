//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::IdMethod;
    use std::io::Write;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(
            "source:\n  type: pervasive\n  host: db1\n  database: DEMODATA\n",
        )
        .unwrap();
        assert_eq!(config.source.effective_port(), 1583);
        assert_eq!(config.reverse.migration_table, "schema_migration");
        assert_eq!(config.reverse.separator, "_");
        assert_eq!(config.reverse.default_id_method, IdMethod::Native);
        assert!(!config.reverse.same_name);
    }

    #[test]
    fn test_from_yaml_reads_reverse_block() {
        let yaml = r#"
source:
  host: localhost
  port: 14330
  database: shop
  user: sa
  password: secret
reverse:
  same_name: true
  default_id_method: none
  encodings:
    "*": windows-1252
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.r#type, "mssql");
        assert_eq!(config.source.effective_port(), 14330);
        assert!(config.reverse.same_name);
        assert_eq!(config.reverse.default_id_method, IdMethod::None);
        assert_eq!(config.reverse.encodings["*"], "windows-1252");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = Config::from_yaml("source: [").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source:\n  host: h\n  database: d").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.host, "h");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/orm-reverse.yaml").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO_ERROR);
    }
}
