//! One reverse-engineering run: connect, parse, report.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::core::catalog::CatalogSource;
use crate::core::schema::Database;
use crate::drivers::{self, Backend};
use crate::error::Result;

/// Outcome of a reverse-engineering run.
#[derive(Debug, Clone, Serialize)]
pub struct ReverseResult {
    /// Backend the catalog was read from.
    pub backend: String,

    /// Number of tables discovered (migration table excluded).
    pub tables: usize,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Unsupported column types and other non-fatal problems.
    pub warnings: Vec<String>,

    /// The populated schema.
    pub schema: Database,
}

impl ReverseResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Just the schema, in the format `orm-reverse ddl` reads back.
    pub fn schema_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.schema)?)
    }
}

/// Connect to the configured catalog and reverse-engineer it.
pub async fn run(config: &Config) -> Result<ReverseResult> {
    let source = drivers::connect(&config.source).await?;
    run_with_source(config, source).await
}

/// Reverse-engineer through an already open catalog connection.
pub async fn run_with_source(
    config: &Config,
    source: Box<dyn CatalogSource>,
) -> Result<ReverseResult> {
    let started = Instant::now();
    let backend = Backend::from_db_type(&config.source.r#type)?;
    let mut parser = drivers::parser_for(backend, source, config.reverse.clone())?;

    let mut database = Database::new(config.source.database.clone());
    database.default_id_method = config.reverse.default_id_method;
    let tables = parser.parse(&mut database).await?;

    let warnings = parser.warnings().to_vec();
    let duration_seconds = started.elapsed().as_secs_f64();
    info!(
        "Reverse engineering of {} finished in {:.2}s",
        database.name, duration_seconds
    );

    Ok(ReverseResult {
        backend: parser.dialect().to_string(),
        tables,
        duration_seconds,
        warnings,
        schema: database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{CatalogRow, StaticCatalog};
    use crate::core::schema::IdMethod;

    fn config(yaml_type: &str) -> Config {
        Config::from_yaml(&format!(
            "source:\n  type: {}\n  host: db\n  database: shop\nreverse:\n  default_id_method: none\n",
            yaml_type
        ))
        .unwrap()
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new("mssql")
            .respond(
                "INFORMATION_SCHEMA.TABLES",
                vec![CatalogRow::new()
                    .with("TABLE_SCHEMA", "dbo")
                    .with("TABLE_NAME", "parts")],
            )
            .respond(
                "sp_columns 'parts'",
                vec![
                    CatalogRow::new()
                        .with("COLUMN_NAME", "id")
                        .with("TYPE_NAME", "int identity")
                        .with("LENGTH", 4i64)
                        .with("NULLABLE", 0i64),
                    CatalogRow::new()
                        .with("COLUMN_NAME", "shape")
                        .with("TYPE_NAME", "geometry")
                        .with("LENGTH", 0i64)
                        .with("NULLABLE", 1i64),
                ],
            )
            .respond(
                "CONSTRAINT_TYPE = 'PRIMARY KEY'",
                vec![CatalogRow::new().with("COLUMN_NAME", "id")],
            )
    }

    #[tokio::test]
    async fn test_run_with_source_reports_schema_and_warnings() {
        let result = run_with_source(&config("mssql"), Box::new(catalog()))
            .await
            .unwrap();

        assert_eq!(result.backend, "mssql");
        assert_eq!(result.tables, 1);
        assert_eq!(result.schema.name, "shop");
        assert_eq!(result.schema.default_id_method, IdMethod::None);

        let parts = result.schema.table("parts").unwrap();
        assert_eq!(parts.id_method, IdMethod::None);
        assert!(parts.column("id").unwrap().primary_key);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("geometry"));
    }

    #[tokio::test]
    async fn test_schema_yaml_reads_back() {
        let result = run_with_source(&config("mssql"), Box::new(catalog()))
            .await
            .unwrap();
        let yaml = result.schema_yaml().unwrap();
        let database: Database = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(database.tables.len(), 1);
        assert!(result.to_json().unwrap().contains("\"tables\": 1"));
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let failing = catalog().fail_on("sp_columns");
        let err = run_with_source(&config("mssql"), Box::new(failing))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CATALOG_ERROR);
    }
}
