//! Database driver implementations.
//!
//! - [`mssql`]: Microsoft SQL Server parser, platform and catalog connection
//! - [`pervasive`]: Pervasive.SQL parser, platform and catalog connection
//! - [`common`]: helpers shared by the parsers and platforms
//!
//! # Static dispatch
//!
//! [`PlatformImpl`] is an enum over the concrete platforms that implements
//! [`Platform`] by matching on the variant instead of going through a
//! vtable. Parsers are handed out boxed because they own an arbitrary
//! catalog source.
//!
//! # Adding a backend
//!
//! 1. Create a module under `drivers/` with a parser and a platform
//! 2. Add variants to [`Backend`] and [`PlatformImpl`]
//! 3. Wire it into [`parser_for`] and [`connect`]
//! 4. Gate its catalog connection behind a feature flag in `Cargo.toml`

pub mod common;
pub mod mssql;
pub mod pervasive;

pub use mssql::{MssqlPlatform, MssqlSchemaParser};
pub use pervasive::{PervasivePlatform, PervasiveSchemaParser};

use tracing::info;

use crate::config::{ReverseOptions, SourceConfig};
use crate::core::catalog::CatalogSource;
use crate::core::params::BoundParam;
use crate::core::schema::{Column, Database, FkAction, ForeignKey, Index, Table};
use crate::core::traits::{Platform, SchemaParser};
use crate::dialect::FromLogical;
use crate::error::{ReverseError, Result};

/// Supported catalog backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mssql,
    Pervasive,
}

impl Backend {
    /// Parse a backend from a configured type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        match db_type.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(Backend::Mssql),
            "pervasive" | "psql" => Ok(Backend::Pervasive),
            other => Err(ReverseError::Config(format!(
                "Unknown database type: '{}'. Supported types: mssql, pervasive",
                other
            ))),
        }
    }

    pub fn platform(self) -> PlatformImpl {
        match self {
            Backend::Mssql => PlatformImpl::Mssql(MssqlPlatform::new()),
            Backend::Pervasive => PlatformImpl::Pervasive(PervasivePlatform::new()),
        }
    }
}

/// Enum-based static dispatch for platforms.
#[derive(Debug, Clone)]
pub enum PlatformImpl {
    Mssql(MssqlPlatform),
    Pervasive(PervasivePlatform),
}

impl PlatformImpl {
    /// Create a platform implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        Backend::from_db_type(db_type).map(Backend::platform)
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $call:expr) => {
        match $self {
            PlatformImpl::Mssql($p) => $call,
            PlatformImpl::Pervasive($p) => $call,
        }
    };
}

impl Platform for PlatformImpl {
    fn name(&self) -> &str {
        dispatch!(self, p => p.name())
    }

    fn types(&self) -> &dyn FromLogical {
        dispatch!(self, p => p.types())
    }

    fn quote_identifier(&self, name: &str) -> String {
        dispatch!(self, p => p.quote_identifier(name))
    }

    fn apply_limit(&self, sql: &mut String, offset: i64, limit: i64) -> Result<()> {
        dispatch!(self, p => p.apply_limit(sql, offset, limit))
    }

    fn cleanup_sql(
        &self,
        sql: &mut String,
        params: &mut Vec<BoundParam>,
        database: &Database,
    ) -> Result<()> {
        dispatch!(self, p => p.cleanup_sql(sql, params, database))
    }

    fn max_column_name_length(&self) -> usize {
        dispatch!(self, p => p.max_column_name_length())
    }

    fn supports_schemas(&self) -> bool {
        dispatch!(self, p => p.supports_schemas())
    }

    fn supports_native_delete_trigger(&self) -> bool {
        dispatch!(self, p => p.supports_native_delete_trigger())
    }

    fn supports_insert_null_pk(&self) -> bool {
        dispatch!(self, p => p.supports_insert_null_pk())
    }

    fn quote_identifier_table(&self, name: &str) -> String {
        dispatch!(self, p => p.quote_identifier_table(name))
    }

    fn ignore_case(&self, expr: &str) -> String {
        dispatch!(self, p => p.ignore_case(expr))
    }

    fn to_upper_case(&self, expr: &str) -> String {
        dispatch!(self, p => p.to_upper_case(expr))
    }

    fn concat_string(&self, left: &str, right: &str) -> String {
        dispatch!(self, p => p.concat_string(left, right))
    }

    fn sub_string(&self, expr: &str, pos: i64, len: i64) -> String {
        dispatch!(self, p => p.sub_string(expr, pos, len))
    }

    fn str_length(&self, expr: &str) -> String {
        dispatch!(self, p => p.str_length(expr))
    }

    fn random(&self, seed: Option<i64>) -> String {
        dispatch!(self, p => p.random(seed))
    }

    fn null_string(&self, not_null: bool) -> &'static str {
        dispatch!(self, p => p.null_string(not_null))
    }

    fn auto_increment_string(&self, column: &Column) -> Option<String> {
        dispatch!(self, p => p.auto_increment_string(column))
    }

    fn has_size(&self, sql_type: &str) -> bool {
        dispatch!(self, p => p.has_size(sql_type))
    }

    fn column_type_ddl(&self, column: &Column) -> String {
        dispatch!(self, p => p.column_type_ddl(column))
    }

    fn column_default_ddl(&self, column: &Column) -> Option<String> {
        dispatch!(self, p => p.column_default_ddl(column))
    }

    fn column_ddl(&self, table: &Table, column: &Column) -> Result<String> {
        dispatch!(self, p => p.column_ddl(table, column))
    }

    fn begin_ddl(&self) -> String {
        dispatch!(self, p => p.begin_ddl())
    }

    fn end_ddl(&self) -> String {
        dispatch!(self, p => p.end_ddl())
    }

    fn comment_block_ddl(&self, comment: &str) -> String {
        dispatch!(self, p => p.comment_block_ddl(comment))
    }

    fn quoted_columns(&self, columns: &[&str]) -> String {
        dispatch!(self, p => p.quoted_columns(columns))
    }

    fn primary_key_ddl(&self, table: &Table) -> Option<String> {
        dispatch!(self, p => p.primary_key_ddl(table))
    }

    fn unique_ddl(&self, index: &Index) -> String {
        dispatch!(self, p => p.unique_ddl(index))
    }

    fn drop_table_ddl(&self, table: &Table) -> String {
        dispatch!(self, p => p.drop_table_ddl(table))
    }

    fn add_table_ddl(&self, table: &Table) -> Result<String> {
        dispatch!(self, p => p.add_table_ddl(table))
    }

    fn index_ddl(&self, table: &Table, index: &Index) -> String {
        dispatch!(self, p => p.index_ddl(table, index))
    }

    fn add_indices_ddl(&self, table: &Table) -> String {
        dispatch!(self, p => p.add_indices_ddl(table))
    }

    fn fk_action_sql(&self, action: FkAction) -> Option<&'static str> {
        dispatch!(self, p => p.fk_action_sql(action))
    }

    fn foreign_table_ddl(&self, fk: &ForeignKey) -> String {
        dispatch!(self, p => p.foreign_table_ddl(fk))
    }

    fn foreign_key_ddl(&self, fk: &ForeignKey) -> String {
        dispatch!(self, p => p.foreign_key_ddl(fk))
    }

    fn add_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> String {
        dispatch!(self, p => p.add_foreign_key_ddl(table, fk))
    }

    fn add_foreign_keys_ddl(&self, table: &Table) -> String {
        dispatch!(self, p => p.add_foreign_keys_ddl(table))
    }

    fn drop_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> String {
        dispatch!(self, p => p.drop_foreign_key_ddl(table, fk))
    }

    fn add_tables_ddl(&self, database: &Database) -> Result<String> {
        dispatch!(self, p => p.add_tables_ddl(database))
    }
}

/// Build the schema parser for `backend` reading from `source`.
pub fn parser_for(
    backend: Backend,
    source: Box<dyn CatalogSource>,
    options: ReverseOptions,
) -> Result<Box<dyn SchemaParser>> {
    let parser: Box<dyn SchemaParser> = match backend {
        Backend::Mssql => Box::new(MssqlSchemaParser::new(source, options)?),
        Backend::Pervasive => Box::new(PervasiveSchemaParser::new(source, options)?),
    };
    Ok(parser)
}

/// Open a catalog connection for the configured source.
///
/// # Errors
///
/// Returns a `Config` error when the backend's connection feature was not
/// compiled in.
pub async fn connect(config: &SourceConfig) -> Result<Box<dyn CatalogSource>> {
    let backend = Backend::from_db_type(&config.r#type)?;
    info!(
        "Connecting to {:?} catalog at {}:{}/{}",
        backend,
        config.host,
        config.effective_port(),
        config.database
    );
    match backend {
        #[cfg(feature = "mssql")]
        Backend::Mssql => Ok(Box::new(mssql::TiberiusCatalog::connect(config).await?)),
        #[cfg(feature = "odbc")]
        Backend::Pervasive => Ok(Box::new(pervasive::OdbcCatalog::connect(config).await?)),
        #[allow(unreachable_patterns)]
        other => Err(ReverseError::Config(format!(
            "Support for {:?} was not compiled in; rebuild with the '{}' feature",
            other,
            match other {
                Backend::Mssql => "mssql",
                Backend::Pervasive => "odbc",
            }
        ))),
    }
}
