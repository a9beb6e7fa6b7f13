//! # orm-reverse
//!
//! Database schema reverse engineering and SQL dialect support for an ORM.
//!
//! The library reads a live catalog into a portable schema model and renders
//! that model back as vendor DDL:
//!
//! - **Reverse engineering** of Microsoft SQL Server and Pervasive.SQL catalogs
//! - **Type registry** mapping native types to logical types and back
//! - **Identifier sanitizing** of raw catalog names into logical names
//! - **Platforms** for DDL, LIMIT emulation and LOB parameter inlining
//! - **Rewrite hook** applied to every prepared statement
//!
//! ## Example
//!
//! ```rust,no_run
//! use orm_reverse::{Config, Platform, PlatformImpl};
//!
//! #[tokio::main]
//! async fn main() -> orm_reverse::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let result = orm_reverse::reverse::run(&config).await?;
//!     let platform = PlatformImpl::from_db_type(&config.source.r#type)?;
//!     println!("{}", platform.add_tables_ddl(&result.schema)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod executor;
pub mod reverse;
pub mod rewrite;

// Re-exports for convenient access
pub use crate::core::{
    BoundParam, CatalogRow, CatalogSource, Column, Database, ForeignKey, Index, LogicalType,
    ParamValue, Platform, SchemaParser, StaticCatalog, Table,
};
pub use config::{Config, ReverseOptions, SourceConfig};
pub use drivers::{connect, parser_for, Backend, PlatformImpl};
pub use error::{ReverseError, Result};
pub use executor::{PreparedStatement, StatementPreparer};
pub use reverse::ReverseResult;
pub use rewrite::{remove_sql_rewriter, set_sql_rewriter, RewriteHook, SqlRewriter};
