//! Microsoft SQL Server driver.
//!
//! - [`MssqlSchemaParser`]: reverse engineers a schema from the catalog
//! - [`MssqlPlatform`]: DDL and statement rewriting for SQL Server
//! - [`TiberiusCatalog`]: live catalog connection (`mssql` feature)

#[cfg(feature = "mssql")]
mod catalog;
mod parser;
mod platform;

#[cfg(feature = "mssql")]
pub use catalog::TiberiusCatalog;
pub use parser::MssqlSchemaParser;
pub use platform::MssqlPlatform;
