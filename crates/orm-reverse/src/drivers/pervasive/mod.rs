//! Pervasive.SQL driver.
//!
//! - [`PervasiveSchemaParser`]: reverse engineers a schema from the DDF dictionary
//! - [`PervasivePlatform`]: DDL and statement rewriting for Pervasive
//! - [`OdbcCatalog`]: live catalog connection (`odbc` feature)

#[cfg(feature = "odbc")]
mod catalog;
mod parser;
mod platform;

#[cfg(feature = "odbc")]
pub use catalog::OdbcCatalog;
pub use parser::PervasiveSchemaParser;
pub use platform::PervasivePlatform;
