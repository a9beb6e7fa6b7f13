//! Core abstractions shared by every backend.
//!
//! - [`types`]: the portable logical type enumeration
//! - [`schema`]: Database, table, column, index and foreign key model
//! - [`identifier`]: quoting and sanitizing of catalog names
//! - [`catalog`]: catalog rows and the connection seam parsers read through
//! - [`params`]: bound statement parameters, including LOB streams
//! - [`traits`]: [`SchemaParser`] and [`Platform`]
//!
//! # Design Patterns
//!
//! - **Strategy**: `Platform` and the type tables provide interchangeable rendering
//! - **Template Method**: Default trait method implementations define algorithm skeletons

pub mod catalog;
pub mod identifier;
pub mod params;
pub mod schema;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::{CatalogRow, CatalogSource, CatalogValue, EncodingHints, StaticCatalog};
pub use params::{BoundParam, LobStream, ParamValue};
pub use schema::{
    Column, ColumnDefault, Database, DefaultKind, Domain, FkAction, ForeignKey, IdMethod, Index,
    IndexKind, Table,
};
pub use traits::{DiscoveredTable, Platform, SchemaParser};
pub use types::{LogicalType, StorageClass};
