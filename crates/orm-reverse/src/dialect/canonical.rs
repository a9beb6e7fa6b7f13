//! Hub-and-spoke mapping through [`LogicalType`].
//!
//! - `ToLogical`: native catalog type string → logical type
//! - `FromLogical`: logical type → platform default native type
//!
//! Both directions are backed by static tables; nothing here is mutable.

use crate::core::types::{LogicalType, StorageClass};

/// Native → logical mapping for one backend's catalog.
pub trait ToLogical: Send + Sync {
    /// Dialect name (e.g., "mssql").
    fn dialect(&self) -> &str;

    /// Native type strings exactly as the catalog reports them.
    fn native_types(&self) -> &'static [(&'static str, LogicalType)];

    /// Case-sensitive lookup, qualifiers included (`"int identity"`).
    fn map_native(&self, native: &str) -> Option<LogicalType> {
        self.native_types()
            .iter()
            .find(|(name, _)| *name == native)
            .map(|(_, logical)| *logical)
    }
}

/// Logical → native mapping used when rendering DDL.
pub trait FromLogical: Send + Sync {
    /// Dialect name (e.g., "pervasive").
    fn dialect(&self) -> &str;

    /// Entries that differ from the portable default (the logical name itself).
    fn overrides(&self) -> &'static [(LogicalType, &'static str)];

    /// Default native type for a logical type.
    fn native_type(&self, logical: LogicalType) -> &'static str {
        self.overrides()
            .iter()
            .find(|(t, _)| *t == logical)
            .map(|(_, native)| *native)
            .unwrap_or_else(|| logical.as_str())
    }
}

/// Storage family of a rendered native type such as `VARCHAR(MAX)` or
/// `BINARY(7132)`. `None` for types this registry never emits.
pub fn native_storage_class(sql_type: &str) -> Option<StorageClass> {
    let upper = sql_type.trim().to_ascii_uppercase();
    let (base, args) = match upper.find('(') {
        Some(pos) => (upper[..pos].trim(), Some(upper[pos..].trim())),
        None => (upper.as_str(), None),
    };
    let unbounded = args == Some("(MAX)");

    let class = match base {
        "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "BIT" | "BOOLEAN"
        | "IDENTITY" | "SMALLIDENTITY" => StorageClass::Integer,
        "DECIMAL" | "NUMERIC" | "MONEY" | "SMALLMONEY" => StorageClass::Exact,
        "REAL" | "FLOAT" | "DOUBLE" => StorageClass::Approximate,
        "CHAR" | "NCHAR" | "VARCHAR" | "NVARCHAR" if unbounded => StorageClass::LargeText,
        "CHAR" | "NCHAR" | "VARCHAR" | "NVARCHAR" => StorageClass::Text,
        "LONGVARCHAR" | "TEXT" | "NTEXT" | "CLOB" => StorageClass::LargeText,
        "DATE" | "TIME" | "DATETIME" | "DATETIME2" | "SMALLDATETIME" | "TIMESTAMP" => {
            StorageClass::Temporal
        }
        "BINARY" => StorageClass::Binary,
        "VARBINARY" | "LONGVARBINARY" | "IMAGE" | "BLOB" => StorageClass::LargeBinary,
        _ => return None,
    };
    Some(class)
}
