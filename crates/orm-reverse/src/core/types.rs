//! Portable logical column types.
//!
//! Every native catalog type is normalized into one of these tags. Platforms
//! render them back into native SQL through their
//! [`FromLogical`](crate::dialect::FromLogical) table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReverseError;

/// Backend-independent column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalType {
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    #[serde(rename = "TINYINT")]
    TinyInt,
    Boolean,
    Decimal,
    Numeric,
    Real,
    Double,
    Float,
    Char,
    Varchar,
    #[serde(rename = "LONGVARCHAR")]
    LongVarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    #[serde(rename = "VARBINARY")]
    VarBinary,
    #[serde(rename = "LONGVARBINARY")]
    LongVarBinary,
    Blob,
    Object,
    Array,
    Enum,
}

/// Coarse storage family of a type. Two types with the same class can hold
/// each other's values without reinterpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Integer,
    Exact,
    Approximate,
    Text,
    LargeText,
    Temporal,
    Binary,
    LargeBinary,
}

impl LogicalType {
    /// Fallback for native types that have no mapping.
    pub const DEFAULT: LogicalType = LogicalType::Varchar;

    /// All tags, in declaration order.
    pub const ALL: [LogicalType; 24] = [
        LogicalType::Integer,
        LogicalType::BigInt,
        LogicalType::SmallInt,
        LogicalType::TinyInt,
        LogicalType::Boolean,
        LogicalType::Decimal,
        LogicalType::Numeric,
        LogicalType::Real,
        LogicalType::Double,
        LogicalType::Float,
        LogicalType::Char,
        LogicalType::Varchar,
        LogicalType::LongVarchar,
        LogicalType::Clob,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::Timestamp,
        LogicalType::Binary,
        LogicalType::VarBinary,
        LogicalType::LongVarBinary,
        LogicalType::Blob,
        LogicalType::Object,
        LogicalType::Array,
        LogicalType::Enum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Integer => "INTEGER",
            LogicalType::BigInt => "BIGINT",
            LogicalType::SmallInt => "SMALLINT",
            LogicalType::TinyInt => "TINYINT",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Decimal => "DECIMAL",
            LogicalType::Numeric => "NUMERIC",
            LogicalType::Real => "REAL",
            LogicalType::Double => "DOUBLE",
            LogicalType::Float => "FLOAT",
            LogicalType::Char => "CHAR",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::LongVarchar => "LONGVARCHAR",
            LogicalType::Clob => "CLOB",
            LogicalType::Date => "DATE",
            LogicalType::Time => "TIME",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Binary => "BINARY",
            LogicalType::VarBinary => "VARBINARY",
            LogicalType::LongVarBinary => "LONGVARBINARY",
            LogicalType::Blob => "BLOB",
            LogicalType::Object => "OBJECT",
            LogicalType::Array => "ARRAY",
            LogicalType::Enum => "ENUM",
        }
    }

    /// Storage family used to check that a round trip through a platform
    /// keeps values representable.
    ///
    /// BOOLEAN and ENUM are stored as small integers on every supported
    /// platform; OBJECT and ARRAY are serialized into large text.
    pub fn storage_class(&self) -> StorageClass {
        match self {
            LogicalType::Integer
            | LogicalType::BigInt
            | LogicalType::SmallInt
            | LogicalType::TinyInt
            | LogicalType::Boolean
            | LogicalType::Enum => StorageClass::Integer,
            LogicalType::Decimal | LogicalType::Numeric => StorageClass::Exact,
            LogicalType::Real | LogicalType::Double | LogicalType::Float => {
                StorageClass::Approximate
            }
            LogicalType::Char | LogicalType::Varchar => StorageClass::Text,
            LogicalType::LongVarchar
            | LogicalType::Clob
            | LogicalType::Object
            | LogicalType::Array => StorageClass::LargeText,
            LogicalType::Date | LogicalType::Time | LogicalType::Timestamp => {
                StorageClass::Temporal
            }
            LogicalType::Binary => StorageClass::Binary,
            LogicalType::VarBinary | LogicalType::LongVarBinary | LogicalType::Blob => {
                StorageClass::LargeBinary
            }
        }
    }

    /// Large-object types whose values may arrive as streams.
    pub fn is_lob(&self) -> bool {
        matches!(
            self,
            LogicalType::Clob
                | LogicalType::Blob
                | LogicalType::LongVarchar
                | LogicalType::LongVarBinary
                | LogicalType::VarBinary
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self.storage_class(),
            StorageClass::Text | StorageClass::LargeText
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.storage_class(),
            StorageClass::Integer | StorageClass::Exact | StorageClass::Approximate
        )
    }

    pub fn is_temporal(&self) -> bool {
        self.storage_class() == StorageClass::Temporal
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = ReverseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        LogicalType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ReverseError::Config(format!("Unknown logical type: {}", s)))
    }
}
