//! Static type tables for SQL Server and Pervasive.

use super::canonical::{FromLogical, ToLogical};
use crate::core::types::LogicalType;

use LogicalType::*;

/// SQL Server catalog types as reported by `sp_columns` (TYPE_NAME).
static MSSQL_NATIVE: &[(&str, LogicalType)] = &[
    ("binary", Binary),
    ("bit", Boolean),
    ("char", Char),
    ("date", Date),
    ("datetime", Timestamp),
    ("datetime2", Timestamp),
    ("decimal() identity", Decimal),
    ("decimal", Decimal),
    ("image", LongVarBinary),
    ("int", Integer),
    ("int identity", Integer),
    ("integer", Integer),
    ("money", Decimal),
    ("nchar", Char),
    ("ntext", LongVarchar),
    ("numeric() identity", Numeric),
    ("numeric", Numeric),
    ("nvarchar", Varchar),
    ("real", Real),
    ("float", Float),
    ("smalldatetime", Timestamp),
    ("smallint", SmallInt),
    ("smallint identity", SmallInt),
    ("smallmoney", Decimal),
    ("sysname", Varchar),
    ("text", LongVarchar),
    ("timestamp", Binary),
    ("tinyint identity", TinyInt),
    ("tinyint", TinyInt),
    ("uniqueidentifier", Char),
    ("varbinary", VarBinary),
    ("varbinary(max)", Clob),
    ("varchar", Varchar),
    ("varchar(max)", Clob),
    ("bigint identity", BigInt),
    ("bigint", BigInt),
    ("sql_variant", Varchar),
];

/// Pervasive type keys derived by [`pervasive_type_key`].
///
/// WSTRING and WZTRING (codes 25, 26) are deliberately absent.
static PERVASIVE_NATIVE: &[(&str, LogicalType)] = &[
    ("AUTOINC2", SmallInt),
    ("AUTOINC4", Integer),
    ("BFLOAT4", Real),
    ("BFLOAT8", Double),
    ("CLOB/BLOB", LongVarBinary),
    ("CURRENCY", Decimal),
    ("DATE", Date),
    ("DATETIME", Timestamp),
    ("DECIMAL", Decimal),
    ("REAL", Real),
    ("DOUBLE", Double),
    ("GUID", LongVarBinary),
    ("TINYINT", TinyInt),
    ("SMALLINT", SmallInt),
    ("INTEGER", Integer),
    ("BIGINT", BigInt),
    ("MONEY", Decimal),
    ("NUMERIC", Numeric),
    ("NUMERICSA", Numeric),
    ("NUMERICSLB", Numeric),
    ("NUMERICSLS", Numeric),
    ("NUMERICSTB", Numeric),
    ("NUMERICSTS", Numeric),
    ("STRING", Char),
    ("BINARY", Binary),
    ("TIME", Time),
    ("TIMESTAMP", Timestamp),
    ("UNSIGNED1 BINARY", TinyInt),
    ("UNSIGNED2 BINARY", SmallInt),
    ("UNSIGNED4 BINARY", Integer),
    ("UNSIGNED8 BINARY", Decimal),
    ("VARCHAR", Varchar),
    ("BIT", Boolean),
    ("LOGICAL", SmallInt),
];

/// DDL types shared by SQL Server and Pervasive.
static SQLSERVER_FAMILY_DDL: &[(LogicalType, &str)] = &[
    (Integer, "INT"),
    (Boolean, "INT"),
    (Double, "FLOAT"),
    (LongVarchar, "VARCHAR(MAX)"),
    (Clob, "VARCHAR(MAX)"),
    (Date, "DATETIME"),
    (Time, "DATETIME"),
    (Timestamp, "DATETIME"),
    (Binary, "BINARY(7132)"),
    (VarBinary, "VARBINARY(MAX)"),
    (LongVarBinary, "VARBINARY(MAX)"),
    (Blob, "VARBINARY(MAX)"),
    (Object, "VARCHAR(MAX)"),
    (Array, "VARCHAR(MAX)"),
    (Enum, "TINYINT"),
];

/// SQL Server type tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlTypes;

impl ToLogical for MssqlTypes {
    fn dialect(&self) -> &str {
        "mssql"
    }

    fn native_types(&self) -> &'static [(&'static str, LogicalType)] {
        MSSQL_NATIVE
    }
}

impl FromLogical for MssqlTypes {
    fn dialect(&self) -> &str {
        "mssql"
    }

    fn overrides(&self) -> &'static [(LogicalType, &'static str)] {
        SQLSERVER_FAMILY_DDL
    }
}

/// Pervasive type tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PervasiveTypes;

impl ToLogical for PervasiveTypes {
    fn dialect(&self) -> &str {
        "pervasive"
    }

    fn native_types(&self) -> &'static [(&'static str, LogicalType)] {
        PERVASIVE_NATIVE
    }
}

impl FromLogical for PervasiveTypes {
    fn dialect(&self) -> &str {
        "pervasive"
    }

    fn overrides(&self) -> &'static [(LogicalType, &'static str)] {
        SQLSERVER_FAMILY_DDL
    }
}

/// Derive the Pervasive type key from `X$FIELD` metadata.
///
/// `X$FIELD.XE$DATATYPE` is a numeric code whose meaning for integers,
/// floats and auto-increment columns depends on the field size. Keys that
/// cannot be resolved are returned as `UNKNOWN ...` strings which have no
/// mapping and so surface as unsupported-type warnings.
pub fn pervasive_type_key(datatype: i64, size: i64, is_binary: bool) -> String {
    let key = match datatype {
        0 if is_binary => "BINARY",
        0 => "STRING",
        1 => match size {
            1 => "TINYINT",
            2 => "SMALLINT",
            4 => "INTEGER",
            8 => "BIGINT",
            _ => "UNKNOWN INTEGER",
        },
        2 => match size {
            4 => "REAL",
            8 => "DOUBLE",
            _ => "UNKNOWN REAL",
        },
        3 => "DATE",
        4 => "TIME",
        5 => "DECIMAL",
        6 => "MONEY",
        7 => "LOGICAL",
        8 => "NUMERIC",
        9 => match size {
            4 => "BFLOAT4",
            8 => "BFLOAT8",
            _ => "UNKNOWN BFLOAT",
        },
        11 => "VARCHAR",
        14 => match size {
            1 => "UNSIGNED1 BINARY",
            2 => "UNSIGNED2 BINARY",
            4 => "UNSIGNED4 BINARY",
            8 => "UNSIGNED8 BINARY",
            _ => "UNKNOWN UNSIGNED BINARY",
        },
        15 => match size {
            2 => "AUTOINC2",
            4 => "AUTOINC4",
            _ => "UNKNOWN AUTOINC",
        },
        16 => "BIT",
        17 => "NUMERICSTS",
        18 => "NUMERICSA",
        19 => "CURRENCY",
        20 => "TIMESTAMP",
        21 => "CLOB/BLOB",
        25 => "WSTRING",
        26 => "WZTRING",
        27 => "GUID",
        28 => "NUMERICSLB",
        29 => "NUMERICSLS",
        30 => "DATETIME",
        31 => "NUMERICSTB",
        other => return format!("DATATYPE UNKNOWN = {}", other),
    };
    key.to_string()
}
