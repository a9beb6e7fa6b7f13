//! Pervasive.SQL platform.

use crate::core::params::BoundParam;
use crate::core::schema::{Column, Database, Table};
use crate::core::traits::{nullable_identity, Platform};
use crate::core::types::LogicalType;
use crate::dialect::{FromLogical, PervasiveTypes};
use crate::drivers::common::sqltext::{check_limit_args, inline_lob_params, split_select, top_n};
use crate::error::{ReverseError, Result};

/// Pervasive.SQL platform implementation.
///
/// Identity columns are declared with the `IDENTITY`/`SMALLIDENTITY`
/// pseudo-types, and LIMIT is only available as `TOP` (no offset).
#[derive(Debug, Clone, Default)]
pub struct PervasivePlatform {
    types: PervasiveTypes,
}

impl PervasivePlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for PervasivePlatform {
    fn name(&self) -> &str {
        "pervasive"
    }

    fn types(&self) -> &dyn FromLogical {
        &self.types
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn max_column_name_length(&self) -> usize {
        20
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_native_delete_trigger(&self) -> bool {
        true
    }

    fn supports_insert_null_pk(&self) -> bool {
        false
    }

    fn random(&self, seed: Option<i64>) -> String {
        format!("RAND({})", seed.unwrap_or(0))
    }

    fn auto_increment_string(&self, column: &Column) -> Option<String> {
        if column.logical_type() == LogicalType::SmallInt {
            Some("SMALLIDENTITY".to_string())
        } else {
            Some("IDENTITY".to_string())
        }
    }

    /// Identity columns carry no type or null clause; the identity keyword
    /// is the type.
    fn column_ddl(&self, table: &Table, column: &Column) -> Result<String> {
        if !column.auto_increment {
            let mut parts = vec![self.quote_identifier(&column.name), self.column_type_ddl(column)];
            parts.extend(self.column_default_ddl(column));
            parts.push(self.null_string(column.not_null).to_string());
            return Ok(parts.join(" "));
        }

        if !column.not_null {
            return Err(nullable_identity(table, column));
        }
        let mut parts = vec![self.quote_identifier(&column.name)];
        parts.extend(self.auto_increment_string(column));
        parts.extend(self.column_default_ddl(column));
        Ok(parts.join(" "))
    }

    fn apply_limit(&self, sql: &mut String, offset: i64, limit: i64) -> Result<()> {
        check_limit_args(offset, limit)?;
        if offset != 0 {
            return Err(ReverseError::Unsupported(
                "Pervasive applyLimit does not work with offset <> 0".to_string(),
            ));
        }
        let parts = split_select(sql)?;
        *sql = top_n(&parts, limit);
        Ok(())
    }

    fn cleanup_sql(
        &self,
        sql: &mut String,
        params: &mut Vec<BoundParam>,
        database: &Database,
    ) -> Result<()> {
        inline_lob_params(sql, params, database)
    }
}
